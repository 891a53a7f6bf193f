//! Teacher resource endpoints.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Teacher, TeacherId},
    protocol::{PageResult, TeacherPayload},
};
use tracing::info;

use crate::{
    controller::{PageRequest, PageSource},
    error::ClientResult,
    transport::HttpTransport,
};

pub const TEACHER_RESOURCE: &str = "teacher";

#[async_trait]
pub trait TeacherApi: Send + Sync {
    async fn list(&self, request: &PageRequest) -> ClientResult<PageResult<Teacher>>;
    /// `Ok(None)` when the backend has no such teacher.
    async fn get(&self, id: TeacherId) -> ClientResult<Option<Teacher>>;
    async fn create(&self, payload: &TeacherPayload) -> ClientResult<()>;
    async fn update(&self, id: TeacherId, payload: &TeacherPayload) -> ClientResult<()>;
    async fn delete(&self, id: TeacherId) -> ClientResult<()>;
}

/// List endpoint of any resource, decoded into `T`.
pub struct HttpPageSource<T> {
    transport: HttpTransport,
    resource: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageSource<T> {
    pub fn new(transport: HttpTransport, resource: impl Into<String>) -> Self {
        Self {
            transport,
            resource: resource.into(),
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T> PageSource<T> for HttpPageSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: &PageRequest) -> ClientResult<PageResult<T>> {
        let body = self
            .transport
            .get_page::<T>(&self.resource, &request.to_query())
            .await?;
        Ok(body.into_page(request.page, request.page_size))
    }
}

#[derive(Clone)]
pub struct HttpTeacherApi {
    transport: HttpTransport,
}

impl HttpTeacherApi {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub fn page_source(&self) -> HttpPageSource<Teacher> {
        HttpPageSource::new(self.transport.clone(), TEACHER_RESOURCE)
    }

    fn item_path(id: TeacherId) -> String {
        format!("{TEACHER_RESOURCE}/{}", id.0)
    }
}

#[async_trait]
impl TeacherApi for HttpTeacherApi {
    async fn list(&self, request: &PageRequest) -> ClientResult<PageResult<Teacher>> {
        self.page_source().fetch_page(request).await
    }

    async fn get(&self, id: TeacherId) -> ClientResult<Option<Teacher>> {
        self.transport.get_optional(&Self::item_path(id)).await
    }

    async fn create(&self, payload: &TeacherPayload) -> ClientResult<()> {
        self.transport
            .send_json(Method::POST, TEACHER_RESOURCE, payload)
            .await?;
        info!(email = %payload.email, "teachers: created");
        Ok(())
    }

    async fn update(&self, id: TeacherId, payload: &TeacherPayload) -> ClientResult<()> {
        self.transport
            .send_json(Method::PUT, &Self::item_path(id), payload)
            .await?;
        info!(teacher_id = id.0, "teachers: updated");
        Ok(())
    }

    async fn delete(&self, id: TeacherId) -> ClientResult<()> {
        self.transport.delete(&Self::item_path(id)).await?;
        info!(teacher_id = id.0, "teachers: deleted");
        Ok(())
    }
}
