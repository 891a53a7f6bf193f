//! Fakes shared by the view-model tests.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{Teacher, TeacherId},
    protocol::{PageBody, PageResult, TeacherPayload},
};
use tokio::sync::Semaphore;

use crate::{
    api::TeacherApi,
    controller::{FetchState, PageRequest, PaginatedFetchController},
    error::{ClientError, ClientResult},
    list_view::Confirm,
    navigation::Navigator,
};

pub(crate) fn teacher(id: i64, name: &str) -> Teacher {
    Teacher {
        id: TeacherId(id),
        name: name.to_string(),
        phone_number: format!("555-01{id:02}"),
        email: format!("{}@school.test", name.to_lowercase().replace(' ', ".")),
        doc: None,
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn paths(&self) -> Vec<String> {
        self.paths.lock().expect("paths").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().expect("paths").push(path.to_string());
    }
}

pub(crate) struct FixedConfirm(pub bool);

impl Confirm for FixedConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// In-memory backend with failure injection and a call log.
pub(crate) struct MemoryTeacherApi {
    teachers: Mutex<Vec<Teacher>>,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<TeacherPayload>>,
    fail_list: Mutex<Option<ClientError>>,
    fail_get: Mutex<Option<ClientError>>,
    fail_save: Mutex<Option<ClientError>>,
    fail_delete: Mutex<Option<ClientError>>,
    list_gate: Option<Semaphore>,
    next_id: Mutex<i64>,
}

impl MemoryTeacherApi {
    pub(crate) fn with(teachers: Vec<Teacher>) -> Self {
        let next_id = teachers.iter().map(|t| t.id.0).max().unwrap_or(0) + 1;
        Self {
            teachers: Mutex::new(teachers),
            calls: Mutex::new(Vec::new()),
            payloads: Mutex::new(Vec::new()),
            fail_list: Mutex::new(None),
            fail_get: Mutex::new(None),
            fail_save: Mutex::new(None),
            fail_delete: Mutex::new(None),
            list_gate: None,
            next_id: Mutex::new(next_id),
        }
    }

    pub(crate) fn numbered(count: i64) -> Self {
        Self::with((1..=count).map(|id| teacher(id, &format!("Teacher {id}"))).collect())
    }

    /// List calls block until [`MemoryTeacherApi::release_lists`] hands out permits.
    pub(crate) fn gated(mut self) -> Self {
        self.list_gate = Some(Semaphore::new(0));
        self
    }

    pub(crate) fn release_lists(&self, count: usize) {
        if let Some(gate) = &self.list_gate {
            gate.add_permits(count);
        }
    }

    pub(crate) fn fail_list_with(&self, err: Option<ClientError>) {
        *self.fail_list.lock().expect("fail_list") = err;
    }

    pub(crate) fn fail_get_with(&self, err: ClientError) {
        *self.fail_get.lock().expect("fail_get") = Some(err);
    }

    pub(crate) fn fail_save_with(&self, err: Option<ClientError>) {
        *self.fail_save.lock().expect("fail_save") = err;
    }

    pub(crate) fn fail_delete_with(&self, err: ClientError) {
        *self.fail_delete.lock().expect("fail_delete") = Some(err);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with("LIST"))
            .count()
    }

    pub(crate) fn payloads(&self) -> Vec<TeacherPayload> {
        self.payloads.lock().expect("payloads").clone()
    }

    pub(crate) fn stored(&self, id: TeacherId) -> Option<Teacher> {
        self.teachers
            .lock()
            .expect("teachers")
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls").push(call);
    }
}

#[async_trait]
impl TeacherApi for MemoryTeacherApi {
    async fn list(&self, request: &PageRequest) -> ClientResult<PageResult<Teacher>> {
        self.record(format!(
            "LIST page={} term={}",
            request.page, request.search_term
        ));
        if let Some(gate) = &self.list_gate {
            gate.acquire()
                .await
                .map_err(|_| ClientError::NetworkFailure("gate closed".into()))?
                .forget();
        }
        if let Some(err) = self.fail_list.lock().expect("fail_list").clone() {
            return Err(err);
        }

        let term = request.search_term.trim().to_lowercase();
        let matching: Vec<Teacher> = self
            .teachers
            .lock()
            .expect("teachers")
            .iter()
            .filter(|t| term.is_empty() || t.name.to_lowercase().contains(&term))
            .cloned()
            .collect();
        Ok(PageBody::Bare(matching).into_page(request.page, request.page_size))
    }

    async fn get(&self, id: TeacherId) -> ClientResult<Option<Teacher>> {
        self.record(format!("GET {}", id.0));
        if let Some(err) = self.fail_get.lock().expect("fail_get").clone() {
            return Err(err);
        }
        Ok(self.stored(id))
    }

    async fn create(&self, payload: &TeacherPayload) -> ClientResult<()> {
        self.record("POST".to_string());
        self.payloads.lock().expect("payloads").push(payload.clone());
        if let Some(err) = self.fail_save.lock().expect("fail_save").clone() {
            return Err(err);
        }
        let mut next_id = self.next_id.lock().expect("next_id");
        self.teachers.lock().expect("teachers").push(Teacher {
            id: TeacherId(*next_id),
            name: payload.name.clone(),
            phone_number: payload.phone_number.clone(),
            email: payload.email.clone(),
            doc: None,
        });
        *next_id += 1;
        Ok(())
    }

    async fn update(&self, id: TeacherId, payload: &TeacherPayload) -> ClientResult<()> {
        self.record(format!("PUT {}", id.0));
        self.payloads.lock().expect("payloads").push(payload.clone());
        if let Some(err) = self.fail_save.lock().expect("fail_save").clone() {
            return Err(err);
        }
        let mut teachers = self.teachers.lock().expect("teachers");
        let stored = teachers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ClientError::HttpError {
                status: 404,
                message: "Not Found".into(),
            })?;
        stored.name = payload.name.clone();
        stored.phone_number = payload.phone_number.clone();
        stored.email = payload.email.clone();
        Ok(())
    }

    async fn delete(&self, id: TeacherId) -> ClientResult<()> {
        self.record(format!("DELETE {}", id.0));
        if let Some(err) = self.fail_delete.lock().expect("fail_delete").clone() {
            return Err(err);
        }
        self.teachers.lock().expect("teachers").retain(|t| t.id != id);
        Ok(())
    }
}

/// Waits until the controller state satisfies `pred`, failing the test after two seconds.
pub(crate) async fn wait_until<T, F>(
    controller: &PaginatedFetchController<T>,
    pred: F,
) -> FetchState<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&FetchState<T>) -> bool,
{
    let mut rx = controller.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|state| pred(state)))
        .await
        .expect("state should be reached")
        .expect("controller alive")
        .clone();
    state
}
