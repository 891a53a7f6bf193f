use serde::{Deserialize, Serialize};

use crate::domain::TeacherFields;

/// Body of `POST /teacher` and `PUT /teacher/{id}`.
///
/// Both carry the configured placeholder password alongside the editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherPayload {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl TeacherPayload {
    pub fn new(fields: &TeacherFields, password: impl Into<String>) -> Self {
        Self {
            name: fields.name.clone(),
            phone_number: fields.phone_number.clone(),
            email: fields.email.clone(),
            password: password.into(),
        }
    }
}

/// Query string of a paginated list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageEnvelope<T> {
    #[serde(alias = "data")]
    pub items: Vec<T>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    pub total_pages: Option<u32>,
}

/// Either shape the list endpoint is known to answer with.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageBody<T> {
    Bare(Vec<T>),
    Envelope(PageEnvelope<T>),
}

impl<T> PageBody<T> {
    /// Normalizes the body into one page.
    ///
    /// An envelope is already a server-side page and is taken as-is (capped at
    /// `page_size`). A bare array is the full result set and is paged here.
    pub fn into_page(self, page: u32, page_size: u32) -> PageResult<T> {
        let page_size = page_size.max(1);
        match self {
            PageBody::Envelope(envelope) => {
                let mut items = envelope.items;
                items.truncate(page_size as usize);
                let total_pages = envelope
                    .total_pages
                    .unwrap_or(if items.is_empty() { 0 } else { 1 });
                PageResult { items, total_pages }
            }
            PageBody::Bare(all) => {
                let total_pages = all.len().div_ceil(page_size as usize) as u32;
                let skip = (page.max(1) as usize - 1) * page_size as usize;
                let items = all
                    .into_iter()
                    .skip(skip)
                    .take(page_size as usize)
                    .collect();
                PageResult { items, total_pages }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// As reported by the backend; may be 0 for an empty result.
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 0,
        }
    }

    /// Page count used for display and clamping, never below 1.
    pub fn effective_total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
