//! Paginated fetch controller.
//!
//! Owns one page request (`search_term`, `page`, `page_size`) and keeps a
//! [`FetchState`] in sync with it: every change of the request, and every
//! explicit [`PaginatedFetchController::refresh`], issues a fetch on the tokio
//! runtime. Results are applied last-request-wins: each issue bumps a
//! generation counter stored next to the state, and a completed fetch only
//! commits while its generation is still current. Superseded fetches are also
//! aborted so they stop using the network.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use shared::protocol::{PageQuery, PageResult};
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub search_term: String,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(search_term: impl Into<String>, page_size: u32) -> Self {
        Self {
            search_term: search_term.into(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// The search value is only sent for a non-blank term; paging is always sent.
    pub fn to_query(&self) -> PageQuery {
        let term = self.search_term.trim();
        PageQuery {
            value: (!term.is_empty()).then(|| term.to_string()),
            page: self.page.max(1),
            page_size: self.page_size.max(1),
        }
    }

    fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.max(1);
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new("", DEFAULT_PAGE_SIZE)
    }
}

#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> ClientResult<PageResult<T>>;
}

#[derive(Debug, Clone)]
pub struct FetchState<T> {
    pub data: Vec<T>,
    /// Last value reported by the source; see [`FetchState::effective_total_pages`].
    pub total_pages: u32,
    pub loading: bool,
    pub error: Option<ClientError>,
    /// The request the state belongs to (or is loading for).
    pub request: PageRequest,
    generation: u64,
}

impl<T> FetchState<T> {
    fn initial(request: PageRequest) -> Self {
        Self {
            data: Vec::new(),
            total_pages: 1,
            loading: false,
            error: None,
            request,
            generation: 0,
        }
    }

    pub fn effective_total_pages(&self) -> u32 {
        self.total_pages.max(1)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ClientError::user_message)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct ControllerShared<T> {
    source: Arc<dyn PageSource<T>>,
    state: watch::Sender<FetchState<T>>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl<T> ControllerShared<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts a fetch for `next` (or the current request when `None`).
    fn issue(self: &Arc<Self>, next: Option<PageRequest>) {
        // Held across the bump and the spawn so handles are replaced in generation order.
        let mut inflight = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut ticket = (0, PageRequest::default());
        self.state.send_modify(|state| {
            if let Some(next) = next {
                state.request = next;
            }
            state.generation += 1;
            state.loading = true;
            state.error = None;
            ticket = (state.generation, state.request.clone());
        });
        let (generation, request) = ticket;

        debug!(
            generation,
            page = request.page,
            page_size = request.page_size,
            search = %request.search_term,
            "controller: fetch issued"
        );

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let outcome = shared.source.fetch_page(&request).await;
            shared.commit(generation, outcome);
        });

        if let Some(previous) = inflight.replace(handle) {
            previous.abort();
        }
    }

    fn commit(self: &Arc<Self>, generation: u64, outcome: ClientResult<PageResult<T>>) {
        let mut overshoot = None;
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.loading = false;
            match outcome {
                Ok(page) => {
                    let last_page = page.effective_total_pages();
                    state.data = page.items;
                    state.total_pages = page.total_pages;
                    state.error = None;
                    if state.request.page > last_page {
                        overshoot = Some(state.request.clone().with_page(last_page));
                    }
                }
                Err(err) => {
                    debug!(generation, error = %err, "controller: fetch failed");
                    state.error = Some(err);
                }
            }
            true
        });

        if !applied {
            debug!(generation, "controller: discarded stale response");
            return;
        }

        // The page shrank underneath us (e.g. the last row of the last page was deleted).
        if let Some(request) = overshoot {
            debug!(page = request.page, "controller: clamping to last page");
            self.issue(Some(request));
        }
    }

    fn cancel(&self) {
        let mut inflight = self
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = inflight.take() {
            handle.abort();
        }
        self.state.send_modify(|state| {
            state.generation += 1;
            state.loading = false;
        });
    }
}

/// Cheap to clone; clones drive the same request and state.
pub struct PaginatedFetchController<T> {
    shared: Arc<ControllerShared<T>>,
}

impl<T> Clone for PaginatedFetchController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> PaginatedFetchController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates the controller and issues the first fetch. Must run inside a tokio runtime.
    pub fn spawn(source: Arc<dyn PageSource<T>>, request: PageRequest) -> Self {
        let (state, _) = watch::channel(FetchState::initial(request.normalized()));
        let shared = Arc::new(ControllerShared {
            source,
            state,
            inflight: Mutex::new(None),
        });
        shared.issue(None);
        Self { shared }
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn request(&self) -> PageRequest {
        self.shared.state.borrow().request.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    /// Replaces the request; fetches only when it differs from the current one.
    pub fn set_request(&self, request: PageRequest) -> bool {
        let request = request.normalized();
        if self.shared.state.borrow().request == request {
            return false;
        }
        self.shared.issue(Some(request));
        true
    }

    /// Moves to `page`, clamped into `[1, effective_total_pages]`.
    pub fn set_page(&self, page: u32) -> bool {
        let (current, last_page) = {
            let state = self.shared.state.borrow();
            (state.request.clone(), state.effective_total_pages())
        };
        self.set_request(current.with_page(page.clamp(1, last_page)))
    }

    /// A new term always restarts from page 1, in the same fetch.
    pub fn set_search_term(&self, term: impl Into<String>) -> bool {
        let current = self.request();
        self.set_request(PageRequest {
            search_term: term.into(),
            page: 1,
            page_size: current.page_size,
        })
    }

    pub fn set_page_size(&self, page_size: u32) -> bool {
        let current = self.request();
        self.set_request(PageRequest {
            page: 1,
            page_size,
            ..current
        })
    }

    /// Re-issues the current request regardless of whether it changed.
    pub fn refresh(&self) {
        self.shared.issue(None);
    }

    /// Abandons the in-flight fetch; nothing is applied afterwards until the next issue.
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Waits until no fetch is pending and returns the resulting state.
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
