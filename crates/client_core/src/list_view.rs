//! Teacher list screen: search-driven paginated table with row actions.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use shared::{
    domain::{Teacher, TeacherId},
    protocol::PageResult,
};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    api::TeacherApi,
    controller::{FetchState, PageRequest, PageSource, PaginatedFetchController},
    error::{ClientError, ClientResult},
    navigation::{go, Navigator, Route},
    search::SearchContext,
    session::AuthContext,
};

pub const TEACHERS_TITLE: &str = "Teachers";
pub const DELETE_PROMPT: &str = "Delete this teacher?";

/// Yes/no prompt shown before destructive row actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScreen {
    /// Placeholder table with one blank row per page slot.
    Skeleton { rows: u32 },
    Failed { message: String },
    Rows {
        rows: Vec<Teacher>,
        page: u32,
        total_pages: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

struct ApiPageSource(Arc<dyn TeacherApi>);

#[async_trait]
impl PageSource<Teacher> for ApiPageSource {
    async fn fetch_page(&self, request: &PageRequest) -> ClientResult<PageResult<Teacher>> {
        self.0.list(request).await
    }
}

pub struct TeacherListView {
    api: Arc<dyn TeacherApi>,
    controller: PaginatedFetchController<Teacher>,
    search: SearchContext,
    navigator: Arc<dyn Navigator>,
    action_error: Mutex<Option<ClientError>>,
    search_watch: JoinHandle<()>,
}

impl TeacherListView {
    /// Mounts the screen: sets the shared title and issues the first fetch.
    ///
    /// The page size is the signed-in user's preference, else `default_page_size`.
    pub fn mount(
        api: Arc<dyn TeacherApi>,
        auth: &AuthContext,
        search: SearchContext,
        navigator: Arc<dyn Navigator>,
        default_page_size: u32,
    ) -> Self {
        search.set_title(TEACHERS_TITLE);

        let page_size = auth
            .user()
            .map(|user| user.page_size_or(default_page_size))
            .unwrap_or(default_page_size.max(1));

        let mut search_rx = search.subscribe();
        let term = search_rx.borrow_and_update().term.clone();
        let controller = PaginatedFetchController::spawn(
            Arc::new(ApiPageSource(Arc::clone(&api))),
            PageRequest::new(term, page_size),
        );

        let watched = controller.clone();
        let search_watch = tokio::spawn(async move {
            while search_rx.changed().await.is_ok() {
                let term = search_rx.borrow_and_update().term.clone();
                watched.set_search_term(term);
            }
        });

        info!(page_size, "teachers: list mounted");
        Self {
            api,
            controller,
            search,
            navigator,
            action_error: Mutex::new(None),
            search_watch,
        }
    }

    pub fn controller(&self) -> &PaginatedFetchController<Teacher> {
        &self.controller
    }

    pub fn search(&self) -> &SearchContext {
        &self.search
    }

    pub fn state(&self) -> FetchState<Teacher> {
        self.controller.snapshot()
    }

    pub fn screen(&self) -> ListScreen {
        let state = self.controller.snapshot();
        if state.loading {
            return ListScreen::Skeleton {
                rows: state.request.page_size,
            };
        }
        if let Some(message) = state.error_message() {
            return ListScreen::Failed { message };
        }
        let total_pages = state.effective_total_pages();
        ListScreen::Rows {
            rows: state.data,
            page: state.request.page,
            total_pages,
        }
    }

    /// Last failed row action, shown above the table.
    pub fn action_error(&self) -> Option<String> {
        self.action_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(ClientError::user_message)
    }

    fn set_action_error(&self, err: Option<ClientError>) {
        *self
            .action_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = err;
    }

    pub fn can_previous(&self) -> bool {
        self.controller.request().page > 1
    }

    pub fn can_next(&self) -> bool {
        let state = self.controller.snapshot();
        state.request.page < state.effective_total_pages()
    }

    pub fn previous_page(&self) -> bool {
        if !self.can_previous() {
            return false;
        }
        let page = self.controller.request().page;
        self.controller.set_page(page - 1)
    }

    pub fn next_page(&self) -> bool {
        if !self.can_next() {
            return false;
        }
        let page = self.controller.request().page;
        self.controller.set_page(page + 1)
    }

    /// Deletes after confirmation. The row stays until the backend confirms;
    /// on success the current page is re-fetched.
    pub async fn delete(&self, id: TeacherId, confirm: &dyn Confirm) -> ClientResult<DeleteOutcome> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.set_action_error(None);
        match self.api.delete(id).await {
            Ok(()) => {
                self.controller.refresh();
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(teacher_id = id.0, error = %err, "teachers: delete failed");
                self.set_action_error(Some(err.clone()));
                Err(err)
            }
        }
    }

    pub fn add(&self) {
        go(self.navigator.as_ref(), &Route::TeacherAdd);
    }

    pub fn edit(&self, id: TeacherId) {
        go(self.navigator.as_ref(), &Route::TeacherEdit(id));
    }

    pub fn open_groups(&self, teacher: &Teacher) {
        go(self.navigator.as_ref(), &Route::TeacherGroups(teacher.groups_key()));
    }
}

impl Drop for TeacherListView {
    fn drop(&mut self) {
        self.search_watch.abort();
        self.controller.cancel();
    }
}

#[cfg(test)]
#[path = "tests/list_view_tests.rs"]
mod tests;
