//! Client core for the teacher administration screens: auth and search contexts,
//! the paginated fetch controller and the list/form view models built on it.

pub mod api;
pub mod controller;
pub mod error;
pub mod form_view;
pub mod layout;
pub mod list_view;
pub mod navigation;
pub mod search;
pub mod session;
pub mod transport;

pub use api::{HttpPageSource, HttpTeacherApi, TeacherApi};
pub use controller::{FetchState, PageRequest, PageSource, PaginatedFetchController};
pub use error::{ClientError, ClientResult};
pub use form_view::{FormMode, FormState, TeacherForm};
pub use list_view::{Confirm, DeleteOutcome, ListScreen, TeacherListView};
pub use navigation::{Navigator, Route};
pub use search::{SearchContext, SearchState};
pub use session::{AuthContext, Session, SessionUser};
pub use transport::HttpTransport;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
