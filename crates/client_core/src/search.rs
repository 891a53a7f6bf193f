//! Search context shared by the search bar, the header and the active list view.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub title: String,
    pub term: String,
}

impl SearchState {
    /// Placeholder shown inside the search input.
    pub fn placeholder(&self) -> String {
        format!("Search {}...", self.title.to_lowercase())
    }
}

#[derive(Clone)]
pub struct SearchContext {
    tx: Arc<watch::Sender<SearchState>>,
}

impl SearchContext {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SearchState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.tx.send_if_modified(|state| {
            if state.title == title {
                return false;
            }
            state.title = title;
            true
        });
    }

    /// Replaces the term. Subscribers are only woken when the value actually changes.
    pub fn set_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.tx.send_if_modified(|state| {
            if state.term == term {
                return false;
            }
            state.term = term;
            true
        });
    }

    pub fn snapshot(&self) -> SearchState {
        self.tx.borrow().clone()
    }

    pub fn term(&self) -> String {
        self.tx.borrow().term.clone()
    }

    pub fn title(&self) -> String {
        self.tx.borrow().title.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.tx.subscribe()
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}
