//! Auth context: the signed-in session, readable and observable by every consumer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, alias = "conf_tema", skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub config: UserConfig,
    #[serde(default, alias = "paginacion", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SessionUser {
    pub fn page_size_or(&self, default_page_size: u32) -> u32 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(default_page_size)
            .max(1)
    }

    pub fn theme(&self) -> Option<&str> {
        self.config
            .theme
            .as_deref()
            .map(str::trim)
            .filter(|theme| !theme.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: SessionUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: SessionUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Shared handle over the current session. Clones observe the same session.
#[derive(Clone)]
pub struct AuthContext {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl AuthContext {
    pub fn signed_out() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn with_session(session: Session) -> Self {
        let ctx = Self::signed_out();
        ctx.sign_in(session);
        ctx
    }

    pub fn sign_in(&self, session: Session) {
        info!(user_id = ?session.user.id, "auth: session established");
        self.tx.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("auth: session cleared");
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> ClientResult<String> {
        self.tx
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or(ClientError::Unauthenticated)
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.tx.borrow().as_ref().map(|session| session.user.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::signed_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_profile_fields_are_accepted() {
        let user: SessionUser =
            serde_json::from_str(r#"{"id":3,"paginacion":25,"config":{"conf_tema":"bg-slate-200"}}"#)
                .expect("profile");
        assert_eq!(user.page_size_or(10), 25);
        assert_eq!(user.theme(), Some("bg-slate-200"));
    }

    #[test]
    fn page_size_preference_falls_back_to_default() {
        let user = SessionUser {
            page_size: Some(0),
            ..SessionUser::default()
        };
        assert_eq!(user.page_size_or(10), 10);
        assert_eq!(SessionUser::default().page_size_or(0), 1);
    }

    #[test]
    fn token_requires_session() {
        let ctx = AuthContext::signed_out();
        assert_eq!(ctx.token(), Err(ClientError::Unauthenticated));

        ctx.sign_in(Session::new("abc", SessionUser::default()));
        assert_eq!(ctx.token().as_deref(), Ok("abc"));

        ctx.sign_out();
        assert!(ctx.current().is_none());
    }
}
