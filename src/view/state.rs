//! Screen, auth and notification state held by the view controller.

use crate::error::ClientError;
use crate::models::Role;
use crate::session::Session;

/// Load state of one screen dataset: `Idle → Loading → Ready | Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Loadable::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Loadable::Ready(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Loadable::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Settle a finished load, handing back the error for reporting
    pub(crate) fn settle(result: Result<T, ClientError>) -> (Self, Option<ClientError>) {
        match result {
            Ok(data) => (Loadable::Ready(data), None),
            Err(e) => (Loadable::Failed(e.user_message()), Some(e)),
        }
    }

    /// Settle a background re-fetch. Previously loaded data is kept when
    /// the re-fetch fails.
    pub(crate) fn refresh(self, result: Result<T, ClientError>) -> (Self, Option<ClientError>) {
        match (self, result) {
            (_, Ok(data)) => (Loadable::Ready(data), None),
            (Loadable::Ready(stale), Err(e)) => (Loadable::Ready(stale), Some(e)),
            (_, Err(e)) => (Loadable::Failed(e.user_message()), Some(e)),
        }
    }
}

/// Session-gated navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated { role: Role },
}

impl AuthState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => AuthState::Authenticated {
                role: session.role(),
            },
            None => AuthState::Anonymous,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::Authenticated { role } => Some(*role),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Services,
    Pastorals,
    MassTimes,
    Auth,
    MyArea,
    Contribute,
    Admin,
}

impl Page {
    pub fn requires_session(&self) -> bool {
        matches!(self, Page::MyArea | Page::Contribute | Page::Admin)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Page::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}
