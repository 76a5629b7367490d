//! Service registrations and their approval lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::Service;
use super::user::UserSummary;

/// Approval state of a registration.
///
/// `Pending` moves to either `Confirmed` or `Declined`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[serde(alias = "pending", alias = "Pendente")]
    Pending,
    #[serde(
        alias = "confirmed",
        alias = "Confirmada",
        alias = "Confirmado",
        alias = "Aprovada",
        alias = "Aprovado"
    )]
    Confirmed,
    #[serde(alias = "declined", alias = "Recusada", alias = "Recusado")]
    Declined,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Confirmed => "Confirmed",
            RegistrationStatus::Declined => "Declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegistrationStatus::Pending)
    }

    pub fn can_transition_to(&self, next: RegistrationStatus) -> bool {
        matches!(
            (self, next),
            (
                RegistrationStatus::Pending,
                RegistrationStatus::Confirmed | RegistrationStatus::Declined
            )
        )
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(alias = "ID")]
    pub id: u64,
    #[serde(default, alias = "User")]
    pub user: Option<UserSummary>,
    #[serde(alias = "Service")]
    pub service: Service,
    pub status: RegistrationStatus,
    #[serde(default, alias = "createdAt", alias = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/registrations`
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistration {
    pub service_id: u64,
}

/// Body of `PATCH /api/admin/registrations/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: RegistrationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_only_leave_pending() {
        use RegistrationStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Declined));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Declined));
        assert!(!Declined.can_transition_to(Confirmed));
        assert!(Confirmed.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_status_accepts_portuguese_drift() {
        let s: RegistrationStatus = serde_json::from_str(r#""Pendente""#).unwrap();
        assert_eq!(s, RegistrationStatus::Pending);
        let s: RegistrationStatus = serde_json::from_str(r#""Confirmada""#).unwrap();
        assert_eq!(s, RegistrationStatus::Confirmed);
        assert_eq!(
            serde_json::to_string(&RegistrationStatus::Declined).unwrap(),
            r#""Declined""#
        );
    }

    #[test]
    fn test_registration_with_timestamp_offset() {
        let reg: Registration = serde_json::from_str(
            r#"{"id":10,"service":{"id":7,"name":"Crisma"},"status":"Pending",
                "created_at":"2024-03-01T10:00:00-03:00"}"#,
        )
        .unwrap();
        assert_eq!(reg.service.id, 7);
        assert_eq!(reg.user, None);
        assert_eq!(
            reg.created_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T13:00:00+00:00".to_string())
        );
    }
}
