//! Admin dashboard aggregates.

use serde::{Deserialize, Serialize};

use super::contribution::Amount;

/// Counts and totals from `/api/admin/dashboard-stats`.
///
/// Every field defaults to zero so older backends that omit a counter
/// still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default, alias = "totalUsers")]
    pub total_users: u64,
    #[serde(default, alias = "totalRegistrations")]
    pub total_registrations: u64,
    #[serde(default, alias = "pendingRegistrations")]
    pub pending_registrations: u64,
    #[serde(default, alias = "totalContributions")]
    pub total_contributions: u64,
    #[serde(default, alias = "contributionsTotal", alias = "total_value")]
    pub contributions_total: Amount,
}
