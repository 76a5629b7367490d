//! Read-only informational resources: parish info, pastorals, mass times.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParishInfo {
    pub name: String,
    #[serde(default)]
    pub history: String,
    #[serde(default, alias = "massTimes")]
    pub mass_times: Vec<MassTime>,
    #[serde(default, alias = "secretariatHours")]
    pub secretariat_hours: Option<String>,
    #[serde(default, alias = "priestHours")]
    pub priest_hours: Option<String>,
    #[serde(default, alias = "liturgicalCalendarUrl")]
    pub liturgical_calendar_url: Option<String>,
}

/// One entry of the mass schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassTime {
    #[serde(default, alias = "ID")]
    pub id: Option<u64>,
    pub day: String,
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pastoral {
    #[serde(alias = "ID")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "meetingInfo", alias = "meeting_time")]
    pub meeting_info: String,
}
