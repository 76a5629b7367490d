//! Shared response shapes and serde helpers.

use serde::{Deserialize, Deserializer, Serialize};

/// Confirmation returned by action endpoints: `{ "message": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Deserialize an optional value, treating `""` and `null` as absent.
///
/// Form-backed fields (dates, gender) come back as empty strings when the
/// user left them blank.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
