//! Enrollable parish services.

use serde::{Deserialize, Serialize};

/// A parish activity users can enroll in (catechesis, baptism course, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(alias = "ID")]
    pub id: u64,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Description")]
    pub description: String,
}
