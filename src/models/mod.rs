//! Wire models for the parish platform API, split by resource.

pub mod common;
pub mod contribution;
pub mod parish;
pub mod registration;
pub mod service;
pub mod stats;
pub mod user;

pub use common::*;
pub use contribution::*;
pub use parish::*;
pub use registration::*;
pub use service::*;
pub use stats::*;
pub use user::*;
