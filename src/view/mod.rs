//! Screen state and the controller that drives it.

pub mod controller;
pub mod state;

pub use controller::{ContributionReceipt, ViewController};
pub use state::{AuthState, Loadable, Notification, NotificationKind, Page};
