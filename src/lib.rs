pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod view;

#[cfg(test)]
mod testing;

pub use client::ApiClient;
pub use config::Config;
pub use error::ClientError;
pub use session::{Session, SessionStore};
pub use view::ViewController;
