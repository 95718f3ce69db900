//! Interactive terminal front end.
//!
//! Sections map one-to-one onto screens, reachable through the tab bar or the
//! `/` search box. Login, registration and password reset are off-nav screens.

mod app;
mod runner;
mod views;

pub use app::{Action, App, Completion, Outcome, Ticket, View};
pub use runner::{run, Services};
