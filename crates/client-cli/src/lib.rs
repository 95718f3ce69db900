//! PhotoSet AI client: sessions, generation, gallery, billing and admin
//! operations against the hosted backend functions, plus a terminal UI.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gateway;
pub mod generation;
pub mod i18n;
pub mod search;
pub mod session;
pub mod share;
pub mod tui;

pub use error::{ClientError, ClientResult};
