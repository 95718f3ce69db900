//! Wire and domain types shared by the PhotoSet client crates

pub mod messages;
pub mod models;

pub use messages::*;
pub use models::*;
