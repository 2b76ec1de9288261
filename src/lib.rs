#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod inference;
pub mod prompt;
pub mod safety;

pub use config::Config;
pub use conversation::ConversationManager;
pub use error::{PalError, Result};
