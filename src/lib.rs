pub mod config;
pub mod error;
pub mod flow;
pub mod git;
pub mod manifest;
pub mod prompt;
pub mod ui;
pub mod version;

pub use error::{ReleaseError, Result};
