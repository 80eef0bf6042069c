pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod fetch;
pub mod git;
pub mod github;

pub use error::{GizzError, Result};
