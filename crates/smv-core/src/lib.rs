//! Core domain + application logic for the Slack archive/mirror tool.
//!
//! This crate is platform-agnostic. The Slack Web API lives behind the
//! `ChatApi` port (trait) implemented by the adapter crate; tests drive
//! the workflows through in-memory fakes.

pub mod archive;
pub mod channels;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod port;
pub mod replay;
pub mod workflow;

pub use errors::{Error, Result};
