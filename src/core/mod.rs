//! Shared primitives for the seed generator and the maintenance jobs.
//!
//! Everything that touches the outside world (configuration, the document
//! store, signals, logging, stdout) lives here so the jobs in
//! [`crate::plugins`] stay plain batch logic.

pub mod broker;
pub mod catalog;
pub mod config;
pub mod db;
pub mod docstore;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod output;
pub mod time;
