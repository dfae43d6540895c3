//! firenet-core: Core abstractions and configuration for Firenet
//!
//! This crate provides the server/selection domain types, the error taxonomy,
//! the traits for the external collaborators (server store and tunnel
//! service), and the configuration structures shared by the coordinator and
//! the CLI.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoordinatorError, FirenetError, StoreError, TunnelError};
pub use types::{ConnectionState, ServerEntry, ServerGuid, ServerList};
