//! firenet: Command-line interface for Firenet
//!
//! Provides the `firenet` CLI for managing the server list, selecting a
//! server, and driving an interactive connection session.

pub mod commands;
pub mod output;
