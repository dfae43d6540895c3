//! Core trait definitions

mod store;
mod tunnel;

pub use store::ServerStore;
pub use tunnel::TunnelService;
