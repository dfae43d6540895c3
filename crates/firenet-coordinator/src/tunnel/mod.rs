//! Tunnel service implementations

mod loopback;

pub use loopback::{LoopbackTunnel, TunnelCommand};
