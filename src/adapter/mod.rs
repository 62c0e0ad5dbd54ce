//! Adapters implementing the ports.

pub mod inbound;
pub mod outbound;
