//! Side-effecting operations: transport, session, config, clock.
//!
//! Everything here talks to the network, the filesystem, or the system
//! clock. [`transport::Transport`] is the seam tests replace.

pub mod clock;
pub mod config;
pub mod fetch;
pub mod mutations;
pub mod session;
pub mod transport;
