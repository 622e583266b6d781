//! Deterministic, pure logic shared by the portal.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod decode_error;
pub mod decoder;
pub mod domain;
pub mod ids;
pub mod payloads;
pub mod reconcile;
pub mod remote_data;
pub mod state_update;
