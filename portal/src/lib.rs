//! Typed client core for the course portal backend.
//!
//! Untrusted JSON is turned into domain values by composable decoders, each
//! fetch is tracked as a four-state [`core::remote_data::RemoteData`], and
//! professor assignment edits are reconciled against the loaded snapshot
//! into per-id attach and detach calls. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (decoding, classification,
//!   reconciliation, screen state updates). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (HTTP transport, session and
//!   config files, the clock). Isolated behind traits to enable fakes in tests.
//!
//! Orchestration modules ([`my_courses`], [`course_form`]) coordinate core
//! state with I/O to implement the screens and CLI commands.

pub mod core;
pub mod course_form;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod my_courses;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
