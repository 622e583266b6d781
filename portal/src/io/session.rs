//! Explicit session context for backend calls.
//!
//! The logged-in user and its opaque token are read once, at construction,
//! and then passed to whatever needs them. Nothing reads session state from
//! ambient storage.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::decode_error::DecodeError;
use crate::core::decoder::{Decoder, field, map2, optional, string};
use crate::core::domain::Student;
use crate::core::payloads;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: Student,
    token: Option<String>,
}

impl Session {
    pub fn new(user: Student, token: Option<String>) -> Self {
        Self { user, token }
    }

    pub fn user(&self) -> &Student {
        &self.user
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Decode a stored session: `{ id, token? }`.
    pub fn from_json(raw: &str) -> Result<Self, DecodeError> {
        session_decoder().decode_json(raw)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("decode session {}", path.display()))
    }
}

fn session_decoder() -> Decoder<Session> {
    map2(
        payloads::student(),
        optional(field("token", string())),
        Session::new,
    )
}
