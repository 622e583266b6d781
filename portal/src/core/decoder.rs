//! Composable decoders from untyped JSON to domain values.
//!
//! A [`Decoder`] is a pure function `&Value -> Result<A, DecodeError>`.
//! Larger decoders are built from small ones; no combinator substitutes a
//! default for a malformed value except [`optional`].
//!
//! Sequencing is strictly left to right and stops at the first failure:
//! [`Decoder::assign`] and [`map2`] both decode against the *original*
//! input value, and a step that fails prevents every later step from
//! running.

use std::fmt::Display;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::trace;

use crate::core::decode_error::{DecodeError, Path, Segment};

type DecodeFn<A> = dyn Fn(&Value) -> Result<A, DecodeError> + Send + Sync;

pub struct Decoder<A> {
    run: Arc<DecodeFn<A>>,
}

impl<A> Clone for Decoder<A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<A: 'static> Decoder<A> {
    pub fn from_fn<F>(run: F) -> Self
    where
        F: Fn(&Value) -> Result<A, DecodeError> + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }

    pub fn decode(&self, value: &Value) -> Result<A, DecodeError> {
        (self.run)(value)
    }

    /// Parse `raw` as JSON, then decode it. Malformed JSON fails at the root.
    pub fn decode_json(&self, raw: &str) -> Result<A, DecodeError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| DecodeError::custom(format!("invalid json: {err}")))?;
        self.decode(&value)
    }

    /// Transform a decoded value. Never introduces a failure.
    pub fn map<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        Decoder::from_fn(move |value| self.decode(value).map(&f))
    }

    /// Transform a decoded value with a conversion that may reject it.
    pub fn try_map<B, E, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        E: Display,
        F: Fn(A) -> Result<B, E> + Send + Sync + 'static,
    {
        Decoder::from_fn(move |value| {
            let decoded = self.decode(value)?;
            f(decoded).map_err(|err| DecodeError::custom(err.to_string()))
        })
    }

    /// Choose the next decoder from the decoded value; it runs on the same input.
    pub fn and_then<B, F>(self, f: F) -> Decoder<B>
    where
        B: 'static,
        F: Fn(A) -> Decoder<B> + Send + Sync + 'static,
    {
        Decoder::from_fn(move |value| {
            let decoded = self.decode(value)?;
            f(decoded).decode(value)
        })
    }

    /// Incremental record assembly.
    ///
    /// Decodes `decoder` against the original input and folds the result into
    /// the accumulator with `put`. If the accumulator (any earlier step) has
    /// already failed, `decoder` is not run and the earlier failure is returned.
    ///
    /// `key` names the member being assembled. A step failing at the input
    /// root is reported beneath `key`; a failure that already carries a path
    /// keeps it.
    pub fn assign<B, C, F>(self, key: &'static str, decoder: Decoder<B>, put: F) -> Decoder<C>
    where
        B: 'static,
        C: 'static,
        F: Fn(A, B) -> C + Send + Sync + 'static,
    {
        Decoder::from_fn(move |value| {
            let acc = self.decode(value)?;
            match decoder.decode(value) {
                Ok(decoded) => Ok(put(acc, decoded)),
                Err(err) => {
                    trace!(key, error = %err, "record assembly stopped");
                    if err.path.is_root() {
                        Err(err.in_field(key))
                    } else {
                        Err(err)
                    }
                }
            }
        })
    }
}

/// Always succeeds with a clone of `seed`, ignoring the input.
pub fn succeed<A>(seed: A) -> Decoder<A>
where
    A: Clone + Send + Sync + 'static,
{
    Decoder::from_fn(move |_| Ok(seed.clone()))
}

/// Always fails with a custom reason.
pub fn fail<A: 'static>(reason: impl Into<String>) -> Decoder<A> {
    let reason = reason.into();
    Decoder::from_fn(move |_| Err(DecodeError::custom(reason.clone())))
}

/// Accept any JSON value unchanged.
pub fn value() -> Decoder<Value> {
    Decoder::from_fn(|value| Ok(value.clone()))
}

pub fn string() -> Decoder<String> {
    Decoder::from_fn(|value| match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(DecodeError::type_mismatch("string", kind(other))),
    })
}

pub fn number() -> Decoder<f64> {
    Decoder::from_fn(|value| match value.as_f64() {
        Some(n) => Ok(n),
        None => Err(DecodeError::type_mismatch("number", kind(value))),
    })
}

pub fn boolean() -> Decoder<bool> {
    Decoder::from_fn(|value| match value {
        Value::Bool(b) => Ok(*b),
        other => Err(DecodeError::type_mismatch("boolean", kind(other))),
    })
}

/// A string parsed as a calendar date with a chrono `format`.
///
/// An unparseable string is a failure, never a placeholder date.
pub fn date(format: &'static str) -> Decoder<NaiveDate> {
    string().try_map(move |raw| {
        NaiveDate::parse_from_str(&raw, format)
            .map_err(|err| format!("invalid date `{raw}` for format `{format}`: {err}"))
    })
}

/// Require a record with key `name` and decode its value with `inner`.
pub fn field<A: 'static>(name: impl Into<String>, inner: Decoder<A>) -> Decoder<A> {
    let name = name.into();
    Decoder::from_fn(move |value| match value.get(name.as_str()) {
        Some(found) => inner.decode(found).map_err(|err| err.in_field(&name)),
        None => Err(DecodeError::missing_field(name.clone()).in_field(&name)),
    })
}

/// Walk nested record keys, then decode the reached value with `inner`.
///
/// A missing key (or a non-record on the way) fails at the full requested
/// path, naming the first key that could not be resolved. Failures of
/// `inner` are reported beneath the full path.
pub fn at<A, S>(path: &[S], inner: Decoder<A>) -> Decoder<A>
where
    A: 'static,
    S: AsRef<str>,
{
    let keys: Vec<String> = path.iter().map(|key| key.as_ref().to_string()).collect();
    Decoder::from_fn(move |value| {
        let mut current = value;
        for key in &keys {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    return Err(DecodeError::missing_field(key.clone())
                        .at_path(Path::from_fields(keys.as_slice())));
                }
            }
        }
        inner.decode(current).map_err(|err| {
            err.within(keys.iter().cloned().map(Segment::Field).collect())
        })
    })
}

/// Decode every element in order; the first failing element aborts with its index.
pub fn array<A: 'static>(inner: Decoder<A>) -> Decoder<Vec<A>> {
    Decoder::from_fn(move |value| match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| inner.decode(item).map_err(|err| err.in_index(index)))
            .collect(),
        other => Err(DecodeError::type_mismatch("array", kind(other))),
    })
}

/// Alias of [`array`] for call sites that read better as a sequence.
pub fn vector<A: 'static>(inner: Decoder<A>) -> Decoder<Vec<A>> {
    array(inner)
}

/// Swallow any failure of `inner` as `None`.
pub fn optional<A: 'static>(inner: Decoder<A>) -> Decoder<Option<A>> {
    Decoder::from_fn(move |value| Ok(inner.decode(value).ok()))
}

/// Run `dec_a`, then `dec_b` on the same input, and combine both results.
///
/// `dec_b` is never invoked when `dec_a` fails.
pub fn map2<A, B, C, F>(dec_a: Decoder<A>, dec_b: Decoder<B>, f: F) -> Decoder<C>
where
    A: 'static,
    B: 'static,
    C: 'static,
    F: Fn(A, B) -> C + Send + Sync + 'static,
{
    Decoder::from_fn(move |value| {
        let a = dec_a.decode(value)?;
        let b = dec_b.decode(value)?;
        Ok(f(a, b))
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
