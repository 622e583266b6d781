//! Structured decode failures.

use std::fmt;

/// One step into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// Location of a decode failure, outermost segment first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        Self(
            fields
                .iter()
                .map(|field| Segment::Field(field.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn prepend(&mut self, outer: Vec<Segment>) {
        let inner = std::mem::take(&mut self.0);
        self.0 = outer;
        self.0.extend(inner);
    }
}

/// Renders as `subject.subjectName` or `[2].exam.id`; the root renders as `<root>`.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    /// The value was not a record, or the record had no such key.
    MissingField { field: String },
    /// The value had the wrong JSON type.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A predicate or conversion rejected the value.
    Custom(String),
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeReason::MissingField { field } => write!(f, "field `{field}` not found"),
            DecodeReason::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            DecodeReason::Custom(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decode failed at {path}: {reason}")]
pub struct DecodeError {
    pub path: Path,
    pub reason: DecodeReason,
}

impl DecodeError {
    pub fn new(reason: DecodeReason) -> Self {
        Self {
            path: Path::root(),
            reason,
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(DecodeReason::MissingField {
            field: field.into(),
        })
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::new(DecodeReason::TypeMismatch { expected, found })
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(DecodeReason::Custom(message.into()))
    }

    /// Report this error at `path` instead of its current location.
    pub fn at_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Nest this error beneath a record field.
    pub fn in_field(self, name: &str) -> Self {
        self.within(vec![Segment::Field(name.to_string())])
    }

    /// Nest this error beneath an array element.
    pub fn in_index(self, index: usize) -> Self {
        self.within(vec![Segment::Index(index)])
    }

    pub(crate) fn within(mut self, outer: Vec<Segment>) -> Self {
        self.path.prepend(outer);
        self
    }
}
