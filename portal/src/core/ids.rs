//! Opaque identifiers for backend entities.
//!
//! Every identifier wraps a `String` but is its own nominal type: a
//! [`CourseId`] can never be passed where a [`StudentId`] is expected, even
//! when both hold the same text. Construction and unwrapping are explicit;
//! there are no conversions between identifier types.

use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a course (one offering of a subject).
    CourseId
);
opaque_id!(
    /// Identifier of an exam belonging to a course.
    ExamId
);
opaque_id!(
    /// Identifier of a student, also used for the logged-in user.
    StudentId
);
opaque_id!(
    /// Identifier of a professor assignable to courses.
    ProfessorId
);
opaque_id!(SubjectId);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_and_hash_follow_wrapped_string() {
        let mut seen = HashSet::new();
        seen.insert(CourseId::new("c1"));
        assert!(seen.contains(&CourseId::new("c1")));
        assert!(!seen.contains(&CourseId::new("c2")));
    }

    #[test]
    fn unwrap_returns_original_text() {
        let id = StudentId::new("s-42");
        assert_eq!(id.as_str(), "s-42");
        assert_eq!(id.to_string(), "s-42");
        assert_eq!(id.into_inner(), "s-42".to_string());
    }

    #[test]
    fn ids_order_by_wrapped_string() {
        let mut ids = vec![ProfessorId::new("p3"), ProfessorId::new("p1")];
        ids.sort();
        assert_eq!(ids, vec![ProfessorId::new("p1"), ProfessorId::new("p3")]);
    }
}
