//! Domain values produced by successful decoding.
//!
//! Values are immutable once decoded; a refreshed fetch replaces them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::core::ids::{CourseId, ExamId, ProfessorId, StudentId, SubjectId};

/// Wire format of every date the backend sends or accepts (`d/M/yyyy`).
pub const WIRE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Closed-open span of calendar days, both ends taken at midnight.
///
/// `start <= end` is assumed, not enforced; form validation upstream owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Interval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `start <= instant < end`.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start_at() <= instant && instant < self.end_at()
    }

    /// The whole interval lies before `instant` (`end <= instant`).
    pub fn is_before(&self, instant: NaiveDateTime) -> bool {
        self.end_at() <= instant
    }

    fn start_at(&self) -> NaiveDateTime {
        self.start.and_time(chrono::NaiveTime::MIN)
    }

    fn end_at(&self) -> NaiveDateTime {
        self.end.and_time(chrono::NaiveTime::MIN)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub subject_name: String,
    pub interval: Interval,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    pub id: ExamId,
    pub date: NaiveDate,
    /// `None` until the exam has been graded.
    pub grade: Option<f64>,
}

/// An exam record as the backend lists it: every student's inscription for a course.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamInscription {
    pub exam: Exam,
    pub student: StudentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    pub last_name: String,
}

impl Professor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: SubjectId,
    pub subject_name: String,
    pub career_year: u32,
}

/// Course as loaded by the edit form, keeping the subject identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDetail {
    pub id: CourseId,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub interval: Interval,
}

/// Request body for creating or updating a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub subject: SubjectRef,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectRef {
    pub id: String,
}

impl CourseDraft {
    pub fn new(id: Option<&CourseId>, subject: &SubjectId, interval: Interval) -> Self {
        Self {
            id: id.map(|id| id.as_str().to_string()),
            subject: SubjectRef {
                id: subject.as_str().to_string(),
            },
            start_date: format_wire_date(interval.start),
            end_date: format_wire_date(interval.end),
        }
    }
}

/// Format without zero padding, matching what the backend emits.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

/// Parse `d/m/yyyy`: one or two digit day and month, exactly four digit year.
///
/// chrono alone would read `13/3/17` as year 17 and accept a signed year.
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate, String> {
    let invalid = || format!("invalid date `{raw}`, expected d/m/yyyy");
    let digits = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    let mut parts = raw.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None)
            if digits(day, 1, 2) && digits(month, 1, 2) && digits(year, 4, 4) => {}
        _ => return Err(invalid()),
    }
    NaiveDate::parse_from_str(raw, WIRE_DATE_FORMAT).map_err(|err| format!("{}: {err}", invalid()))
}
