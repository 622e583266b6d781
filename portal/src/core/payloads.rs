//! Decoders for the backend's JSON payloads.

use chrono::NaiveDate;
use serde_json::Value;

use crate::core::decoder::{
    Decoder, at, field, map2, number, optional, string, succeed, value, vector,
};
use crate::core::domain::{
    Course, CourseDetail, Exam, ExamInscription, Interval, Professor, Student, Subject,
    parse_wire_date,
};
use crate::core::ids::{CourseId, ExamId, ProfessorId, StudentId, SubjectId};

fn wire_date() -> Decoder<NaiveDate> {
    string().try_map(|raw| parse_wire_date(&raw))
}

fn interval() -> Decoder<Interval> {
    map2(
        field("startDate", wire_date()),
        field("endDate", wire_date()),
        Interval::new,
    )
}

/// `{ id, subject: { subjectName }, startDate, endDate }`
pub fn course() -> Decoder<Course> {
    succeed(())
        .assign("id", field("id", string()).map(CourseId::new), |(), id| id)
        .assign(
            "subjectName",
            at(&["subject", "subjectName"], string()),
            |id, subject_name| (id, subject_name),
        )
        .assign("interval", interval(), |(id, subject_name), interval| Course {
            id,
            subject_name,
            interval,
        })
}

pub fn courses() -> Decoder<Vec<Course>> {
    vector(course())
}

/// `{ exam: { id, date }, result: number | null, student: { id } }`
pub fn exam_inscription() -> Decoder<ExamInscription> {
    succeed(())
        .assign("id", at(&["exam", "id"], string()).map(ExamId::new), |(), id| id)
        .assign("date", at(&["exam", "date"], wire_date()), |id, date| {
            (id, date)
        })
        .assign("grade", field("result", optional(number())), |(id, date), grade| {
            Exam { id, date, grade }
        })
        .assign(
            "studentId",
            at(&["student", "id"], string()).map(StudentId::new),
            |exam, student| ExamInscription { exam, student },
        )
}

/// Exams of one student, filtered client-side from the course-wide listing.
///
/// The backend only lists inscriptions per course; there is no combined
/// course + student query yet.
pub fn student_exams(student: StudentId) -> Decoder<Vec<Exam>> {
    vector(exam_inscription()).map(move |inscriptions| {
        inscriptions
            .into_iter()
            .filter(|inscription| inscription.student == student)
            .map(|inscription| inscription.exam)
            .collect()
    })
}

/// `{ id }` as stored for the logged-in user.
pub fn student() -> Decoder<Student> {
    field("id", string()).map(|id| Student {
        id: StudentId::new(id),
    })
}

/// `{ id, name, lastName }`
pub fn professor() -> Decoder<Professor> {
    succeed(())
        .assign("id", field("id", string()).map(ProfessorId::new), |(), id| id)
        .assign("name", field("name", string()), |id, name| (id, name))
        .assign("lastName", field("lastName", string()), |(id, name), last_name| {
            Professor {
                id,
                name,
                last_name,
            }
        })
}

pub fn professors() -> Decoder<Vec<Professor>> {
    vector(professor())
}

/// Only the ids of a course's professor listing matter for reconciliation.
pub fn professor_ids() -> Decoder<Vec<ProfessorId>> {
    vector(field("id", string()).map(ProfessorId::new))
}

/// `{ id, subjectName, careerYear }`
pub fn subject() -> Decoder<Subject> {
    succeed(())
        .assign("id", field("id", string()).map(SubjectId::new), |(), id| id)
        .assign("subjectName", field("subjectName", string()), |id, name| {
            (id, name)
        })
        .assign(
            "careerYear",
            field("careerYear", whole_number()),
            |(id, subject_name), career_year| Subject {
                id,
                subject_name,
                career_year,
            },
        )
}

pub fn subjects() -> Decoder<Vec<Subject>> {
    vector(subject())
}

/// `{ id, subject: { id, subjectName }, startDate, endDate }`
pub fn course_detail() -> Decoder<CourseDetail> {
    succeed(())
        .assign("id", field("id", string()).map(CourseId::new), |(), id| id)
        .assign(
            "subjectId",
            at(&["subject", "id"], string()).map(SubjectId::new),
            |id, subject_id| (id, subject_id),
        )
        .assign(
            "subjectName",
            at(&["subject", "subjectName"], string()),
            |(id, subject_id), subject_name| (id, subject_id, subject_name),
        )
        .assign(
            "interval",
            interval(),
            |(id, subject_id, subject_name), interval| CourseDetail {
                id,
                subject_id,
                subject_name,
                interval,
            },
        )
}

/// Non-negative integer sent as a JSON number.
fn whole_number() -> Decoder<u32> {
    value().try_map(|raw: Value| {
        raw.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("expected non-negative integer, found {raw}"))
    })
}
