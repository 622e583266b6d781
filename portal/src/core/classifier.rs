//! Deterministic classification of courses against the current time.

use chrono::NaiveDateTime;

use crate::core::domain::Course;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseStatus {
    Upcoming,
    InProgress,
    Finished,
}

/// - `InProgress` if `now` falls inside the course interval.
/// - `Finished` if the interval ended at or before `now`.
/// - `Upcoming` otherwise.
pub fn classify(course: &Course, now: NaiveDateTime) -> CourseStatus {
    if course.interval.contains(now) {
        CourseStatus::InProgress
    } else if course.interval.is_before(now) {
        CourseStatus::Finished
    } else {
        CourseStatus::Upcoming
    }
}

/// Courses split into `(in_progress, finished)`, each in source order.
///
/// Upcoming courses appear in neither list.
pub fn partition(courses: &[Course], now: NaiveDateTime) -> (Vec<&Course>, Vec<&Course>) {
    let mut in_progress = Vec::new();
    let mut finished = Vec::new();
    for course in courses {
        match classify(course, now) {
            CourseStatus::InProgress => in_progress.push(course),
            CourseStatus::Finished => finished.push(course),
            CourseStatus::Upcoming => {}
        }
    }
    (in_progress, finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at_noon, course};

    #[test]
    fn classify_inside_interval_is_in_progress() {
        let c = course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15));
        assert_eq!(classify(&c, at_noon(2017, 4, 1)), CourseStatus::InProgress);
    }

    #[test]
    fn classify_after_end_is_finished() {
        let c = course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15));
        assert_eq!(classify(&c, at_noon(2017, 5, 15)), CourseStatus::Finished);
    }

    #[test]
    fn classify_before_start_is_upcoming() {
        let c = course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15));
        assert_eq!(classify(&c, at_noon(2017, 1, 1)), CourseStatus::Upcoming);
    }

    #[test]
    fn partition_keeps_source_order_and_drops_upcoming() {
        let courses = vec![
            course("old-2", "Physics", (2016, 3, 1), (2016, 7, 1)),
            course("now-1", "Algebra", (2018, 3, 1), (2018, 12, 1)),
            course("later", "Chemistry", (2019, 3, 1), (2019, 7, 1)),
            course("old-1", "Analysis", (2015, 3, 1), (2015, 7, 1)),
        ];
        let (in_progress, finished) = partition(&courses, at_noon(2018, 6, 1));
        let in_progress: Vec<&str> = in_progress.iter().map(|c| c.id.as_str()).collect();
        let finished: Vec<&str> = finished.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(in_progress, vec!["now-1"]);
        assert_eq!(finished, vec!["old-2", "old-1"]);
    }
}
