//! Concurrent completions converge regardless of arrival order.

use portal::core::domain::{CourseDetail, Interval, Subject};
use portal::core::ids::{CourseId, ProfessorId, SubjectId};
use portal::core::remote_data::RemoteData;
use portal::core::state_update::{CourseFormModel, CourseFormMsg, MyCoursesModel, MyCoursesMsg};
use portal::error::{FetchError, TransportError};
use portal::test_support::{course, date, professor, student};

fn detail() -> CourseDetail {
    CourseDetail {
        id: CourseId::new("c1"),
        subject_id: SubjectId::new("s1"),
        subject_name: "Algebra".to_string(),
        interval: Interval::new(date(2017, 3, 13), date(2017, 5, 15)),
    }
}

fn subjects_failure() -> FetchError {
    FetchError::Network(TransportError::Status {
        url: "http://api/subjects".to_string(),
        status: 503,
    })
}

/// Every ordering of the four mount-time completions.
fn orders() -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let order = vec![a, b, c, d];
                    let mut seen = order.clone();
                    seen.sort_unstable();
                    seen.dedup();
                    if seen.len() == 4 {
                        out.push(order);
                    }
                }
            }
        }
    }
    out
}

type Snapshot = (
    RemoteData<FetchError, CourseDetail>,
    RemoteData<FetchError, Vec<Subject>>,
    usize,
    Option<Vec<String>>,
);

fn run(order: &[usize]) -> Snapshot {
    let mut model = CourseFormModel::new(Some(CourseId::new("c1")));
    let tickets = model.start_loads();
    let mut msgs = vec![
        tickets.course.map(|t| CourseFormMsg::CourseLoaded(t, Ok(detail()))),
        Some(CourseFormMsg::SubjectsLoaded(tickets.subjects, Err(subjects_failure()))),
        Some(CourseFormMsg::ProfessorsLoaded(
            tickets.professors,
            Ok(vec![professor("p1"), professor("p2"), professor("p3")]),
        )),
        tickets.course_professors.map(|t| {
            CourseFormMsg::CourseProfessorsLoaded(
                t,
                Ok(vec![ProfessorId::new("p1"), ProfessorId::new("p2")]),
            )
        }),
    ];
    for &index in order {
        if let Some(msg) = msgs[index].take() {
            assert!(model.update(msg));
        }
    }
    let assignment = model.assignment().map(|assignment| {
        assignment
            .current()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect()
    });
    (
        model.course().state().clone(),
        model.subjects().state().clone(),
        model.assignable_professors().len(),
        assignment,
    )
}

#[test]
fn course_form_converges_for_every_order() {
    let all = orders();
    assert_eq!(all.len(), 24);
    let reference = run(&all[0]);
    for order in &all[1..] {
        assert_eq!(run(order), reference, "order {order:?} diverged");
    }
    assert_eq!(reference.2, 1);
    assert_eq!(reference.3, Some(vec!["p1".to_string(), "p2".to_string()]));
    assert!(matches!(reference.1, RemoteData::Failure(_)));
}

#[test]
fn superseded_exam_fetch_is_dropped() {
    let mut model = MyCoursesModel::new(student("s1"));
    let first = model.open_exams(course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15)));
    let second = model.open_exams(course("c2", "Physics", (2017, 3, 13), (2017, 5, 15)));

    assert!(model.update(MyCoursesMsg::ExamsLoaded(second, Ok(Vec::new()))));
    assert!(!model.update(MyCoursesMsg::ExamsLoaded(
        first,
        Err(subjects_failure()),
    )));
    assert_eq!(model.modal_exams().state(), &RemoteData::Success(Vec::new()));
    assert_eq!(model.selected_course().map(|c| c.id.as_str()), Some("c2"));
}

#[test]
fn late_exams_after_close_are_discarded() {
    let mut model = MyCoursesModel::new(student("s1"));
    let ticket = model.open_exams(course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15)));
    model.update(MyCoursesMsg::CloseExams);

    assert!(!model.update(MyCoursesMsg::ExamsLoaded(ticket, Ok(Vec::new()))));
    assert_eq!(model.modal_exams().state(), &RemoteData::NotAsked);
}

#[test]
fn ticks_and_course_loads_commute() {
    let courses = vec![course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15))];
    let now = portal::test_support::at_noon(2017, 4, 1);

    let mut tick_first = MyCoursesModel::new(student("s1"));
    let ticket = tick_first.load_courses();
    tick_first.update(MyCoursesMsg::Tick(now));
    tick_first.update(MyCoursesMsg::CoursesLoaded(ticket, Ok(courses.clone())));

    let mut load_first = MyCoursesModel::new(student("s1"));
    let ticket = load_first.load_courses();
    load_first.update(MyCoursesMsg::CoursesLoaded(ticket, Ok(courses)));
    load_first.update(MyCoursesMsg::Tick(now));

    assert_eq!(tick_first.view(), load_first.view());
}
