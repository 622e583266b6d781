//! Screen state and the message updates that drive it.
//!
//! Each fetch owns exactly one slot. A completion message names its slot and
//! carries the ticket issued when the fetch started, so applying completions
//! in any order converges on the same state: no update ever writes a slot it
//! does not own or restores a stale copy of the whole model.

use chrono::NaiveDateTime;

use crate::core::classifier::partition;
use crate::core::domain::{Course, CourseDetail, Exam, Professor, Student, Subject};
use crate::core::ids::{CourseId, ProfessorId};
use crate::core::reconcile::Assignment;
use crate::core::remote_data::{Slot, Ticket};
use crate::error::FetchError;

pub type WebSlot<A> = Slot<FetchError, A>;
pub type FetchResult<A> = Result<A, FetchError>;

#[derive(Debug)]
pub enum MyCoursesMsg {
    CoursesLoaded(Ticket, FetchResult<Vec<Course>>),
    ExamsLoaded(Ticket, FetchResult<Vec<Exam>>),
    Tick(NaiveDateTime),
    CloseExams,
}

/// What the courses screen should show right now.
#[derive(Debug, PartialEq)]
pub enum CoursesView<'a> {
    Loading,
    Error(&'a FetchError),
    Ready {
        in_progress: Vec<&'a Course>,
        finished: Vec<&'a Course>,
    },
}

/// State of the student's courses screen.
#[derive(Debug)]
pub struct MyCoursesModel {
    student: Student,
    now: Option<NaiveDateTime>,
    courses: WebSlot<Vec<Course>>,
    selected_course: Option<Course>,
    modal_exams: WebSlot<Vec<Exam>>,
}

impl MyCoursesModel {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            now: None,
            courses: Slot::new(),
            selected_course: None,
            modal_exams: Slot::new(),
        }
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn now(&self) -> Option<NaiveDateTime> {
        self.now
    }

    pub fn courses(&self) -> &WebSlot<Vec<Course>> {
        &self.courses
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.selected_course.as_ref()
    }

    pub fn modal_exams(&self) -> &WebSlot<Vec<Exam>> {
        &self.modal_exams
    }

    pub fn load_courses(&mut self) -> Ticket {
        self.courses.start()
    }

    /// Select `course` and start its exams fetch; a previous modal's fetch goes stale.
    pub fn open_exams(&mut self, course: Course) -> Ticket {
        self.selected_course = Some(course);
        self.modal_exams.start()
    }

    /// Returns `false` if the message was a stale completion and was dropped.
    pub fn update(&mut self, msg: MyCoursesMsg) -> bool {
        match msg {
            MyCoursesMsg::CoursesLoaded(ticket, result) => self.courses.complete(ticket, result),
            MyCoursesMsg::ExamsLoaded(ticket, result) => {
                self.modal_exams.complete(ticket, result)
            }
            MyCoursesMsg::Tick(now) => {
                self.now = Some(now);
                true
            }
            MyCoursesMsg::CloseExams => {
                self.selected_course = None;
                self.modal_exams.reset();
                true
            }
        }
    }

    /// Courses split by status once both the list and the clock are available.
    pub fn view(&self) -> CoursesView<'_> {
        self.courses.fold(
            || CoursesView::Loading,
            || CoursesView::Loading,
            CoursesView::Error,
            |courses| match self.now {
                Some(now) => {
                    let (in_progress, finished) = partition(courses, now);
                    CoursesView::Ready {
                        in_progress,
                        finished,
                    }
                }
                None => CoursesView::Loading,
            },
        )
    }
}

#[derive(Debug)]
pub enum CourseFormMsg {
    CourseLoaded(Ticket, FetchResult<CourseDetail>),
    SubjectsLoaded(Ticket, FetchResult<Vec<Subject>>),
    ProfessorsLoaded(Ticket, FetchResult<Vec<Professor>>),
    CourseProfessorsLoaded(Ticket, FetchResult<Vec<ProfessorId>>),
}

/// Tickets for the fetches a course form issues on mount.
#[derive(Debug)]
pub struct FormTickets {
    pub course: Option<Ticket>,
    pub subjects: Ticket,
    pub professors: Ticket,
    pub course_professors: Option<Ticket>,
}

/// State of the course create/edit form.
#[derive(Debug)]
pub struct CourseFormModel {
    course_id: Option<CourseId>,
    course: WebSlot<CourseDetail>,
    subjects: WebSlot<Vec<Subject>>,
    professors: WebSlot<Vec<Professor>>,
    course_professors: WebSlot<Vec<ProfessorId>>,
    assignment: Option<Assignment>,
}

impl CourseFormModel {
    /// `course_id` is `None` for a new course.
    pub fn new(course_id: Option<CourseId>) -> Self {
        Self {
            course_id,
            course: Slot::new(),
            subjects: Slot::new(),
            professors: Slot::new(),
            course_professors: Slot::new(),
            assignment: None,
        }
    }

    pub fn course_id(&self) -> Option<&CourseId> {
        self.course_id.as_ref()
    }

    pub fn is_new(&self) -> bool {
        self.course_id.is_none()
    }

    pub fn course(&self) -> &WebSlot<CourseDetail> {
        &self.course
    }

    pub fn subjects(&self) -> &WebSlot<Vec<Subject>> {
        &self.subjects
    }

    pub fn professors(&self) -> &WebSlot<Vec<Professor>> {
        &self.professors
    }

    pub fn course_professors(&self) -> &WebSlot<Vec<ProfessorId>> {
        &self.course_professors
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    /// Start every mount-time fetch. Course-specific fetches only run when editing.
    pub fn start_loads(&mut self) -> FormTickets {
        let editing = self.course_id.is_some();
        FormTickets {
            course: editing.then(|| self.course.start()),
            subjects: self.subjects.start(),
            professors: self.professors.start(),
            course_professors: editing.then(|| self.course_professors.start()),
        }
    }

    pub fn update(&mut self, msg: CourseFormMsg) -> bool {
        match msg {
            CourseFormMsg::CourseLoaded(ticket, result) => self.course.complete(ticket, result),
            CourseFormMsg::SubjectsLoaded(ticket, result) => self.subjects.complete(ticket, result),
            CourseFormMsg::ProfessorsLoaded(ticket, result) => {
                self.professors.complete(ticket, result)
            }
            CourseFormMsg::CourseProfessorsLoaded(ticket, result) => {
                let loaded = result.as_ref().ok().cloned();
                let applied = self.course_professors.complete(ticket, result);
                if applied
                    && self.assignment.is_none()
                    && let Some(ids) = loaded
                {
                    self.assignment = Some(Assignment::loaded(ids));
                }
                applied
            }
        }
    }

    /// Add a professor to the edited assignment. `false` until it has loaded.
    pub fn assign_professor(&mut self, professor: ProfessorId) -> bool {
        self.assignment
            .as_mut()
            .is_some_and(|assignment| assignment.assign(professor))
    }

    pub fn unassign_professor(&mut self, professor: &ProfessorId) -> bool {
        self.assignment
            .as_mut()
            .is_some_and(|assignment| assignment.unassign(professor))
    }

    /// Professors that can still be added, in listing order.
    pub fn assignable_professors(&self) -> Vec<&Professor> {
        let Some(professors) = self.professors.state().success() else {
            return Vec::new();
        };
        professors
            .iter()
            .filter(|professor| {
                self.assignment
                    .as_ref()
                    .is_none_or(|assignment| !assignment.current().contains(&professor.id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::remote_data::RemoteData;
    use crate::error::TransportError;
    use crate::test_support::{at_noon, course, professor, student};

    fn network(url: &str) -> FetchError {
        FetchError::Network(TransportError::Status {
            url: url.to_string(),
            status: 503,
        })
    }

    #[test]
    fn courses_view_waits_for_clock() {
        let mut model = MyCoursesModel::new(student("s1"));
        let ticket = model.load_courses();
        let courses = vec![course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15))];
        assert!(model.update(MyCoursesMsg::CoursesLoaded(ticket, Ok(courses))));
        assert_eq!(model.view(), CoursesView::Loading);

        model.update(MyCoursesMsg::Tick(at_noon(2017, 4, 1)));
        match model.view() {
            CoursesView::Ready {
                in_progress,
                finished,
            } => {
                assert_eq!(in_progress.len(), 1);
                assert!(finished.is_empty());
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn courses_view_surfaces_failure() {
        let mut model = MyCoursesModel::new(student("s1"));
        let ticket = model.load_courses();
        model.update(MyCoursesMsg::CoursesLoaded(ticket, Err(network("u"))));
        assert!(matches!(model.view(), CoursesView::Error(_)));
    }

    #[test]
    fn closing_modal_drops_late_exam_results() {
        let mut model = MyCoursesModel::new(student("s1"));
        let c = course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15));
        let ticket = model.open_exams(c);
        assert!(model.modal_exams().state().is_pending());

        model.update(MyCoursesMsg::CloseExams);
        assert!(!model.update(MyCoursesMsg::ExamsLoaded(ticket, Ok(Vec::new()))));
        assert!(model.selected_course().is_none());
        assert_eq!(model.modal_exams().state(), &RemoteData::NotAsked);
    }

    #[test]
    fn reopening_modal_supersedes_previous_fetch() {
        let mut model = MyCoursesModel::new(student("s1"));
        let first = model.open_exams(course("c1", "Algebra", (2017, 3, 13), (2017, 5, 15)));
        let second = model.open_exams(course("c2", "Physics", (2017, 3, 13), (2017, 5, 15)));
        assert!(model.update(MyCoursesMsg::ExamsLoaded(second, Ok(Vec::new()))));
        assert!(!model.update(MyCoursesMsg::ExamsLoaded(first, Err(network("u")))));
        assert_eq!(model.modal_exams().state(), &RemoteData::Success(Vec::new()));
        assert_eq!(model.selected_course().map(|c| c.id.as_str()), Some("c2"));
    }

    #[test]
    fn new_course_form_skips_course_fetches() {
        let mut model = CourseFormModel::new(None);
        let tickets = model.start_loads();
        assert!(tickets.course.is_none());
        assert!(tickets.course_professors.is_none());
        assert_eq!(model.course().state(), &RemoteData::NotAsked);
        assert!(model.subjects().state().is_pending());
    }

    #[test]
    fn assignment_is_captured_on_first_load_only() {
        let mut model = CourseFormModel::new(Some(CourseId::new("c1")));
        let tickets = model.start_loads();
        let ticket = tickets.course_professors.expect("editing");
        model.update(CourseFormMsg::CourseProfessorsLoaded(
            ticket,
            Ok(vec![ProfessorId::new("p1")]),
        ));
        assert!(model.assign_professor(ProfessorId::new("p2")));

        let reload = model.course_professors.start();
        model.update(CourseFormMsg::CourseProfessorsLoaded(
            reload,
            Ok(vec![ProfessorId::new("p9")]),
        ));
        let assignment = model.assignment().expect("loaded");
        assert_eq!(assignment.original().len(), 1);
        assert!(assignment.original().contains(&ProfessorId::new("p1")));
        assert!(assignment.current().contains(&ProfessorId::new("p2")));
    }

    #[test]
    fn failed_or_stale_professor_loads_leave_no_assignment() {
        let mut model = CourseFormModel::new(Some(CourseId::new("c1")));
        let stale = model.start_loads().course_professors.expect("editing");
        let current = model.course_professors.start();

        assert!(!model.update(CourseFormMsg::CourseProfessorsLoaded(
            stale,
            Ok(vec![ProfessorId::new("p1")]),
        )));
        assert!(model.assignment().is_none());

        assert!(model.update(CourseFormMsg::CourseProfessorsLoaded(
            current,
            Err(network("u")),
        )));
        assert!(model.assignment().is_none());
        assert!(!model.assign_professor(ProfessorId::new("p1")));
    }

    #[test]
    fn edits_before_load_are_rejected() {
        let mut model = CourseFormModel::new(Some(CourseId::new("c1")));
        let _tickets = model.start_loads();
        assert!(!model.assign_professor(ProfessorId::new("p1")));
    }

    #[test]
    fn assignable_professors_excludes_current() {
        let mut model = CourseFormModel::new(Some(CourseId::new("c1")));
        let tickets = model.start_loads();
        model.update(CourseFormMsg::ProfessorsLoaded(
            tickets.professors,
            Ok(vec![professor("p1"), professor("p2"), professor("p3")]),
        ));
        model.update(CourseFormMsg::CourseProfessorsLoaded(
            tickets.course_professors.expect("editing"),
            Ok(vec![ProfessorId::new("p2")]),
        ));
        let ids: Vec<&str> = model
            .assignable_professors()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p1", "p3"]);
    }
}
