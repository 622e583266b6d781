//! Orchestration for the student's courses screen.
//!
//! [`MyCoursesScreen`] owns the screen model, the clock feeding it, and the
//! cancellation token for its fetches. Tearing the screen down (or dropping
//! it) stops the clock and cancels whatever is still in flight, so no
//! completion or tick reaches the model afterwards.

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::core::domain::Course;
use crate::core::ids::StudentId;
use crate::core::remote_data::Ticket;
use crate::core::state_update::{MyCoursesModel, MyCoursesMsg};
use crate::io::clock::Clock;
use crate::io::fetch::{Backend, until_cancelled};
use crate::io::transport::Transport;

const TICK_BUFFER: usize = 4;

/// Fetch the student's courses and wrap the result for `ticket`.
pub async fn courses_msg<T: Transport>(
    backend: &Backend<T>,
    student: &StudentId,
    ticket: Ticket,
) -> MyCoursesMsg {
    MyCoursesMsg::CoursesLoaded(ticket, backend.student_courses(student).await)
}

/// Fetch the student's exams for `course` and wrap the result for `ticket`.
pub async fn exams_msg<T: Transport>(
    backend: &Backend<T>,
    course: &Course,
    student: &StudentId,
    ticket: Ticket,
) -> MyCoursesMsg {
    let result = backend.course_student_exams(&course.id, student).await;
    MyCoursesMsg::ExamsLoaded(ticket, result)
}

#[derive(Debug)]
pub struct MyCoursesScreen {
    model: MyCoursesModel,
    clock: Option<Clock>,
    ticks: mpsc::Receiver<NaiveDateTime>,
    cancel: CancellationToken,
}

impl MyCoursesScreen {
    /// Mount the screen for the session's user, ticking every `period`.
    pub fn mount<T: Transport>(backend: &Backend<T>, period: Duration) -> Self {
        let (tx, ticks) = mpsc::channel(TICK_BUFFER);
        let clock = Clock::spawn(period, tx);
        Self::with_clock(MyCoursesModel::new(backend.session().user().clone()), clock, ticks)
    }

    /// Mount around an already running clock.
    pub fn with_clock(
        model: MyCoursesModel,
        clock: Clock,
        ticks: mpsc::Receiver<NaiveDateTime>,
    ) -> Self {
        Self {
            model,
            clock: Some(clock),
            ticks,
            cancel: CancellationToken::new(),
        }
    }

    pub fn model(&self) -> &MyCoursesModel {
        &self.model
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns `false` if the fetch was cancelled or its completion was stale.
    #[instrument(skip_all, fields(student = %self.model.student().id))]
    pub async fn load_courses<T: Transport>(&mut self, backend: &Backend<T>) -> bool {
        let ticket = self.model.load_courses();
        let student = self.model.student().id.clone();
        match until_cancelled(&self.cancel, courses_msg(backend, &student, ticket)).await {
            Some(msg) => self.model.update(msg),
            None => false,
        }
    }

    #[instrument(skip_all, fields(course = %course.id))]
    pub async fn open_exams<T: Transport>(&mut self, backend: &Backend<T>, course: Course) -> bool {
        let student = self.model.student().id.clone();
        let ticket = self.model.open_exams(course.clone());
        match until_cancelled(&self.cancel, exams_msg(backend, &course, &student, ticket)).await {
            Some(msg) => self.model.update(msg),
            None => false,
        }
    }

    pub fn close_exams(&mut self) {
        self.model.update(MyCoursesMsg::CloseExams);
    }

    /// Wait for the next tick and apply it. `false` once the clock has stopped.
    pub async fn next_tick(&mut self) -> bool {
        match until_cancelled(&self.cancel, self.ticks.recv()).await {
            Some(Some(now)) => self.model.update(MyCoursesMsg::Tick(now)),
            Some(None) | None => false,
        }
    }

    /// Apply every tick already delivered; returns how many were applied.
    pub fn drain_ticks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(now) = self.ticks.try_recv() {
            self.model.update(MyCoursesMsg::Tick(now));
            applied += 1;
        }
        applied
    }

    /// Cancel in-flight work and wait for the clock to stop.
    pub async fn teardown(mut self) -> MyCoursesModel {
        self.cancel.cancel();
        if let Some(clock) = self.clock.take() {
            clock.join().await;
        }
        self.ticks.close();
        debug!("courses screen torn down");
        let placeholder = MyCoursesModel::new(self.model.student().clone());
        std::mem::replace(&mut self.model, placeholder)
    }
}

impl Drop for MyCoursesScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(clock) = &self.clock {
            clock.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state_update::CoursesView;
    use crate::io::transport::Method;
    use crate::test_support::{FakeTransport, at_noon, course_json, session, student};
    use serde_json::json;

    fn backend(transport: &FakeTransport) -> Backend<FakeTransport> {
        Backend::new(transport.clone(), "http://api", session("s1", None))
    }

    fn screen() -> MyCoursesScreen {
        let (tx, ticks) = mpsc::channel(TICK_BUFFER);
        let clock = Clock::spawn_with(Duration::from_secs(1), tx, || at_noon(2017, 4, 1));
        MyCoursesScreen::with_clock(MyCoursesModel::new(student("s1")), clock, ticks)
    }

    #[tokio::test(start_paused = true)]
    async fn loads_and_classifies_after_first_tick() {
        let transport = FakeTransport::new();
        transport.respond(
            Method::Get,
            "http://api/student/s1/courses",
            Ok(json!([
                course_json("c1", "Algebra", "13/3/2017", "15/5/2017"),
                course_json("c0", "Physics", "1/3/2016", "1/7/2016"),
            ])),
        );
        let mut screen = screen();
        assert!(screen.load_courses(&backend(&transport)).await);
        assert_eq!(screen.model().view(), CoursesView::Loading);

        assert!(screen.next_tick().await);
        match screen.model().view() {
            CoursesView::Ready {
                in_progress,
                finished,
            } => {
                assert_eq!(in_progress.len(), 1);
                assert_eq!(in_progress[0].subject_name, "Algebra");
                assert_eq!(finished.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        screen.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_fetch_never_reaches_the_model() {
        let transport = FakeTransport::new();
        transport.respond_after(
            Method::Get,
            "http://api/student/s1/courses",
            Duration::from_secs(30),
            Ok(json!([])),
        );
        let mut screen = screen();
        screen.cancellation().cancel();
        assert!(!screen.load_courses(&backend(&transport)).await);
        assert!(screen.model().courses().state().is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_ticks() {
        let mut screen = screen();
        assert!(screen.next_tick().await);
        let model = screen.teardown().await;
        assert_eq!(model.now(), Some(at_noon(2017, 4, 1)));
    }
}
