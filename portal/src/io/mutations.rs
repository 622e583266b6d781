//! Mutation calls and the reconciliation run.

use futures::future::join_all;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::core::domain::CourseDraft;
use crate::core::ids::{CourseId, ProfessorId};
use crate::core::reconcile::Diff;
use crate::error::{Direction, ReconciliationError, TransportError};
use crate::io::fetch::Backend;
use crate::io::transport::{Request, Transport};

impl<T: Transport> Backend<T> {
    /// `POST /course/{course}/professor/{professor}`
    pub async fn attach_professor(
        &self,
        course: &CourseId,
        professor: &ProfessorId,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&["course", course.as_str(), "professor", professor.as_str()])?;
        self.transport()
            .send(self.authorized(Request::post(url)))
            .await
            .map(discard_body)
    }

    /// `DELETE /course/{course}/professor/{professor}`
    pub async fn detach_professor(
        &self,
        course: &CourseId,
        professor: &ProfessorId,
    ) -> Result<(), TransportError> {
        let url = self.endpoint(&["course", course.as_str(), "professor", professor.as_str()])?;
        self.transport()
            .send(self.authorized(Request::delete(url)))
            .await
            .map(discard_body)
    }

    /// `POST /course` for a new course, `POST /course/{id}` for an update.
    pub async fn save_course(&self, draft: &CourseDraft) -> Result<(), TransportError> {
        let url = match &draft.id {
            Some(id) => self.endpoint(&["course", id.as_str()])?,
            None => self.endpoint(&["course"])?,
        };
        let body = serde_json::to_value(draft).map_err(|err| TransportError::Request {
            url: url.clone(),
            message: format!("serialize course: {err}"),
        })?;
        self.transport()
            .send(self.authorized(Request::post(url).with_body(body)))
            .await
            .map(discard_body)
    }

    /// `DELETE /course/{course}`
    #[instrument(skip_all, fields(course = %course))]
    pub async fn delete_course(&self, course: &CourseId) -> Result<(), TransportError> {
        let url = self.endpoint(&["course", course.as_str()])?;
        let deleted = self
            .transport()
            .send(self.authorized(Request::delete(url)))
            .await
            .map(discard_body);
        match &deleted {
            Ok(()) => info!("course deleted"),
            Err(err) => warn!(error = %err, "course delete failed"),
        }
        deleted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to attach or detach.
    Unchanged,
    /// Every call succeeded.
    Complete,
    /// Some calls succeeded and some failed.
    Partial,
    /// Every call failed.
    Failed,
}

/// Per-professor results of one reconciliation run.
///
/// Lists are in ascending professor id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub attached: Vec<ProfessorId>,
    pub detached: Vec<ProfessorId>,
    pub failures: Vec<ReconciliationError>,
}

impl ReconcileReport {
    pub fn outcome(&self) -> ReconcileOutcome {
        let succeeded = self.attached.len() + self.detached.len();
        match (succeeded, self.failures.len()) {
            (0, 0) => ReconcileOutcome::Unchanged,
            (_, 0) => ReconcileOutcome::Complete,
            (0, _) => ReconcileOutcome::Failed,
            _ => ReconcileOutcome::Partial,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Issue one attach per added and one detach per removed professor, concurrently.
///
/// Waits for every call before returning; a failed call never hides the
/// outcome of its siblings.
#[instrument(skip_all, fields(course = %course, added = diff.added.len(), removed = diff.removed.len()))]
pub async fn apply_diff<T: Transport>(
    backend: &Backend<T>,
    course: &CourseId,
    diff: &Diff<ProfessorId>,
) -> ReconcileReport {
    let attaches = diff.added.iter().map(|professor| async move {
        let result = backend.attach_professor(course, professor).await;
        (Direction::Attach, professor.clone(), result)
    });
    let detaches = diff.removed.iter().map(|professor| async move {
        let result = backend.detach_professor(course, professor).await;
        (Direction::Detach, professor.clone(), result)
    });
    let (attached, detached) = futures::join!(join_all(attaches), join_all(detaches));

    let mut report = ReconcileReport::default();
    for (direction, professor, result) in attached.into_iter().chain(detached) {
        match result {
            Ok(()) => match direction {
                Direction::Attach => report.attached.push(professor),
                Direction::Detach => report.detached.push(professor),
            },
            Err(cause) => {
                warn!(%professor, %direction, error = %cause, "assignment change failed");
                report.failures.push(ReconciliationError {
                    professor,
                    direction,
                    cause,
                });
            }
        }
    }

    info!(
        attached = report.attached.len(),
        detached = report.detached.len(),
        failed = report.failures.len(),
        "reconciliation finished"
    );
    report
}

/// Mutation endpoints answer with an empty body or a JSON echo; either is accepted.
fn discard_body(_: Value) {}
