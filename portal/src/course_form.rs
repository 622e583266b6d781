//! Orchestration for the course create/edit form.
//!
//! Mount-time fetches run concurrently and each completion is applied to
//! [`CourseFormModel`] as soon as it arrives. Submitting runs the professor
//! reconciliation and the course save side by side and reports both.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::core::domain::CourseDraft;
use crate::core::state_update::{CourseFormModel, CourseFormMsg, FormTickets};
use crate::error::TransportError;
use crate::io::fetch::{Backend, until_cancelled};
use crate::io::mutations::{ReconcileOutcome, ReconcileReport, apply_diff};
use crate::io::transport::Transport;

/// Futures producing one completion message per started fetch.
pub fn load_futures<'a, T: Transport>(
    backend: &'a Backend<T>,
    model: &CourseFormModel,
    tickets: FormTickets,
) -> FuturesUnordered<LocalBoxFuture<'a, CourseFormMsg>> {
    let pending = FuturesUnordered::new();
    let FormTickets {
        course,
        subjects,
        professors,
        course_professors,
    } = tickets;

    pending.push(
        async move { CourseFormMsg::SubjectsLoaded(subjects, backend.all_subjects().await) }
            .boxed_local(),
    );
    pending.push(
        async move { CourseFormMsg::ProfessorsLoaded(professors, backend.all_professors().await) }
            .boxed_local(),
    );
    if let (Some(id), Some(ticket)) = (model.course_id().cloned(), course) {
        pending.push(
            async move { CourseFormMsg::CourseLoaded(ticket, backend.course_by_id(&id).await) }
                .boxed_local(),
        );
    }
    if let (Some(id), Some(ticket)) = (model.course_id().cloned(), course_professors) {
        pending.push(
            async move {
                let result = backend.course_professors(&id).await;
                CourseFormMsg::CourseProfessorsLoaded(ticket, result)
            }
            .boxed_local(),
        );
    }
    pending
}

/// Start every mount-time fetch and apply completions in arrival order.
///
/// Returns `false` if `cancel` fired first; nothing is applied after that.
#[instrument(skip_all, fields(course = ?model.course_id().map(ToString::to_string)))]
pub async fn load<T: Transport>(
    backend: &Backend<T>,
    model: &mut CourseFormModel,
    cancel: &CancellationToken,
) -> bool {
    let tickets = model.start_loads();
    let mut pending = load_futures(backend, model, tickets);
    loop {
        match until_cancelled(cancel, pending.next()).await {
            Some(Some(msg)) => {
                model.update(msg);
            }
            Some(None) => return true,
            None => return false,
        }
    }
}

/// Outcome of a form submit. The two parts succeed or fail independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReport {
    pub reconciliation: ReconcileReport,
    pub save: Result<(), TransportError>,
}

impl SubmitReport {
    pub fn is_success(&self) -> bool {
        self.save.is_ok() && self.reconciliation.is_success()
    }
}

/// Apply the form's professor edits. Unchanged when nothing was edited or
/// the assignment never loaded.
pub async fn reconcile_assignment<T: Transport>(
    backend: &Backend<T>,
    model: &CourseFormModel,
) -> ReconcileReport {
    match (model.course_id(), model.assignment()) {
        (Some(course), Some(assignment)) if assignment.is_dirty() => {
            apply_diff(backend, course, &assignment.diff()).await
        }
        _ => ReconcileReport::default(),
    }
}

#[instrument(skip_all, fields(new = model.is_new()))]
pub async fn submit<T: Transport>(
    backend: &Backend<T>,
    model: &CourseFormModel,
    draft: &CourseDraft,
) -> SubmitReport {
    let (reconciliation, save) = tokio::join!(
        reconcile_assignment(backend, model),
        backend.save_course(draft)
    );

    if let Err(err) = &save {
        warn!(error = %err, "course save failed");
    }
    match reconciliation.outcome() {
        ReconcileOutcome::Partial | ReconcileOutcome::Failed => {
            warn!(failed = reconciliation.failures.len(), "some assignment changes failed");
        }
        ReconcileOutcome::Complete | ReconcileOutcome::Unchanged => {}
    }
    info!(saved = save.is_ok(), "course form submitted");
    SubmitReport {
        reconciliation,
        save,
    }
}

/// Delete the course being edited. `None` for a new course, which has nothing to delete.
#[instrument(skip_all, fields(course = ?model.course_id().map(ToString::to_string)))]
pub async fn delete<T: Transport>(
    backend: &Backend<T>,
    model: &CourseFormModel,
) -> Option<Result<(), TransportError>> {
    let course = model.course_id()?;
    Some(backend.delete_course(course).await)
}
