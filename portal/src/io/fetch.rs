//! Fetch-and-decode pipeline.
//!
//! [`Backend::fetch_and_decode`] performs one GET and feeds the payload to a
//! [`Decoder`]. Every failure comes back as a [`FetchError`] value: transport
//! failures skip decoding entirely, decode failures are logged with the url
//! and raw payload before being returned. There is no retry here; callers
//! retry by starting their slot again.

use std::future::Future;

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::core::decoder::Decoder;
use crate::core::domain::{Course, CourseDetail, Exam, Professor, Subject};
use crate::core::ids::{CourseId, ProfessorId, StudentId};
use crate::core::payloads;
use crate::core::remote_data::Slot;
use crate::error::{FetchError, TransportError};
use crate::io::session::Session;
use crate::io::transport::{Request, Transport};

/// Transport, backend root, and session for one user.
#[derive(Debug, Clone)]
pub struct Backend<T> {
    transport: T,
    base_url: String,
    session: Session,
}

impl<T: Transport> Backend<T> {
    pub fn new(transport: T, base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Base url followed by `segments`, each percent-encoded as one path segment.
    ///
    /// Ids containing `/`, `?` or `#` stay inside their own segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<String, TransportError> {
        let invalid = |message: &str| TransportError::Request {
            url: self.base_url.clone(),
            message: message.to_string(),
        };
        let mut url = Url::parse(&self.base_url).map_err(|err| invalid(&err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// Session-authenticated request to `url`.
    pub(crate) fn authorized(&self, request: Request) -> Request {
        request.with_bearer(self.session.token())
    }

    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_and_decode<A: 'static>(
        &self,
        url: &str,
        decoder: &Decoder<A>,
    ) -> Result<A, FetchError> {
        let payload = self
            .transport
            .send(self.authorized(Request::get(url)))
            .await
            .map_err(|err| {
                warn!(error = %err, "fetch failed");
                FetchError::Network(err)
            })?;

        decoder.decode(&payload).map_err(|err| {
            error!(url, payload = %payload, error = %err, "response decode failed");
            FetchError::Decode(err)
        })
    }

    /// `GET /student/{id}/courses`
    pub async fn student_courses(&self, student: &StudentId) -> Result<Vec<Course>, FetchError> {
        let url = self.endpoint(&["student", student.as_str(), "courses"])?;
        self.fetch_and_decode(&url, &payloads::courses()).await
    }

    /// `GET /getExamInscriptionByCourse/{id}`, filtered to `student` client-side.
    ///
    /// The backend cannot filter inscriptions by course and student together,
    /// so every student's records for the course are downloaded.
    pub async fn course_student_exams(
        &self,
        course: &CourseId,
        student: &StudentId,
    ) -> Result<Vec<Exam>, FetchError> {
        let url = self.endpoint(&["getExamInscriptionByCourse", course.as_str()])?;
        let decoder = payloads::student_exams(student.clone());
        self.fetch_and_decode(&url, &decoder).await
    }

    pub async fn all_subjects(&self) -> Result<Vec<Subject>, FetchError> {
        let url = self.endpoint(&["subjects"])?;
        self.fetch_and_decode(&url, &payloads::subjects()).await
    }

    pub async fn all_professors(&self) -> Result<Vec<Professor>, FetchError> {
        let url = self.endpoint(&["professors"])?;
        self.fetch_and_decode(&url, &payloads::professors()).await
    }

    pub async fn course_professors(&self, course: &CourseId) -> Result<Vec<ProfessorId>, FetchError> {
        let url = self.endpoint(&["course", course.as_str(), "professors"])?;
        self.fetch_and_decode(&url, &payloads::professor_ids()).await
    }

    pub async fn course_by_id(&self, course: &CourseId) -> Result<CourseDetail, FetchError> {
        let url = self.endpoint(&["course", course.as_str()])?;
        self.fetch_and_decode(&url, &payloads::course_detail()).await
    }
}

/// Await `fut` unless `cancel` fires first; `None` means cancelled.
///
/// A cancelled future is dropped, so nothing it would have produced can
/// reach caller state afterwards.
pub async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => {
            debug!("operation cancelled");
            None
        }
        output = fut => Some(output),
    }
}

/// Start `slot`, await `fut` under `cancel`, and complete the slot with its result.
///
/// Returns `true` if the result was applied. A cancelled fetch leaves the
/// slot untouched after `start`; its ticket is dropped unused.
pub async fn drive<E, A, F>(slot: &mut Slot<E, A>, cancel: &CancellationToken, fut: F) -> bool
where
    F: Future<Output = Result<A, E>>,
{
    let ticket = slot.start();
    match until_cancelled(cancel, fut).await {
        Some(result) => slot.complete(ticket, result),
        None => false,
    }
}
