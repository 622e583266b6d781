//! Test-only helpers: a scripted transport and deterministic fixtures.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;

use crate::core::domain::{Course, Interval, Professor, Student};
use crate::core::ids::{CourseId, ProfessorId, StudentId};
use crate::error::TransportError;
use crate::io::session::Session;
use crate::io::transport::{Method, Request, Transport};

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    result: Result<Value, TransportError>,
}

#[derive(Debug, Default)]
struct FakeState {
    routes: HashMap<(Method, String), Scripted>,
    calls: Vec<Request>,
}

/// [`Transport`] answering from a script keyed by method and url.
///
/// Clones share the script and the call log. Unscripted routes answer 404.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, url: &str, result: Result<Value, TransportError>) {
        self.respond_after(method, url, Duration::ZERO, result);
    }

    /// Like [`respond`](Self::respond), answering only after `delay`.
    pub fn respond_after(
        &self,
        method: Method,
        url: &str,
        delay: Duration,
        result: Result<Value, TransportError>,
    ) {
        self.lock()
            .routes
            .insert((method, url.to_string()), Scripted { delay, result });
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<Request> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Result<Value, TransportError> {
        let scripted = {
            let mut state = self.lock();
            let key = (request.method, request.url.clone());
            let scripted = state.routes.get(&key).cloned();
            state.calls.push(request.clone());
            scripted
        };
        match scripted {
            Some(Scripted { delay, result }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(TransportError::Status {
                url: request.url,
                status: 404,
            }),
        }
    }
}

/// Log sink collecting formatted events in memory.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-text subscriber writing every level into this capture.
    ///
    /// Install with `tracing::subscriber::set_default`; it only covers the
    /// current thread.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish()
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| panic!("invalid date {y}-{m}-{d}"))
}

/// Noon on the given day, away from interval boundaries.
pub fn at_noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d)
        .and_hms_opt(12, 0, 0)
        .unwrap_or_else(|| panic!("invalid time on {y}-{m}-{d}"))
}

pub fn course(id: &str, subject_name: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Course {
    Course {
        id: CourseId::new(id),
        subject_name: subject_name.to_string(),
        interval: Interval::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2)),
    }
}

/// Wire form of a course, dates as `d/m/yyyy`.
pub fn course_json(id: &str, subject_name: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "subject": { "subjectName": subject_name },
        "startDate": start,
        "endDate": end,
    })
}

pub fn professor(id: &str) -> Professor {
    Professor {
        id: ProfessorId::new(id),
        name: format!("{id} name"),
        last_name: format!("{id} last"),
    }
}

pub fn student(id: &str) -> Student {
    Student {
        id: StudentId::new(id),
    }
}

pub fn session(student_id: &str, token: Option<&str>) -> Session {
    Session::new(student(student_id), token.map(str::to_string))
}
