//! Course portal command line client.
//!
//! Reads a session file, talks to the portal backend, and prints the
//! student's courses, exams, or the result of a professor assignment run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use portal::core::domain::{Course, Exam, format_wire_date};
use portal::core::ids::{CourseId, ProfessorId};
use portal::core::state_update::{CourseFormModel, CoursesView};
use portal::course_form;
use portal::exit_codes;
use portal::io::config::{PortalConfig, init_config, load_config};
use portal::io::fetch::Backend;
use portal::io::mutations::ReconcileOutcome;
use portal::io::session::Session;
use portal::io::transport::HttpTransport;
use portal::my_courses::MyCoursesScreen;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_CONFIG: &str = "portal.toml";

#[derive(Parser)]
#[command(name = "portal", version, about = "Course portal client")]
struct Cli {
    /// TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Backend root; overrides `base_url` from the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with defaults (and `--base-url` if given).
    Init {
        /// Replace an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// List the student's in-progress and finished courses.
    Courses {
        #[arg(long)]
        session: PathBuf,
    },
    /// List the student's exams for one course.
    Exams {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        course: String,
    },
    /// Make the given professors the course's exact assignment.
    Assign {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        course: String,
        /// Repeat for each professor; none detaches everyone.
        #[arg(long = "professor")]
        professors: Vec<String>,
    },
    /// Delete a course.
    DeleteCourse {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        course: String,
    },
}

#[tokio::main]
async fn main() {
    portal::logging::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::INVALID
            } else {
                exit_codes::OK
            };
            // Printing help or a usage error to a closed stream is not actionable.
            let _ = err.print();
            std::process::exit(code);
        }
    };
    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let Cli {
        config,
        base_url,
        command,
    } = cli;
    if let Command::Init { force } = command {
        return cmd_init(&config, base_url, force);
    }
    let cfg = resolve_config(&config, base_url)?;
    match command {
        Command::Init { .. } => Ok(exit_codes::OK),
        Command::Courses { session } => {
            let backend = connect(&cfg, &session)?;
            cmd_courses(&backend, &cfg).await
        }
        Command::Exams { session, course } => {
            let backend = connect(&cfg, &session)?;
            cmd_exams(&backend, &cfg, &CourseId::new(course)).await
        }
        Command::Assign {
            session,
            course,
            professors,
        } => {
            let backend = connect(&cfg, &session)?;
            let target = professors.into_iter().map(ProfessorId::new).collect();
            cmd_assign(&backend, CourseId::new(course), target).await
        }
        Command::DeleteCourse { session, course } => {
            let backend = connect(&cfg, &session)?;
            cmd_delete_course(&backend, CourseId::new(course)).await
        }
    }
}

fn cmd_init(path: &Path, base_url: Option<String>, force: bool) -> Result<i32> {
    let mut cfg = PortalConfig::default();
    if let Some(base_url) = base_url {
        cfg.base_url = base_url;
    }
    init_config(path, &cfg, force)?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}

fn resolve_config(path: &Path, base_url: Option<String>) -> Result<PortalConfig> {
    let mut cfg = load_config(path)?;
    if let Some(base_url) = base_url {
        cfg.base_url = base_url;
        cfg.validate().context("--base-url")?;
    }
    Ok(cfg)
}

fn connect(cfg: &PortalConfig, session: &Path) -> Result<Backend<HttpTransport>> {
    let session = Session::load(session)?;
    let transport = HttpTransport::new(cfg.request_timeout())?;
    info!(base_url = %cfg.base_url, student = %session.user().id, "connecting");
    Ok(Backend::new(transport, cfg.base_url.clone(), session))
}

async fn cmd_courses(backend: &Backend<HttpTransport>, cfg: &PortalConfig) -> Result<i32> {
    let mut screen = MyCoursesScreen::mount(backend, cfg.clock_period());
    screen.load_courses(backend).await;
    screen.next_tick().await;

    let code = match screen.model().view() {
        CoursesView::Loading => bail!("courses did not finish loading"),
        CoursesView::Error(err) => {
            eprintln!("{}", err.user_message());
            exit_codes::FAILED
        }
        CoursesView::Ready {
            in_progress,
            finished,
        } => {
            print_courses("In progress", &in_progress);
            print_courses("Finished", &finished);
            exit_codes::OK
        }
    };
    screen.teardown().await;
    Ok(code)
}

async fn cmd_exams(
    backend: &Backend<HttpTransport>,
    cfg: &PortalConfig,
    course: &CourseId,
) -> Result<i32> {
    let mut screen = MyCoursesScreen::mount(backend, cfg.clock_period());
    screen.load_courses(backend).await;

    let found = screen.model().courses().fold(
        || Ok(None),
        || Ok(None),
        |err| Err(err.user_message()),
        |courses| Ok(courses.iter().find(|c| &c.id == course).cloned()),
    );
    let selected = match found {
        Ok(Some(selected)) => selected,
        Ok(None) => {
            screen.teardown().await;
            bail!("course {course} is not one of the student's courses");
        }
        Err(message) => {
            eprintln!("{message}");
            screen.teardown().await;
            return Ok(exit_codes::FAILED);
        }
    };

    screen.open_exams(backend, selected).await;
    let code = screen.model().modal_exams().fold(
        || exit_codes::FAILED,
        || exit_codes::FAILED,
        |err| {
            eprintln!("{}", err.user_message());
            exit_codes::FAILED
        },
        |exams| {
            print_exams(exams);
            exit_codes::OK
        },
    );
    screen.teardown().await;
    Ok(code)
}

async fn cmd_assign(
    backend: &Backend<HttpTransport>,
    course: CourseId,
    target: BTreeSet<ProfessorId>,
) -> Result<i32> {
    let mut model = CourseFormModel::new(Some(course));
    course_form::load(backend, &mut model, &CancellationToken::new()).await;

    if let Some(err) = model.course_professors().state().failure() {
        eprintln!("{}", err.user_message());
        return Ok(exit_codes::FAILED);
    }
    let Some(assignment) = model.assignment() else {
        bail!("course professors did not load");
    };
    let original = assignment.original().clone();
    for professor in original.difference(&target) {
        model.unassign_professor(professor);
    }
    for professor in target {
        model.assign_professor(professor);
    }

    let report = course_form::reconcile_assignment(backend, &model).await;
    for professor in &report.attached {
        println!("attached {professor}");
    }
    for professor in &report.detached {
        println!("detached {professor}");
    }
    for failure in &report.failures {
        eprintln!("{failure}");
    }
    Ok(match report.outcome() {
        ReconcileOutcome::Unchanged => {
            println!("no changes");
            exit_codes::OK
        }
        ReconcileOutcome::Complete => exit_codes::OK,
        ReconcileOutcome::Partial => exit_codes::PARTIAL,
        ReconcileOutcome::Failed => exit_codes::FAILED,
    })
}

async fn cmd_delete_course(backend: &Backend<HttpTransport>, course: CourseId) -> Result<i32> {
    let model = CourseFormModel::new(Some(course));
    match course_form::delete(backend, &model).await {
        Some(Ok(())) => {
            println!("deleted");
            Ok(exit_codes::OK)
        }
        Some(Err(err)) => {
            eprintln!("{err}");
            Ok(exit_codes::FAILED)
        }
        None => bail!("no course to delete"),
    }
}

fn print_courses(title: &str, courses: &[&Course]) {
    println!("{title}:");
    if courses.is_empty() {
        println!("  (none)");
    }
    for course in courses {
        println!(
            "  {}  {} - {}",
            course.subject_name,
            format_wire_date(course.interval.start),
            format_wire_date(course.interval.end)
        );
    }
}

fn print_exams(exams: &[Exam]) {
    if exams.is_empty() {
        println!("No exams");
    }
    for exam in exams {
        println!("{}  {}", format_wire_date(exam.date), grade_label(exam.grade));
    }
}

fn grade_label(grade: Option<f64>) -> String {
    match grade {
        Some(grade) => format!("{grade:.2}"),
        None => "No grade".to_string(),
    }
}
