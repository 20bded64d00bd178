use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use course_core::model::{BatchId, CourseId, LessonId, MaterialId, Role, SortOrder, UserId};
use services::{ApiConfig, AppServices, Clock};
use tracing_subscriber::EnvFilter;

mod commands;
mod drafts;

const DEFAULT_DB_URL: &str = "sqlite:course.sqlite3";

/// Command-line client for the course platform.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base url. Falls back to `COURSE_API_URL`, then the local dev server.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the sign-in token is kept.
    #[arg(long, global = true, env = "COURSE_DB_URL", default_value = DEFAULT_DB_URL)]
    db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login {
        email: String,
        #[arg(long, env = "COURSE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Page that sent you to the login screen.
        #[arg(long)]
        next: Option<String>,
    },
    /// Create an account and sign in.
    Register {
        name: String,
        email: String,
        #[arg(long, env = "COURSE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Browse the course catalog.
    Courses {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one course with its syllabus and batches.
    Course { id: CourseId },
    /// Join a batch of a course.
    Enroll { course: CourseId, batch: BatchId },
    /// List your enrollments with progress.
    Enrolled,
    /// Open the lesson player for an enrolled course.
    Learn {
        course: CourseId,
        #[arg(long)]
        lesson: Option<LessonId>,
    },
    /// Mark a lesson as completed.
    Complete { course: CourseId, lesson: LessonId },
    /// Show the assignments and quizzes of a lesson.
    Materials { course: CourseId, lesson: LessonId },
    /// Send an assignment answer.
    Submit {
        assignment: MaterialId,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        link: Option<String>,
    },
    /// Answer a quiz. Use `-` to skip a question.
    Quiz {
        course: CourseId,
        lesson: LessonId,
        quiz: MaterialId,
        #[arg(required = true, allow_hyphen_values = true)]
        answers: Vec<String>,
        #[arg(long, default_value_t = 0)]
        seconds: u32,
    },
    /// Check which page a path would show for the current session.
    Open { path: String },
    /// Admin dashboard numbers.
    Stats,
    /// Every enrollment on the platform.
    Enrollments,
    /// Every assignment submission.
    Submissions,
    /// Grade one student's submission.
    Grade {
        assignment: MaterialId,
        student: UserId,
        score: u32,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Daily enrollment counts.
    Analytics,
    /// Publish a course from a JSON file.
    CourseCreate { file: PathBuf },
    /// Replace a course with the contents of a JSON file.
    CourseEdit { id: CourseId, file: PathBuf },
    CourseDelete { id: CourseId },
    /// Every assignment and quiz attached to a lesson.
    LessonMaterials { course: CourseId, lesson: LessonId },
    /// Attach an assignment to a lesson.
    AssignmentCreate {
        course: CourseId,
        lesson: LessonId,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// `YYYY-MM-DD` (end of that day, UTC) or an RFC 3339 timestamp.
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
        #[arg(long, default_value_t = 100)]
        max_score: u32,
    },
    /// Attach a quiz, read from a JSON file, to a lesson.
    QuizCreate {
        course: CourseId,
        lesson: LessonId,
        file: PathBuf,
    },
}

fn parse_sort(raw: &str) -> Result<SortOrder, String> {
    match raw {
        "price_asc" => Ok(SortOrder::PriceAsc),
        "price_desc" => Ok(SortOrder::PriceDesc),
        "newest" => Ok(SortOrder::Newest),
        other => Err(format!(
            "unknown sort order {other}, expected price_asc, price_desc or newest"
        )),
    }
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(23, 59, 59)
            .map(|end| end.and_utc())
            .ok_or_else(|| format!("invalid due date {raw}"));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| format!("invalid due date {raw}, expected YYYY-MM-DD or RFC 3339"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn api_config(api_url: Option<&str>) -> anyhow::Result<ApiConfig> {
    let config = ApiConfig::from_env().context("invalid backend configuration")?;
    match api_url {
        Some(url) => ApiConfig::new(url, config.timeout).context("invalid --api-url"),
        None => Ok(config),
    }
}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

// sqlx does not create missing database files on its own.
fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("creating {}", path.display()))?;
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_url = normalize_sqlite_url(&cli.db);
    prepare_sqlite_file(&db_url)?;
    let config = api_config(cli.api_url.as_deref())?;
    tracing::debug!(db_url, api = %config.base_url, "starting");

    let services = AppServices::new_sqlite(&db_url, &config, Clock::default())
        .await
        .context("could not open local storage")?;
    services.session().check().await;

    commands::execute(&services, cli.command).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn memory_and_absolute_urls_are_kept() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/course.db"),
            "sqlite:///tmp/course.db"
        );
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let url = normalize_sqlite_url("sqlite:data/course.sqlite3");
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/course.sqlite3"));
    }

    #[test]
    fn prepare_rejects_non_sqlite_url() {
        assert!(prepare_sqlite_file("postgres://localhost/db").is_err());
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }

    #[test]
    fn grade_arguments_parse_into_ids() {
        let cli = Cli::try_parse_from([
            "course", "grade", "a1", "s1", "18", "--feedback", "nice",
        ])
        .unwrap();
        match cli.command {
            Command::Grade {
                assignment,
                student,
                score,
                feedback,
            } => {
                assert_eq!(assignment.as_str(), "a1");
                assert_eq!(student.as_str(), "s1");
                assert_eq!(score, 18);
                assert_eq!(feedback.as_deref(), Some("nice"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn blank_ids_and_bad_sort_are_rejected() {
        assert!(Cli::try_parse_from(["course", "course", " "]).is_err());
        assert!(Cli::try_parse_from(["course", "courses", "--sort", "cheapest"]).is_err());
        let cli = Cli::try_parse_from(["course", "courses", "--sort", "price_desc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Courses {
                sort: Some(SortOrder::PriceDesc),
                ..
            }
        ));
    }

    #[test]
    fn due_dates_accept_days_and_timestamps() {
        let day = parse_due("2024-06-30").unwrap();
        assert_eq!(day.to_rfc3339(), "2024-06-30T23:59:59+00:00");
        let ts = parse_due("2024-06-30T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-06-30T10:00:00+00:00");
        assert!(parse_due("next week").is_err());
    }

    #[test]
    fn course_authoring_commands_parse() {
        let cli = Cli::try_parse_from(["course", "course-edit", "c1", "draft.json"]).unwrap();
        match cli.command {
            Command::CourseEdit { id, file } => {
                assert_eq!(id.as_str(), "c1");
                assert_eq!(file, PathBuf::from("draft.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["course", "course-delete", ".."]).is_err());

        let cli = Cli::try_parse_from([
            "course",
            "assignment-create",
            "c1",
            "l1",
            "Essay",
            "--due",
            "2024-06-30",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::AssignmentCreate {
                max_score: 100,
                due: Some(_),
                ..
            }
        ));
    }
}
