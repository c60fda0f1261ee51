//! Roster command-line entry point.
//!
//! # Responsibility
//! - Thin caller of `roster_core` repositories and named queries.
//! - Wrap every mutating command in one explicit unit of work.
//!
//! # Invariants
//! - A failed mutation is rolled back before the error is reported.
//! - Output is JSON on stdout; errors go to stderr with exit code 1.

use clap::{Args, Parser, Subcommand};
use log::{error, warn};
use roster_core::logging::init_with_settings;
use roster_core::{
    open_with_config, Class, ClassRepository, EnrollmentRepository, LogSettings,
    NamedQueryRunner, NewStudent, QueryParams, RepoResult, SqliteClassRepository,
    SqliteEnrollmentRepository, SqliteStudentRepository, StoreConfig, StudentId,
    StudentRepository, UnitOfWork,
};
use rusqlite::Connection;
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Student/class roster over SQLite", long_about = None)]
struct Cli {
    /// Database file. Falls back to ROSTER_DB_PATH, then an in-memory store.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Student operations
    #[command(subcommand)]
    Student(StudentCommand),
    /// Class operations
    #[command(subcommand)]
    Class(ClassCommand),
    /// Enroll students in a class, in the given order
    Enroll(EnrollArgs),
    /// Run a named query, e.g. `query Class.findClassByCode code=math17`
    Query(QueryArgs),
}

#[derive(Debug, Subcommand)]
enum StudentCommand {
    Add { first_name: String, last_name: String },
    /// Show a student with enrolled classes
    Show { id: StudentId },
    Remove { id: StudentId },
    List,
}

#[derive(Debug, Subcommand)]
enum ClassCommand {
    Add { code: String, name: String },
    /// Show a class with enrolled students
    Show { code: String },
    Remove { code: String },
    List,
}

#[derive(Debug, Args)]
struct EnrollArgs {
    code: String,
    #[arg(required = true)]
    student_ids: Vec<StudentId>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    name: String,
    /// `name=value` parameters
    params: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        error!("event=cli_command module=cli status=error error={err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(settings) = LogSettings::from_env()? {
        init_with_settings(settings)?;
    }

    let config = match cli.db {
        Some(path) => StoreConfig::file(path)?,
        None => StoreConfig::from_env()?,
    };
    let conn = open_with_config(&config)?;

    let output = match cli.command {
        Commands::Student(command) => student(&conn, command)?,
        Commands::Class(command) => class(&conn, command)?,
        Commands::Enroll(args) => {
            in_unit_of_work(&conn, |conn| {
                SqliteEnrollmentRepository::try_new(conn)?
                    .add_enrollments(&args.code, &args.student_ids)
            })?;
            json!({ "class_code": args.code, "enrolled": args.student_ids })
        }
        Commands::Query(args) => {
            let mut params = QueryParams::new();
            for pair in &args.params {
                let (name, value) = QueryParams::parse_pair(pair)
                    .ok_or_else(|| format!("expected name=value, got `{pair}`"))?;
                params.insert(name, value);
            }
            let result = NamedQueryRunner::try_new(&conn)?.execute(&args.name, &params)?;
            serde_json::to_value(result)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn student(conn: &Connection, command: StudentCommand) -> CliResult<serde_json::Value> {
    let value = match command {
        StudentCommand::Add {
            first_name,
            last_name,
        } => {
            let draft = NewStudent::new(first_name, last_name);
            let student = in_unit_of_work(conn, |conn| {
                SqliteStudentRepository::try_new(conn)?.insert_student(&draft)
            })?;
            serde_json::to_value(student)?
        }
        StudentCommand::Show { id } => {
            let detail = SqliteStudentRepository::try_new(conn)?.find_student_with_classes(id)?;
            serde_json::to_value(detail)?
        }
        StudentCommand::Remove { id } => {
            in_unit_of_work(conn, |conn| {
                SqliteStudentRepository::try_new(conn)?.remove_student(id)
            })?;
            json!({ "removed_student": id })
        }
        StudentCommand::List => {
            serde_json::to_value(SqliteStudentRepository::try_new(conn)?.list_students()?)?
        }
    };
    Ok(value)
}

fn class(conn: &Connection, command: ClassCommand) -> CliResult<serde_json::Value> {
    let value = match command {
        ClassCommand::Add { code, name } => {
            let class = Class::new(code, name);
            let inserted = in_unit_of_work(conn, |conn| {
                SqliteClassRepository::try_new(conn)?.insert_class(&class)
            })?;
            serde_json::to_value(inserted)?
        }
        ClassCommand::Show { code } => {
            let repo = SqliteClassRepository::try_new(conn)?;
            let class = repo.find_class_by_code(&code)?;
            let students: Vec<_> = repo
                .load_class_students(&code)?
                .into_iter()
                .map(|student| json!({ "id": student.id, "name": student.full_name() }))
                .collect();
            json!({ "class": class, "students": students })
        }
        ClassCommand::Remove { code } => {
            in_unit_of_work(conn, |conn| {
                SqliteClassRepository::try_new(conn)?.remove_class(&code)
            })?;
            json!({ "removed_class": code })
        }
        ClassCommand::List => {
            serde_json::to_value(SqliteClassRepository::try_new(conn)?.list_classes()?)?
        }
    };
    Ok(value)
}

/// Runs `work` between begin and commit, rolling back explicitly on failure.
fn in_unit_of_work<T>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> RepoResult<T>,
) -> CliResult<T> {
    let mut uow = UnitOfWork::new(conn);
    uow.begin()?;
    match work(uow.conn()) {
        Ok(value) => {
            uow.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback() {
                warn!("event=cli_rollback module=cli status=error error={rollback_err}");
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::in_unit_of_work;
    use roster_core::{open_db_in_memory, EntityKey, RepoError};

    #[test]
    fn failed_rollback_keeps_the_repository_error() {
        let conn = open_db_in_memory().unwrap();

        let err = in_unit_of_work(&conn, |conn| -> roster_core::RepoResult<()> {
            conn.execute_batch("ROLLBACK;")?;
            Err(RepoError::NotFound(EntityKey::Student(1000)))
        })
        .unwrap_err();

        let repo_err = err
            .downcast_ref::<RepoError>()
            .expect("original error should be returned");
        assert!(matches!(
            repo_err,
            RepoError::NotFound(EntityKey::Student(1000))
        ));
    }
}
