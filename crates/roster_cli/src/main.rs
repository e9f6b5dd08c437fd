//! Roster CLI
//!
//! Thin command-line driver over the student repository. Records are
//! printed as JSON, one per line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use roster_core::{
    core_version, default_log_level, init_logging, ConnectionManager, SqliteStudentRepository,
    StoreConfig, Student, StudentDto, StudentRepository,
};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Roster - local student record store")]
#[command(version)]
struct Cli {
    /// Store file (defaults to ROSTER_DB_PATH or ./roster.sqlite3)
    #[arg(long, global = true, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory store
    #[arg(long, global = true)]
    memory: bool,

    /// Write logs to this absolute directory
    #[arg(long, global = true, env = "ROSTER_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new student
    #[command(alias = "create")]
    Add(StudentArgs),
    /// Show one student by registration
    Get {
        registration: String,
    },
    /// List all students
    #[command(alias = "ls")]
    List {
        /// Keep creation order instead of sorting by registration
        #[arg(long)]
        insertion_order: bool,
    },
    /// Replace the profile of an existing student
    Update(StudentArgs),
    /// Delete a student by registration
    #[command(alias = "rm")]
    Delete {
        registration: String,
    },
    /// Show store location, state and record count
    Status,
}

#[derive(Args)]
struct StudentArgs {
    registration: String,
    #[arg(long, default_value = "")]
    national_id: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
}

impl StudentArgs {
    fn into_student(self) -> Result<Student> {
        Student::new(
            self.registration,
            self.national_id,
            self.name,
            self.email,
            self.phone,
        )
        .context("invalid student")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let config = if cli.memory {
        StoreConfig::in_memory()
    } else if let Some(path) = cli.db.as_ref() {
        StoreConfig::file(path)
    } else {
        StoreConfig::from_env()
    };
    let manager = Arc::new(ConnectionManager::new(config));
    let repo = SqliteStudentRepository::new(Arc::clone(&manager));

    match cli.command {
        Commands::Add(args) => {
            let student = args.into_student()?;
            repo.create(&student).await?;
            print_student(&student)?;
        }
        Commands::Get { registration } => match repo.find_by_registration(&registration).await? {
            Some(student) => print_student(&student)?,
            None => anyhow::bail!("student with registration {registration} not found"),
        },
        Commands::List { insertion_order } => {
            let students = if insertion_order {
                repo.list_in_insertion_order().await?
            } else {
                repo.list_ordered_by_registration().await?
            };
            for student in &students {
                print_student(student)?;
            }
        }
        Commands::Update(args) => {
            let student = args.into_student()?;
            repo.update(&student).await?;
            print_student(&student)?;
        }
        Commands::Delete { registration } => {
            let target = Student::new(registration, "", "", "", "").context("invalid student")?;
            repo.delete(&target).await?;
            println!("Deleted {}", target.registration());
        }
        Commands::Status => {
            let count = repo.count().await?;
            let status = serde_json::json!({
                "version": core_version(),
                "store": format!("{:?}", manager.config().location),
                "state": format!("{:?}", manager.state()),
                "students": count,
            });
            println!("{status}");
        }
    }

    log::logger().flush();
    Ok(())
}

fn print_student(student: &Student) -> Result<()> {
    let json = StudentDto::from(student)
        .to_json()
        .context("failed to serialize student")?;
    println!("{json}");
    Ok(())
}
