use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_roster::session::Session;
use attendance_roster::{
    config, db, report, seed, stats, AttendanceRoster, Clock, FixedClock, GroupFilter,
    RosterConfig, StudentRecord, SystemClock, TeacherDirectory, TeacherRecord,
};

#[derive(Parser)]
#[command(name = "attendance-roster")]
#[command(about = "Student check-in and attendance roster for the school office", long_about = None)]
struct Cli {
    /// Where the student and teacher directory is read from
    #[arg(long, value_enum, default_value_t = Source::Builtin, global = true)]
    source: Source,
    /// Student CSV, used with --source csv
    #[arg(long, global = true)]
    students: Option<PathBuf>,
    /// Teacher CSV, used with --source csv
    #[arg(long, global = true)]
    teachers: Option<PathBuf>,
    /// Late cutoff as HH:MM or HH:MM:SS, overrides ATTENDANCE_CUTOFF
    #[arg(long, global = true)]
    cutoff: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Builtin,
    Csv,
    Postgres,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the directory schema
    InitDb,
    /// Load the sample directory into Postgres
    SeedDb,
    /// List or search students
    Roster {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = GroupFilter::ALL)]
        grade: String,
        #[arg(long)]
        json: bool,
    },
    /// Check students in and print the result
    CheckIn {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Check-in time for today as HH:MM[:SS] instead of the wall clock
        #[arg(long)]
        at: Option<String>,
    },
    /// Attendance totals for the loaded roster
    Stats {
        #[arg(long)]
        by_grade: bool,
        #[arg(long)]
        json: bool,
    },
    /// List or search teachers
    Teachers {
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long, default_value = GroupFilter::ALL)]
        department: String,
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown attendance report
    Report {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "attendance-report.md")]
        out: PathBuf,
    },
    /// Interactive check-in session reading commands from stdin
    Session {
        /// Freeze the session clock at HH:MM[:SS] today
        #[arg(long)]
        at: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_roster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn roster_config(cli: &Cli) -> anyhow::Result<RosterConfig> {
    let settings = RosterConfig::from_env()?;
    match cli.cutoff.as_deref() {
        Some(value) => Ok(settings.with_cutoff(config::parse_cutoff(value)?)),
        None => Ok(settings),
    }
}

fn today_at(value: &str) -> anyhow::Result<NaiveDateTime> {
    let time = config::parse_cutoff(value).with_context(|| format!("invalid --at {value:?}"))?;
    Ok(Local::now().date_naive().and_time(time))
}

async fn load_students(cli: &Cli) -> anyhow::Result<Vec<StudentRecord>> {
    match cli.source {
        Source::Builtin => seed::sample_students(),
        Source::Csv => {
            let path = cli
                .students
                .as_deref()
                .context("--students is required with --source csv")?;
            seed::load_students_csv(path)
        }
        Source::Postgres => {
            let pool = db::connect(&config::database_url()?).await?;
            db::fetch_students(&pool).await
        }
    }
}

async fn load_teachers(cli: &Cli) -> anyhow::Result<Vec<TeacherRecord>> {
    match cli.source {
        Source::Builtin => Ok(seed::sample_teachers()),
        Source::Csv => match cli.teachers.as_deref() {
            Some(path) => seed::load_teachers_csv(path),
            None => {
                tracing::warn!("no --teachers file given, teacher directory is empty");
                Ok(Vec::new())
            }
        },
        Source::Postgres => {
            let pool = db::connect(&config::database_url()?).await?;
            db::fetch_teachers(&pool).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = roster_config(&cli)?;

    match &cli.command {
        Commands::InitDb => {
            let pool = db::connect(&config::database_url()?).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::SeedDb => {
            let pool = db::connect(&config::database_url()?).await?;
            db::seed(&pool).await?;
            println!("Sample directory inserted.");
        }
        Commands::Roster { query, grade, json } => {
            let roster = AttendanceRoster::new(load_students(&cli).await?, settings)?;
            let found = roster.search(query, &GroupFilter::parse(grade));

            if *json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                println!("No students found matching your search.");
            } else {
                for record in found {
                    println!("{record}");
                }
            }
        }
        Commands::CheckIn { ids, at } => {
            let mut roster = AttendanceRoster::new(load_students(&cli).await?, settings)?;
            let now = match at.as_deref() {
                Some(value) => today_at(value)?,
                None => SystemClock.now(),
            };

            for id in ids {
                let record = roster.check_in(id, now)?;
                println!("{record}");
            }
            println!("{}", roster.stats());
        }
        Commands::Stats { by_grade, json } => {
            let roster = AttendanceRoster::new(load_students(&cli).await?, settings)?;
            if *by_grade {
                let grouped = stats::stats_by_grade(roster.records());
                if *json {
                    println!("{}", serde_json::to_string_pretty(&grouped)?);
                } else {
                    for grade in grouped {
                        println!("{}: {}", grade.grade, grade.stats);
                    }
                }
            } else if *json {
                println!("{}", serde_json::to_string_pretty(&roster.stats())?);
            } else {
                println!("{}", roster.stats());
            }
        }
        Commands::Teachers {
            query,
            department,
            json,
        } => {
            let directory = TeacherDirectory::new(load_teachers(&cli).await?)?;
            let found = directory.search(query, &GroupFilter::parse(department));

            if *json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                println!("No teachers found matching your search.");
            } else {
                for teacher in found {
                    println!("{teacher}");
                }
                println!("Departments: {}", directory.departments().join(", "));
            }
        }
        Commands::Report { date, out } => {
            let roster = AttendanceRoster::new(load_students(&cli).await?, settings)?;
            let directory = TeacherDirectory::new(load_teachers(&cli).await?)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());

            let report = report::build_report(date, settings.cutoff, roster.records(), &directory);
            std::fs::write(out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Session { at } => {
            let roster = AttendanceRoster::new(load_students(&cli).await?, settings)?;
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();

            match at.as_deref() {
                Some(value) => {
                    let clock = FixedClock(today_at(value)?);
                    Session::new(roster, clock).run(stdin.lock(), stdout.lock())?;
                }
                None => Session::new(roster, SystemClock).run(stdin.lock(), stdout.lock())?,
            }
        }
    }

    Ok(())
}
