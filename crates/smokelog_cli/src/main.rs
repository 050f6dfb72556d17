//! Command-line front-end for the smoking log.
//!
//! # Responsibility
//! - Wire storage, logging and services from flags/environment.
//! - Read the real clock and the machine timezone; core never does.
//! - Flush buffered log lines before the process exits, on every path.

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use serde_json::json;
use smokelog_core::db::open_db;
use smokelog_core::{
    default_log_level, flush_logging, init_logging, CoreConfig, KvRecordStore, NewSmokingRecord,
    RecordService, RecordStore, SettingsService, SmokingRecordFilter, SqliteKvStore,
    SqliteRecordStore,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "smokelog", version, about = "Log smoking events and view statistics")]
struct Cli {
    /// Directory holding the database and logs.
    #[arg(long, env = "SMOKELOG_HOME", default_value = ".smokelog")]
    data_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = StoreKind::Sqlite)]
    store: StoreKind,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// One row per record.
    Sqlite,
    /// Whole history as one JSON document.
    Kv,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Record(RecordCommand),
    /// Show or change daily and monthly budget goals.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Print core linkage info.
    Ping,
}

#[derive(Debug, Subcommand)]
enum RecordCommand {
    /// Log one event (defaults to now).
    Add {
        /// RFC 3339 instant of occurrence.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List logged events, oldest first.
    List {
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete one event by id.
    Delete { id: String },
    /// Today / 7-day / 30-day counts.
    Stats,
    /// Totals plus weekly average.
    Summary,
    /// Per-day counts ending today.
    Daily {
        #[arg(long, default_value_t = 7)]
        days: u16,
    },
    /// Counts per hour of day over the whole history.
    Hourly,
    /// Per-month counts ending this month.
    Monthly {
        #[arg(long, default_value_t = 6)]
        months: u16,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    Show,
    /// Change one or both goals; omitted goals keep their value.
    Set {
        #[arg(long)]
        daily_goal: Option<u32>,
        #[arg(long)]
        monthly_budget_goal: Option<u32>,
    },
    /// Forget stored goals and go back to defaults.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_failed module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run(cli: Cli) -> CliResult<()> {
    let output = match cli.command {
        Command::Ping => json!({
            "ping": smokelog_core::ping(),
            "version": smokelog_core::core_version(),
        }),
        Command::Settings(action) => {
            let (config, db_path) = prepare(cli.data_dir, cli.log_level)?;
            let conn = open_db(db_path)?;
            let kv = SqliteKvStore::new(&conn, config.storage_prefix.as_str());
            execute_settings(&SettingsService::new(kv), action)?
        }
        Command::Record(action) => {
            let (config, db_path) = prepare(cli.data_dir, cli.log_level)?;
            let conn = open_db(db_path)?;
            let store: Box<dyn RecordStore + '_> = match cli.store {
                StoreKind::Sqlite => Box::new(SqliteRecordStore::new(&conn)),
                StoreKind::Kv => Box::new(
                    KvRecordStore::new(SqliteKvStore::new(&conn, config.storage_prefix.as_str()))
                        .with_ttl(config.default_ttl),
                ),
            };
            execute(&RecordService::new(store.as_ref()), action, Local::now())?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Starts file logging under the data directory and returns the db path.
fn prepare(data_dir: PathBuf, log_level: Option<String>) -> CliResult<(CoreConfig, PathBuf)> {
    let config = CoreConfig::default();
    let data_dir = if data_dir.is_absolute() {
        data_dir
    } else {
        std::env::current_dir()?.join(data_dir)
    };

    let level = log_level.unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &config.log_dir(&data_dir))?;

    let db_path = config.db_path(&data_dir);
    Ok((config, db_path))
}

fn execute<S, Tz>(
    service: &RecordService<S>,
    command: RecordCommand,
    now: DateTime<Tz>,
) -> CliResult<serde_json::Value>
where
    S: RecordStore,
    Tz: TimeZone,
{
    let output = match command {
        RecordCommand::Add {
            at,
            location,
            notes,
        } => {
            let input = NewSmokingRecord {
                timestamp: at.unwrap_or_else(|| now.with_timezone(&Utc)),
                location,
                notes,
            };
            serde_json::to_value(service.add(input)?)?
        }
        RecordCommand::List { from, to, location } => {
            let filter = SmokingRecordFilter { from, to, location };
            serde_json::to_value(service.list_filtered(&filter)?)?
        }
        RecordCommand::Delete { id } => json!({ "id": id, "deleted": service.delete(&id)? }),
        RecordCommand::Stats => serde_json::to_value(service.analytics(now)?.stats())?,
        RecordCommand::Summary => serde_json::to_value(service.summary(now)?)?,
        RecordCommand::Daily { days } => {
            serde_json::to_value(service.analytics(now)?.daily(days))?
        }
        RecordCommand::Hourly => serde_json::to_value(service.analytics(now)?.hourly())?,
        RecordCommand::Monthly { months } => {
            serde_json::to_value(service.analytics(now)?.monthly(months))?
        }
    };
    Ok(output)
}

fn execute_settings(
    service: &SettingsService<'_>,
    command: SettingsCommand,
) -> CliResult<serde_json::Value> {
    let settings = match command {
        SettingsCommand::Show => service.load()?,
        SettingsCommand::Set {
            daily_goal,
            monthly_budget_goal,
        } => service.update(daily_goal, monthly_budget_goal)?,
        SettingsCommand::Reset => {
            service.clear()?;
            service.load()?
        }
    };
    Ok(serde_json::to_value(settings)?)
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, RecordCommand, SettingsCommand, StoreKind};
    use clap::Parser;

    #[test]
    fn daily_defaults_to_a_week() {
        let cli = Cli::try_parse_from(["smokelog", "--data-dir", "/tmp/x", "daily"]).unwrap();
        assert_eq!(cli.store, StoreKind::Sqlite);
        assert!(matches!(
            cli.command,
            Command::Record(RecordCommand::Daily { days: 7 })
        ));
    }

    #[test]
    fn add_parses_rfc3339_instant() {
        let cli = Cli::try_parse_from([
            "smokelog",
            "--store",
            "kv",
            "add",
            "--at",
            "2024-01-15T10:00:00+09:00",
            "--location",
            "Home",
        ])
        .unwrap();

        assert_eq!(cli.store, StoreKind::Kv);
        match cli.command {
            Command::Record(RecordCommand::Add { at, location, .. }) => {
                assert_eq!(at.unwrap().to_rfc3339(), "2024-01-15T01:00:00+00:00");
                assert_eq!(location.as_deref(), Some("Home"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_day_counts_are_rejected() {
        let result = Cli::try_parse_from(["smokelog", "daily", "--days", "-3"]);
        assert!(result.is_err());
    }

    #[test]
    fn settings_set_accepts_partial_goals() {
        let cli =
            Cli::try_parse_from(["smokelog", "settings", "set", "--daily-goal", "12"]).unwrap();

        assert!(matches!(
            cli.command,
            Command::Settings(SettingsCommand::Set {
                daily_goal: Some(12),
                monthly_budget_goal: None,
            })
        ));
    }

    #[test]
    fn ping_is_a_top_level_command() {
        let cli = Cli::try_parse_from(["smokelog", "ping"]).unwrap();
        assert!(matches!(cli.command, Command::Ping));
    }

    #[test]
    fn timezone_override_flag_is_not_accepted() {
        assert!(Cli::try_parse_from(["smokelog", "--utc", "stats"]).is_err());
    }
}
