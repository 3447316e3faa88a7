//! `myboard` command line entry point.
//!
//! # Responsibility
//! - Map subcommands onto `BoardService` operations against a local
//!   database.
//! - Print projections in a plain, line-oriented form.

mod cli;

use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Command, VaultCommand};
use log::info;
use myboard_core::db::{open_db, DbError};
use myboard_core::{
    init_logging, BoardConfig, BoardService, CalendarMonth, DropOutcome, EditOutcome,
    LoggingError, ServiceError, SqliteKvRepository, TaskDraft, TaskStatus,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Db(DbError),
    Logging(LoggingError),
    Service(ServiceError),
    Io(std::io::Error),
    Usage(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Usage(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CliError {}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

type Board<'conn> = BoardService<SqliteKvRepository<'conn>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("myboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = BoardConfig::default();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        let dir = if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir()?.join(dir)
        };
        init_logging(&config.log_level, &dir)?;
        config.log_dir = Some(dir);
    }

    let conn = open_db(&config.db_path)?;
    let mut board = BoardService::open(SqliteKvRepository::new(&conn), &config);
    info!(
        "event=cli_start module=cli status=ok db={}",
        config.db_path.display()
    );
    execute(&mut board, cli.command)
}

fn execute(board: &mut Board<'_>, command: Command) -> Result<(), CliError> {
    match command {
        Command::Add {
            title,
            desc,
            due,
            priority,
        } => {
            let draft = TaskDraft::new(title)
                .with_description(desc)
                .with_due_date(due)
                .with_priority(priority);
            let outcome = board.save_task(None, &draft)?;
            println!("created {}", outcome.id());
        }
        Command::Edit {
            id,
            title,
            desc,
            due,
            priority,
        } => {
            let draft = TaskDraft::new(title)
                .with_description(desc)
                .with_due_date(due)
                .with_priority(priority);
            match board.save_task(Some(id), &draft)? {
                EditOutcome::Updated(id) => println!("updated {id}"),
                EditOutcome::Created(created) => println!("no task {id}, created {created}"),
            }
        }
        Command::Move { id, status } => move_task(board, id, status)?,
        Command::Board => print_board(board),
        Command::Calendar {
            month,
            add_on,
            title,
        } => {
            if let Some(day) = add_on {
                let date = parse_day(&day)?;
                let id = board.create_on_day(date, TaskDraft::new(title.unwrap_or_default()))?;
                println!("created {id} on {date}");
                return Ok(());
            }
            if let Some(month) = month {
                board.show_month(parse_month(&month)?);
            }
            print_calendar(board);
        }
        Command::Vault { command } => run_vault(board, command)?,
        Command::Export { out } => export(board, &out)?,
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let summary = board.import_backup(&text)?;
            println!(
                "imported tasks={} vault={} budget={}",
                count_label(summary.tasks),
                count_label(summary.vault),
                summary
                    .budget
                    .map_or_else(|| "skipped".to_string(), |route| format!("{route:?}"))
            );
        }
        Command::Theme => {
            let mode = board.toggle_theme()?;
            println!("theme {}", mode.as_str());
        }
    }
    Ok(())
}

fn move_task(board: &mut Board<'_>, id: i64, status: TaskStatus) -> Result<(), CliError> {
    board.begin_drag(id);
    board.hover(&format!("column-{status}"));
    match board.drop(Some(id.to_string().as_str()))? {
        DropOutcome::Moved { id, from, to } => println!("moved {id} {from} -> {to}"),
        DropOutcome::Ignored(reason) => println!("ignored: {reason:?}"),
    }
    Ok(())
}

fn print_board(board: &Board<'_>) {
    let projection = board.board();
    for status in TaskStatus::ALL {
        let column = projection.column(status);
        println!("[{status}] ({})", column.len());
        for task in column {
            let due = task.due_date.as_deref().unwrap_or("-");
            println!("  {:>14}  {:<6} {}  {}", task.id, task.priority.as_str(), due, task.title);
        }
    }
}

fn print_calendar(board: &Board<'_>) {
    let calendar = board.calendar();
    println!("{}", calendar.title);
    for cell in &calendar.days {
        if cell.total() == 0 && !cell.is_today {
            continue;
        }
        let marker = if cell.is_today { "*" } else { " " };
        let chips = cell
            .tasks
            .iter()
            .map(|task| myboard_core::projection::calendar::chip_label(&task.title))
            .collect::<Vec<_>>()
            .join(" | ");
        let more = if cell.overflow > 0 {
            format!(" (+{} more)", cell.overflow)
        } else {
            String::new()
        };
        println!("{marker}{}  {chips}{more}", cell.date_key);
    }
    if !calendar.unscheduled.is_empty() {
        println!("unscheduled:");
        for task in &calendar.unscheduled {
            println!("  {:>14}  {}", task.id, task.title);
        }
    }
}

fn run_vault(board: &mut Board<'_>, command: VaultCommand) -> Result<(), CliError> {
    match command {
        VaultCommand::Add {
            site,
            username,
            password,
        } => {
            let id = board.add_credential(&site, &username, &password)?;
            println!("stored {id}");
        }
        VaultCommand::Delete { id } => {
            if board.delete_credential(id)? {
                println!("deleted {id}");
            } else {
                println!("no credential {id}");
            }
        }
        VaultCommand::List => {
            for entry in board.credentials() {
                println!("{:>14}  {}  {}  ********", entry.id, entry.site, entry.username);
            }
        }
    }
    Ok(())
}

fn export(board: &Board<'_>, out: &Path) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let document = runtime.block_on(board.export_backup());
    let json = document
        .to_json()
        .map_err(|err| CliError::Service(ServiceError::Backup(err)))?;
    let target = out.join(document.file_name());
    std::fs::write(&target, json)?;
    println!("exported {}", target.display());
    Ok(())
}

fn parse_day(value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::Usage(format!("expected YYYY-MM-DD, got `{value}`")))
}

fn parse_month(value: &str) -> Result<CalendarMonth, CliError> {
    let first = parse_day(&format!("{}-01", value.trim()))
        .map_err(|_| CliError::Usage(format!("expected YYYY-MM, got `{value}`")))?;
    Ok(CalendarMonth::containing(first))
}

fn count_label(count: Option<usize>) -> String {
    count.map_or_else(|| "skipped".to_string(), |count| count.to_string())
}
