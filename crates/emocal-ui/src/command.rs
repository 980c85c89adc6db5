//! Line commands read from the terminal.

use chrono::{Datelike, NaiveDate};
use emocal_calendar::YearMonth;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  next, n              show the next month
  prev, p              show the previous month
  today                jump back to the current month
  city <name>          search for a city
  day <d|YYYY-MM-DD>   open the hourly detail for a day
  close                close the day detail
  refresh              fetch everything again
  state                print the view state as JSON
  help                 show this help
  quit, q              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayArg {
    /// Day number within the displayed month
    OfMonth(u32),
    Date(NaiveDate),
}

impl DayArg {
    pub fn resolve(&self, month: YearMonth) -> Result<NaiveDate, CommandError> {
        match self {
            Self::Date(date) => Ok(*date),
            Self::OfMonth(day) => month
                .first_day()
                .with_day(*day)
                .ok_or_else(|| CommandError::NoSuchDay {
                    day: *day,
                    month: month.label(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Today,
    City(String),
    Day(DayArg),
    Close,
    Refresh,
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Not a day: {0}")]
    InvalidDay(String),

    #[error("{month} has no day {day}")]
    NoSuchDay { day: u32, month: String },
}

/// Parse one input line. Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "today" => Command::Today,
        "city" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("city"));
            }
            Command::City(rest.to_string())
        }
        "day" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("day"));
            }
            Command::Day(parse_day(rest)?)
        }
        "close" => Command::Close,
        "refresh" => Command::Refresh,
        "state" => Command::State,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };

    Ok(Some(command))
}

fn parse_day(arg: &str) -> Result<DayArg, CommandError> {
    if let Ok(day) = arg.parse::<u32>() {
        return Ok(DayArg::OfMonth(day));
    }
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .map(DayArg::Date)
        .map_err(|_| CommandError::InvalidDay(arg.to_string()))
}
