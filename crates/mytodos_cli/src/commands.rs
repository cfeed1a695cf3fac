//! Line command parser.
//!
//! # Responsibility
//! - Turn one line of terminal input into a typed `Command`.
//!
//! # Invariants
//! - Task positions are 1-based, as printed by the list view.
//! - Free text keeps its inner spacing; the core owns trimming rules.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Done(usize),
    Remove(usize),
    Star(usize),
    Edit(usize, String),
    /// Empty text clears the deadline.
    Due(usize, String),
    Note(usize, String),
    Find(String),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingPosition(&'static str),
    InvalidPosition(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::Unknown(word) => write!(f, "unknown command `{word}`, try `help`"),
            Self::MissingPosition(command) => write!(f, "`{command}` needs a task number"),
            Self::InvalidPosition(raw) => write!(f, "`{raw}` is not a task number"),
        }
    }
}

impl Error for CommandError {}

pub const HELP: &str = "\
commands:
  add <text>            add a task
  done <n>              toggle completion
  rm <n>                delete a task
  star <n>              toggle priority
  edit <n> <text>       replace task text
  due <n> [when]        set deadline (2025-06-01T18:00 or 01-06-2025 18:00), blank clears
  note <n> [text]       set details
  find <query>          filter tasks
  list                  show all tasks
  quit                  exit";

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim_start();
    let (word, rest) = split_word(line);
    if word.is_empty() {
        return Err(CommandError::Empty);
    }

    match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Ok(Command::Add(rest.to_string())),
        "done" | "d" => Ok(Command::Done(position("done", rest)?.0)),
        "rm" | "del" => Ok(Command::Remove(position("rm", rest)?.0)),
        "star" | "s" => Ok(Command::Star(position("star", rest)?.0)),
        "edit" | "e" => {
            let (index, text) = position("edit", rest)?;
            Ok(Command::Edit(index, text.to_string()))
        }
        "due" => {
            let (index, text) = position("due", rest)?;
            Ok(Command::Due(index, text.to_string()))
        }
        "note" | "n" => {
            let (index, text) = position("note", rest)?;
            Ok(Command::Note(index, text.to_string()))
        }
        "find" | "f" => Ok(Command::Find(rest.to_string())),
        "list" | "ls" => Ok(Command::List),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(word.to_string())),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn position<'a>(command: &'static str, rest: &'a str) -> Result<(usize, &'a str), CommandError> {
    let (raw, tail) = split_word(rest);
    if raw.is_empty() {
        return Err(CommandError::MissingPosition(command));
    }
    match raw.parse::<usize>() {
        Ok(index) if index > 0 => Ok((index, tail)),
        _ => Err(CommandError::InvalidPosition(raw.to_string())),
    }
}
