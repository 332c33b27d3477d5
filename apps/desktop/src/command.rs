//! Parsing of console input lines into board commands.

use shared::domain::TimeSlot;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Show,
    Add(TimeSlot),
    Edit(TimeSlot, usize),
    Delete(TimeSlot, usize),
    ClearAll,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{0}' is not one of the time slots (5:00 PM to 10:00 PM in 15-minute steps)")]
    UnknownSlot(String),
    #[error("expected a booking number starting at 1, got '{0}'")]
    InvalidPosition(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  show                      print every slot
  add <slot>                add a booking, e.g. add 7:00 PM
  edit <slot> <number>      edit the numbered booking in a slot
  delete <slot> <number>    delete the numbered booking in a slot
  clear                     clear the local view (bookings stay in the store)
  help                      show this text
  quit                      leave";

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let command = match verb.to_ascii_lowercase().as_str() {
        "show" | "list" => Command::Show,
        "add" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("add <slot>"));
            }
            Command::Add(resolve_slot(rest)?)
        }
        "edit" => {
            let (slot, index) = slot_and_position(rest, "edit <slot> <number>")?;
            Command::Edit(slot, index)
        }
        "delete" | "rm" => {
            let (slot, index) = slot_and_position(rest, "delete <slot> <number>")?;
            Command::Delete(slot, index)
        }
        "clear" => Command::ClearAll,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Matches slot labels ignoring case and inner spacing, so `7:00pm` works.
pub fn resolve_slot(text: &str) -> Result<TimeSlot, CommandError> {
    let wanted = squash(text);
    TimeSlot::all()
        .find(|slot| squash(slot.label()) == wanted)
        .ok_or_else(|| CommandError::UnknownSlot(text.trim().to_string()))
}

fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Splits `<slot> <number>` and converts the 1-based number to an index.
fn slot_and_position(rest: &str, usage: &'static str) -> Result<(TimeSlot, usize), CommandError> {
    let Some((slot_text, position)) = rest.rsplit_once(char::is_whitespace) else {
        return Err(CommandError::Usage(usage));
    };
    let slot = resolve_slot(slot_text)?;
    let index = match position.parse::<usize>() {
        Ok(number) if number > 0 => number - 1,
        _ => return Err(CommandError::InvalidPosition(position.to_string())),
    };
    Ok((slot, index))
}
