/// Errors a monitor command reports back to the operator.
///
/// None of these end the monitor: the dispatcher prints the message and
/// reads the next line.
use crate::config::MAXARGS;
use crate::mem::VirtAddr;
use thiserror::Error;

/// Malformed command-line text.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError<'a> {
    #[error("Too many arguments (max {})", MAXARGS)]
    TooManyArguments,
    #[error("error: couldn't parse '{0}' as address.  ex: 0x1000")]
    BadAddress(&'a str),
    #[error("error: couldn't parse '{0}' as permission change.  ex: +W")]
    BadPermission(&'a str),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError<'a> {
    #[error("Unknown command '{0}'")]
    UnknownCommand(&'a str),
    /// Wrong number of arguments; carries the synopsis.
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Parse(ParseError<'a>),
    #[error("error: 0x{0:08x} must be page aligned.")]
    Unaligned(VirtAddr),
    #[error("0x{0:08x} is unmapped.")]
    Unmapped(VirtAddr),
    #[error("console write failed")]
    Output(#[from] core::fmt::Error),
}

// Not `#[from]`: a borrowed error can't be a `source()`.
impl<'a> From<ParseError<'a>> for CommandError<'a> {
    fn from(e: ParseError<'a>) -> Self {
        Self::Parse(e)
    }
}

/// Failure reading from the console.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TerminalError {
    #[error("terminal closed")]
    Closed,
}
