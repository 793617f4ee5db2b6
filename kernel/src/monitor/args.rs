/// Command-line tokenizer.
///
/// Arguments are slices of the line buffer; nothing is copied. The vector
/// lives for one dispatch cycle, as long as the line it borrows.
use arrayvec::ArrayVec;

use super::error::ParseError;
use crate::config::MAXARGS;

/// Argument separators.
pub const WHITESPACE: [char; 4] = ['\t', '\r', '\n', ' '];

/// Tokens of one command line.
pub type Argv<'a> = ArrayVec<&'a str, MAXARGS>;

/// Split `line` on runs of whitespace.
///
/// Fails when a line holds `MAXARGS` or more tokens; the last slot is kept
/// free as the terminator position.
pub fn tokenize(line: &str) -> Result<Argv<'_>, ParseError<'_>> {
    let mut argv = Argv::new();
    for arg in line.split(WHITESPACE).filter(|s| !s.is_empty()) {
        if argv.len() == MAXARGS - 1 {
            return Err(ParseError::TooManyArguments);
        }
        argv.push(arg);
    }
    Ok(argv)
}
