/// Line editor for the monitor console.
///
/// Supports:
/// - Printable ASCII input
/// - Backspace / DEL (0x08 / 0x7F): delete character before cursor
/// - Enter (CR or LF): submit line
/// - Ctrl-C (0x03): cancel current line
/// - Ctrl-D (0x04): end of input, on an empty line
/// - Ctrl-U (0x15): clear line
/// - Ctrl-L (0x0C): redraw line
use super::error::TerminalError;
use crate::config::CMDBUF_SIZE;

/// A byte-oriented console device.
pub trait Terminal {
    /// Block until a byte arrives.
    fn read_byte(&mut self) -> Result<u8, TerminalError>;

    /// A byte if one is already waiting.
    fn try_read_byte(&mut self) -> Option<u8>;

    fn write_byte(&mut self, byte: u8);

    fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }
}

/// Result of reading one line.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadLine<'a> {
    Line(&'a str),
    /// Ctrl-C: the line was thrown away.
    Cancelled,
    /// Ctrl-D on an empty line, or the terminal went away.
    Eof,
}

pub struct LineEditor<T> {
    term: T,
    buf: [u8; CMDBUF_SIZE],
    len: usize,
}

impl<T: Terminal> LineEditor<T> {
    pub fn new(term: T) -> Self {
        Self {
            term,
            buf: [0u8; CMDBUF_SIZE],
            len: 0,
        }
    }

    pub fn terminal(&self) -> &T {
        &self.term
    }

    /// Print `prompt` and read a line, echoing as it is typed.
    pub fn read_line(&mut self, prompt: &str) -> ReadLine<'_> {
        self.len = 0;
        self.term.write_str(prompt);

        loop {
            let byte = match self.term.read_byte() {
                Ok(b) => b,
                Err(e) => {
                    log::debug!("console: {}", e);
                    return ReadLine::Eof;
                }
            };

            match byte {
                // Enter
                b'\r' | b'\n' => {
                    self.term.write_str("\r\n");
                    // Only printable ASCII is ever stored.
                    let s = core::str::from_utf8(&self.buf[..self.len]).unwrap_or("");
                    return ReadLine::Line(s);
                }

                // Ctrl-C
                0x03 => {
                    self.term.write_str("^C\r\n");
                    self.len = 0;
                    return ReadLine::Cancelled;
                }

                // Ctrl-D: end of input, only on an empty line
                0x04 => {
                    if self.len == 0 {
                        self.term.write_str("\r\n");
                        return ReadLine::Eof;
                    }
                }

                // Ctrl-U: clear line
                0x15 => {
                    self.erase_line();
                    self.len = 0;
                }

                // Ctrl-L
                0x0C => {
                    self.erase_line();
                    self.redraw();
                }

                // Backspace or DEL
                0x08 | 0x7F => {
                    if self.len > 0 {
                        self.len -= 1;
                        // Erase character on terminal: backspace, space, backspace
                        self.term.write_str("\x08 \x08");
                    }
                }

                // Escape sequences (arrow keys etc.) are swallowed
                0x1B => {
                    if let Some(b'[') = self.term.try_read_byte() {
                        // CSI: read until a letter or ~, at most 8 bytes
                        for _ in 0..8 {
                            match self.term.read_byte() {
                                Ok(c) if c.is_ascii_alphabetic() || c == b'~' => break,
                                Ok(_) => {}
                                Err(_) => return ReadLine::Eof,
                            }
                        }
                    }
                }

                // Printable ASCII
                0x20..=0x7E => {
                    if self.len < CMDBUF_SIZE - 1 {
                        self.buf[self.len] = byte;
                        self.len += 1;
                        self.term.write_byte(byte);
                    }
                }

                _ => {}
            }
        }
    }

    /// Erase the current line on the terminal.
    fn erase_line(&mut self) {
        for _ in 0..self.len {
            self.term.write_byte(0x08);
        }
        for _ in 0..self.len {
            self.term.write_byte(b' ');
        }
        for _ in 0..self.len {
            self.term.write_byte(0x08);
        }
    }

    /// Redraw the current line content.
    fn redraw(&mut self) {
        for i in 0..self.len {
            self.term.write_byte(self.buf[i]);
        }
    }
}
