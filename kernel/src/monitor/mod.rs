/// Kernel monitor: a command shell over the console.
///
/// Entered from the boot path or a breakpoint trap. Reads a line, splits it
/// into arguments, runs the matching built-in command and goes around again
/// until a command asks to leave or the console reaches end of input.
///
/// The monitor owns nothing of the kernel's: it borrows the stack, the debug
/// info and the page tables through [`Machine`] for as long as it runs.
pub mod args;
pub mod commands;
pub mod error;
pub mod line;
pub mod parse;

use core::fmt::Write;

use crate::config::PROMPT;
use crate::debug::{DebugInfo, StackMemory};
use crate::mem::{KernelLayout, PageWalker};
use crate::trap::Trapframe;

pub use args::{tokenize, Argv};
pub use commands::{lookup, Command, COMMANDS};
pub use error::{CommandError, ParseError, TerminalError};
pub use line::{LineEditor, ReadLine, Terminal};
pub use parse::{parse_addr, parse_perm, PermDelta, PermOp};

/// What the monitor does after a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    /// Leave the monitor and return to the caller.
    Exit,
}

/// Kernel state the commands read and modify.
pub struct Machine<'k> {
    pub layout: KernelLayout,
    pub stack: &'k dyn StackMemory,
    pub debug_info: &'k dyn DebugInfo,
    pub paging: &'k mut dyn PageWalker,
}

/// Run the monitor with the built-in [`COMMANDS`].
pub fn run<T: Terminal>(
    editor: &mut LineEditor<T>,
    out: &mut dyn Write,
    machine: &mut Machine<'_>,
    tf: Option<&Trapframe>,
) {
    run_with(&COMMANDS, editor, out, machine, tf)
}

/// Run the monitor over `commands` until one returns [`Control::Exit`] or
/// the console reports end of input.
pub fn run_with<T: Terminal>(
    commands: &[Command],
    editor: &mut LineEditor<T>,
    out: &mut dyn Write,
    machine: &mut Machine<'_>,
    tf: Option<&Trapframe>,
) {
    let _ = writeln!(out, "Welcome to the kmon kernel monitor!");
    let _ = writeln!(out, "Type 'help' for a list of commands.");
    if let Some(tf) = tf {
        let _ = write!(out, "{}", tf);
    }

    loop {
        match editor.read_line(PROMPT) {
            ReadLine::Line(line) => {
                if runcmd(commands, line, out, machine, tf) == Control::Exit {
                    log::debug!("monitor: exit requested");
                    break;
                }
            }
            ReadLine::Cancelled => {}
            ReadLine::Eof => {
                log::debug!("monitor: end of input");
                break;
            }
        }
    }
}

/// Execute one command line. Errors are printed, never propagated.
pub fn runcmd(
    commands: &[Command],
    line: &str,
    out: &mut dyn Write,
    machine: &mut Machine<'_>,
    tf: Option<&Trapframe>,
) -> Control {
    match execute(commands, line, out, machine, tf) {
        Ok(control) => control,
        Err(e) => {
            let _ = writeln!(out, "{}", e);
            Control::Continue
        }
    }
}

fn execute<'a>(
    commands: &[Command],
    line: &'a str,
    out: &mut dyn Write,
    machine: &mut Machine<'_>,
    tf: Option<&Trapframe>,
) -> Result<Control, CommandError<'a>> {
    let argv = tokenize(line)?;
    let Some(&name) = argv.first() else {
        return Ok(Control::Continue);
    };
    let cmd = lookup(commands, name).ok_or(CommandError::UnknownCommand(name))?;

    log::debug!("monitor: running '{}' with {} argument(s)", cmd.name, argv.len() - 1);
    (cmd.func)(&argv[..], tf, out, machine)
}
