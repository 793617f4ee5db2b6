/// Built-in monitor commands.
///
/// The registry is a fixed table searched front to back by exact,
/// case-sensitive name. Handlers print to the console and return whether
/// the monitor should keep running; anything that goes wrong comes back as
/// a [`CommandError`] for the dispatcher to print.
use core::fmt::{self, Write};

use super::error::CommandError;
use super::parse::{parse_addr, parse_perm};
use super::{Control, Machine};
use crate::debug::FrameWalker;
use crate::mem::{paddr, Pte, PteFlags, VirtAddr};
use crate::trap::Trapframe;

/// A command handler. The error may borrow from the arguments.
pub type Handler = for<'a, 'b, 'c, 'd, 'e, 'k> fn(
    &'b [&'a str],
    Option<&'c Trapframe>,
    &'d mut dyn Write,
    &'e mut Machine<'k>,
) -> Result<Control, CommandError<'a>>;

pub struct Command {
    pub name: &'static str,
    pub desc: &'static str,
    pub func: Handler,
}

pub static COMMANDS: [Command; 5] = [
    Command {
        name: "help",
        desc: "Display this list of commands",
        func: mon_help,
    },
    Command {
        name: "kerninfo",
        desc: "Display information about the kernel",
        func: mon_kerninfo,
    },
    Command {
        name: "backtrace",
        desc: "Display a backtrace",
        func: mon_backtrace,
    },
    Command {
        name: "showmappings",
        desc: "Show physical page mappings",
        func: mon_showmappings,
    },
    Command {
        name: "perm",
        desc: "Adjust permissions on a page.",
        func: mon_perm,
    },
];

/// Find a command in `commands` by exact name.
pub fn lookup<'c>(commands: &'c [Command], name: &str) -> Option<&'c Command> {
    commands.iter().find(|cmd| cmd.name == name)
}

/// The `W`/`U` letters of an entry, in that order.
struct PermLetters(Pte);

impl fmt::Display for PermLetters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = self.0.flags();
        if flags.contains(PteFlags::W) {
            f.write_str("W")?;
        }
        if flags.contains(PteFlags::U) {
            f.write_str("U")?;
        }
        Ok(())
    }
}

fn mon_help<'a>(
    _argv: &[&'a str],
    _tf: Option<&Trapframe>,
    out: &mut dyn Write,
    _m: &mut Machine<'_>,
) -> Result<Control, CommandError<'a>> {
    for cmd in COMMANDS.iter() {
        writeln!(out, "{} - {}", cmd.name, cmd.desc)?;
    }
    Ok(Control::Continue)
}

fn mon_kerninfo<'a>(
    _argv: &[&'a str],
    _tf: Option<&Trapframe>,
    out: &mut dyn Write,
    m: &mut Machine<'_>,
) -> Result<Control, CommandError<'a>> {
    let l = m.layout;
    writeln!(out, "Special kernel symbols:")?;
    writeln!(out, "  _start                  {:08x} (phys)", l.start)?;
    writeln!(out, "  entry  {:08x} (virt)  {:08x} (phys)", l.entry, paddr(l.entry))?;
    writeln!(out, "  etext  {:08x} (virt)  {:08x} (phys)", l.etext, paddr(l.etext))?;
    writeln!(out, "  edata  {:08x} (virt)  {:08x} (phys)", l.edata, paddr(l.edata))?;
    writeln!(out, "  end    {:08x} (virt)  {:08x} (phys)", l.end, paddr(l.end))?;
    writeln!(out, "Kernel executable memory footprint: {}KB", l.footprint_kb())?;
    Ok(Control::Continue)
}

fn mon_backtrace<'a>(
    _argv: &[&'a str],
    _tf: Option<&Trapframe>,
    out: &mut dyn Write,
    m: &mut Machine<'_>,
) -> Result<Control, CommandError<'a>> {
    writeln!(out, "Stack backtrace:")?;
    for frame in FrameWalker::new(m.stack) {
        let [a0, a1, a2, a3, a4] = frame.args;
        writeln!(
            out,
            "  ebp {:08x}  eip {:08x}  args {:08x} {:08x} {:08x} {:08x} {:08x}",
            frame.ebp, frame.eip, a0, a1, a2, a3, a4
        )?;

        let info = m.debug_info.resolve(frame.eip);
        writeln!(
            out,
            "         {}:{}: {}+{}",
            info.file,
            info.line,
            info.fn_name(),
            info.offset(frame.eip)
        )?;
    }
    Ok(Control::Continue)
}

/// Parse an address argument that must sit on a page boundary.
fn page_arg(arg: &str) -> Result<VirtAddr, CommandError<'_>> {
    let va = VirtAddr(parse_addr(arg)?);
    if !va.is_page_aligned() {
        return Err(CommandError::Unaligned(va));
    }
    Ok(va)
}

/// `showmappings START END`: one line per page in `[START, END)`.
///
/// The walk steps with wrapping arithmetic and stops on equality, so
/// `showmappings 0xfffff000 0x0` covers the last page of the address space.
fn mon_showmappings<'a>(
    argv: &[&'a str],
    _tf: Option<&Trapframe>,
    out: &mut dyn Write,
    m: &mut Machine<'_>,
) -> Result<Control, CommandError<'a>> {
    let &[_, start, end] = argv else {
        return Err(CommandError::Usage("showmappings START END"));
    };
    let start = page_arg(start)?;
    let end = page_arg(end)?;

    let root = m.paging.root();
    writeln!(
        out,
        "Mappings on virtual addresses [0x{:08x}, 0x{:08x}):",
        start, end
    )?;

    let mut va = start;
    while va != end {
        write!(out, "  0x{:08x} ", va)?;
        match m.paging.walk(root, va, false).copied() {
            Some(pte) if pte.is_present() => {
                writeln!(out, "-> 0x{:08x} {}", pte.frame(), PermLetters(pte))?;
            }
            _ => writeln!(out, "(unmapped)")?,
        }
        va = va.next_page();
    }
    Ok(Control::Continue)
}

/// `perm ADDR [+-][WU]`: grant or revoke write/user access on a mapped page.
fn mon_perm<'a>(
    argv: &[&'a str],
    _tf: Option<&Trapframe>,
    out: &mut dyn Write,
    m: &mut Machine<'_>,
) -> Result<Control, CommandError<'a>> {
    let &[_, addr, delta] = argv else {
        return Err(CommandError::Usage("perm ADDR [+-][WU]"));
    };
    let va = page_arg(addr)?;
    let delta = parse_perm(delta)?;

    let root = m.paging.root();
    let pte = match m.paging.walk(root, va, false) {
        Some(pte) if pte.is_present() => pte,
        _ => return Err(CommandError::Unmapped(va)),
    };
    let old = *pte;
    delta.apply(pte);
    let new = *pte;
    m.paging.invalidate(va);

    log::info!("perm: {:?} {:?} -> {:?}", va, old, new);
    writeln!(out, "Set permissions on 0x{:08x} to: {}", va, PermLetters(new))?;
    Ok(Control::Continue)
}
