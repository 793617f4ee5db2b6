/// Saved register state of an interrupted context.
///
/// Layout matches what the i386 trap entry stubs push: `pushal`, then
/// `%es`/`%ds`, the vector number and error code, and finally the frame the
/// CPU pushes itself. `esp`/`ss` are only valid when the trap crossed from
/// user to kernel mode.
use core::fmt;

/// Registers as pushed by `pushal`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct PushRegs {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// Useless (the esp before pushal).
    pub oesp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Trapframe {
    pub regs: PushRegs,
    pub es: u16,
    pub padding1: u16,
    pub ds: u16,
    pub padding2: u16,
    pub trapno: u32,
    // Pushed by the hardware from here down.
    pub err: u32,
    pub eip: u32,
    pub cs: u16,
    pub padding3: u16,
    pub eflags: u32,
    // Only when crossing rings.
    pub esp: u32,
    pub ss: u16,
    pub padding4: u16,
}

static_assertions::const_assert_eq!(core::mem::size_of::<PushRegs>(), 32);
static_assertions::const_assert_eq!(core::mem::size_of::<Trapframe>(), 68);

pub const T_BRKPT: u32 = 3;
pub const T_PGFLT: u32 = 14;
pub const T_SYSCALL: u32 = 48;
pub const IRQ_OFFSET: u32 = 32;

const EXCEPTION_NAMES: [&str; 20] = [
    "Divide error",
    "Debug",
    "Non-Maskable Interrupt",
    "Breakpoint",
    "Overflow",
    "BOUND Range Exceeded",
    "Invalid Opcode",
    "Device Not Available",
    "Double Fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack Fault",
    "General Protection",
    "Page Fault",
    "(unknown trap)",
    "x87 FPU Floating-Point Error",
    "Alignment Check",
    "Machine-Check",
    "SIMD Floating-Point Exception",
];

/// Human-readable name of a trap vector.
pub fn trapname(trapno: u32) -> &'static str {
    match trapno {
        n if (n as usize) < EXCEPTION_NAMES.len() => EXCEPTION_NAMES[n as usize],
        T_SYSCALL => "System call",
        n if (IRQ_OFFSET..IRQ_OFFSET + 16).contains(&n) => "Hardware Interrupt",
        _ => "(unknown trap)",
    }
}

impl Trapframe {
    /// True if the trap came from ring 3.
    pub const fn from_user(&self) -> bool {
        self.cs & 3 == 3
    }
}

impl fmt::Display for PushRegs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  edi  0x{:08x}", self.edi)?;
        writeln!(f, "  esi  0x{:08x}", self.esi)?;
        writeln!(f, "  ebp  0x{:08x}", self.ebp)?;
        writeln!(f, "  oesp 0x{:08x}", self.oesp)?;
        writeln!(f, "  ebx  0x{:08x}", self.ebx)?;
        writeln!(f, "  edx  0x{:08x}", self.edx)?;
        writeln!(f, "  ecx  0x{:08x}", self.ecx)?;
        writeln!(f, "  eax  0x{:08x}", self.eax)
    }
}

impl fmt::Display for Trapframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRAP frame at {:p}", self)?;
        write!(f, "{}", self.regs)?;
        writeln!(f, "  es   0x----{:04x}", self.es)?;
        writeln!(f, "  ds   0x----{:04x}", self.ds)?;
        writeln!(f, "  trap 0x{:08x} {}", self.trapno, trapname(self.trapno))?;
        writeln!(f, "  err  0x{:08x}", self.err)?;
        writeln!(f, "  eip  0x{:08x}", self.eip)?;
        writeln!(f, "  cs   0x----{:04x}", self.cs)?;
        writeln!(f, "  flag 0x{:08x}", self.eflags)?;
        if self.from_user() {
            writeln!(f, "  esp  0x{:08x}", self.esp)?;
            writeln!(f, "  ss   0x----{:04x}", self.ss)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_names() {
        assert_eq!(trapname(T_BRKPT), "Breakpoint");
        assert_eq!(trapname(T_PGFLT), "Page Fault");
        assert_eq!(trapname(T_SYSCALL), "System call");
        assert_eq!(trapname(IRQ_OFFSET + 4), "Hardware Interrupt");
        assert_eq!(trapname(200), "(unknown trap)");
    }

    #[test]
    fn kernel_frame_omits_stack_registers() {
        let tf = Trapframe {
            trapno: T_BRKPT,
            eip: 0xf010_0123,
            cs: 0x08,
            ..Default::default()
        };
        let text = std::format!("{tf}");
        assert!(text.contains("  trap 0x00000003 Breakpoint\n"));
        assert!(text.contains("  eip  0xf0100123\n"));
        assert!(!text.contains("  esp "));
    }

    #[test]
    fn user_frame_shows_stack_registers() {
        let tf = Trapframe {
            cs: 0x1b,
            esp: 0xeebfe000,
            ss: 0x23,
            ..Default::default()
        };
        let text = std::format!("{tf}");
        assert!(text.contains("  esp  0xeebfe000\n"));
        assert!(text.contains("  ss   0x----0023\n"));
    }
}
