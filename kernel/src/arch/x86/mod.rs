/// i386 support for the monitor.
///
/// This module provides:
/// - Port I/O (in/out instructions)
/// - Serial console (COM1) for monitor I/O and logging
/// - Control-register and frame-pointer access
/// - The live collaborators and the `monitor()` entry point
pub mod live;
pub mod logger;
pub mod serial;

pub use live::monitor;

use crate::mem::{PhysAddr, VirtAddr, PTE_ADDR_MASK};

/// Write a byte to an I/O port.
#[inline(always)]
pub fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!(
            "out dx, al",
            in("dx") port,
            in("al") val,
            options(nostack, preserves_flags),
        );
    }
}

/// Read a byte from an I/O port.
#[inline(always)]
pub fn inb(port: u16) -> u8 {
    let val: u8;
    unsafe {
        core::arch::asm!(
            "in al, dx",
            in("dx") port,
            out("al") val,
            options(nostack, preserves_flags),
        );
    }
    val
}

/// Current frame pointer.
///
/// Inlined so the value is the caller's own frame; needs the kernel built
/// with `-C force-frame-pointers=yes`.
#[inline(always)]
pub fn read_ebp() -> u32 {
    let ebp: u32;
    unsafe {
        core::arch::asm!(
            "mov {}, ebp",
            out(reg) ebp,
            options(nostack, nomem),
        );
    }
    ebp
}

/// Physical address of the active page directory (CR3).
#[inline(always)]
pub fn rcr3() -> PhysAddr {
    let cr3: u32;
    unsafe {
        core::arch::asm!(
            "mov {}, cr3",
            out(reg) cr3,
            options(nostack, nomem),
        );
    }
    PhysAddr(cr3 & PTE_ADDR_MASK)
}

/// Flush a single TLB entry for a virtual address.
#[inline(always)]
pub fn invlpg(va: VirtAddr) {
    unsafe {
        core::arch::asm!(
            "invlpg [{}]",
            in(reg) va.0,
            options(nostack, preserves_flags),
        );
    }
}
