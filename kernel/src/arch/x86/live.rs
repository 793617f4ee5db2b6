/// The monitor's collaborators on real hardware.
///
/// This is the only place the monitor touches raw memory: stack words are
/// read through [`LiveStack`] and page tables are reached through the
/// `KERNBASE` direct map by [`KernelWindow`].
use super::serial::{SerialTerminal, SerialWriter, SERIAL};
use super::{invlpg, logger, rcr3, read_ebp};
use crate::debug::{symbols, StackMemory};
use crate::mem::{
    walk_pgdir, KernelLayout, PageWalker, PhysAddr, PhysWindow, Pte, VirtAddr, KERNBASE,
    NPTENTRIES, PHYS_WINDOW_SIZE,
};
use crate::monitor::{self, LineEditor, Machine};
use crate::trap::Trapframe;

// Provided by the kernel's linker script.
#[allow(non_upper_case_globals)]
extern "C" {
    static _start: u8;
    static entry: u8;
    static etext: u8;
    static edata: u8;
    static end: u8;
}

/// Addresses of the linker symbols bounding the kernel image.
pub fn kernel_layout() -> KernelLayout {
    // SAFETY: only the symbol addresses are taken, nothing is read.
    unsafe {
        KernelLayout {
            start: core::ptr::addr_of!(_start) as u32,
            entry: core::ptr::addr_of!(entry) as u32,
            etext: core::ptr::addr_of!(etext) as u32,
            edata: core::ptr::addr_of!(edata) as u32,
            end: core::ptr::addr_of!(end) as u32,
        }
    }
}

/// The running kernel stack, walked from a frame captured by the caller.
///
/// The frame at `ebp` must stay live while the stack is walked, so capture
/// it in the function that owns the monitor session, not in a callee.
pub struct LiveStack {
    ebp: u32,
}

impl LiveStack {
    pub const fn new(ebp: u32) -> Self {
        Self { ebp }
    }
}

impl StackMemory for LiveStack {
    fn frame_pointer(&self) -> u32 {
        self.ebp
    }

    fn read_word(&self, addr: u32) -> u32 {
        // SAFETY: callers only follow a well-formed frame-pointer chain,
        // whose words all lie on the mapped kernel stack.
        unsafe { (addr as usize as *const u32).read_volatile() }
    }
}

/// Physical memory as seen through the `KERNBASE` direct map.
pub struct KernelWindow;

impl PhysWindow for KernelWindow {
    fn table(&mut self, pa: PhysAddr) -> Option<&mut [Pte; NPTENTRIES]> {
        if !pa.is_page_aligned() || pa.0 >= PHYS_WINDOW_SIZE {
            return None;
        }
        let kva = KERNBASE + pa.0;
        // SAFETY: `pa` is a page-aligned frame inside the direct map, and the
        // monitor runs with every other CPU and thread stopped.
        unsafe { (kva as usize as *mut [Pte; NPTENTRIES]).as_mut() }
    }
}

/// Walker over the active page directory.
pub struct LivePaging {
    window: KernelWindow,
}

impl LivePaging {
    pub const fn new() -> Self {
        Self {
            window: KernelWindow,
        }
    }
}

impl Default for LivePaging {
    fn default() -> Self {
        Self::new()
    }
}

impl PageWalker for LivePaging {
    fn root(&self) -> PhysAddr {
        rcr3()
    }

    fn walk(&mut self, root: PhysAddr, va: VirtAddr, create: bool) -> Option<&mut Pte> {
        walk_pgdir(&mut self.window, root, va, create)
    }

    fn invalidate(&mut self, va: VirtAddr) {
        invlpg(va);
    }
}

/// Enter the monitor on the serial console.
///
/// Called at the end of boot, or from the breakpoint trap handler with the
/// trapped context. Returns when a command asks to leave.
pub fn monitor(tf: Option<&Trapframe>) {
    SERIAL.lock().init();
    logger::init();

    // This frame outlives every command of the session.
    let stack = LiveStack::new(read_ebp());
    let mut paging = LivePaging::new();
    let mut machine = Machine {
        layout: kernel_layout(),
        stack: &stack,
        debug_info: symbols::kernel_symbols(),
        paging: &mut paging,
    };

    log::debug!("monitor: entered (trap frame: {})", tf.is_some());
    let mut editor = LineEditor::new(SerialTerminal);
    monitor::run(&mut editor, &mut SerialWriter, &mut machine, tf);
}
