/// Memory layout and page-table entry format for 32-bit x86 paging.
///
/// Two-level translation: a 1024-entry page directory indexed by bits 31:22,
/// then a 1024-entry page table indexed by bits 21:12. Physical memory below
/// 256 MiB is mapped at `KERNBASE`, which is how the kernel reaches page
/// tables given their physical address.
use core::fmt;

pub mod paging;

pub use paging::{walk_pgdir, PageWalker, PhysWindow, TwoLevelWalker};

/// Bytes per page.
pub const PGSIZE: u32 = 4096;
const PGSHIFT: u32 = 12;
const PDXSHIFT: u32 = 22;

/// Entries per page directory / page table.
pub const NPDENTRIES: usize = 1024;
pub const NPTENTRIES: usize = 1024;

/// All physical memory is mapped at this virtual address.
pub const KERNBASE: u32 = 0xF000_0000;

/// Size of the physical window at `KERNBASE` (the rest of the address space).
pub const PHYS_WINDOW_SIZE: u32 = 0u32.wrapping_sub(KERNBASE);

/// A virtual address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(pub u32);

impl VirtAddr {
    /// Page directory index.
    pub const fn pdx(self) -> usize {
        ((self.0 >> PDXSHIFT) & 0x3FF) as usize
    }

    /// Page table index.
    pub const fn ptx(self) -> usize {
        ((self.0 >> PGSHIFT) & 0x3FF) as usize
    }

    pub const fn is_page_aligned(self) -> bool {
        self.0 % PGSIZE == 0
    }

    /// Next page, wrapping at the top of the address space.
    pub const fn next_page(self) -> Self {
        Self(self.0.wrapping_add(PGSIZE))
    }
}

/// A physical address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(pub u32);

impl PhysAddr {
    pub const fn is_page_aligned(self) -> bool {
        self.0 % PGSIZE == 0
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#010x})", self.0)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#010x})", self.0)
    }
}

impl fmt::LowerHex for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

bitflags::bitflags! {
    /// Flag bits shared by page directory and page table entries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PteFlags: u32 {
        /// Present
        const P = 1 << 0;
        /// Writeable
        const W = 1 << 1;
        /// User-accessible
        const U = 1 << 2;
        /// Write-through
        const PWT = 1 << 3;
        /// Cache-disable
        const PCD = 1 << 4;
        /// Accessed
        const A = 1 << 5;
        /// Dirty
        const D = 1 << 6;
        /// Page size (directory entries only: 4 MiB page)
        const PS = 1 << 7;
        /// Global
        const G = 1 << 8;
        /// Available for software use
        const AVAIL = 0b111 << 9;
    }
}

/// Bits 31:12 of an entry hold the frame address.
pub const PTE_ADDR_MASK: u32 = !0xFFF;

/// A page directory or page table entry.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Pte(pub u32);

static_assertions::const_assert_eq!(core::mem::size_of::<Pte>(), 4);
static_assertions::const_assert_eq!(PteFlags::all().bits() & PTE_ADDR_MASK, 0);

impl Pte {
    pub const fn new(frame: PhysAddr, flags: PteFlags) -> Self {
        Self((frame.0 & PTE_ADDR_MASK) | flags.bits())
    }

    /// Physical frame this entry points at.
    pub const fn frame(self) -> PhysAddr {
        PhysAddr(self.0 & PTE_ADDR_MASK)
    }

    pub const fn flags(self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0)
    }

    pub const fn is_present(self) -> bool {
        self.0 & PteFlags::P.bits() != 0
    }
}

impl fmt::Debug for Pte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present() {
            write!(f, "Pte({:08x}, {:?})", self.frame().0, self.flags())
        } else {
            write!(f, "Pte(.)")
        }
    }
}

/// Addresses of the linker-provided kernel symbols, as shown by `kerninfo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelLayout {
    /// Physical load address of the boot entry.
    pub start: u32,
    pub entry: u32,
    pub etext: u32,
    pub edata: u32,
    pub end: u32,
}

impl KernelLayout {
    /// Kernel image size in KiB, rounded up.
    pub const fn footprint_kb(&self) -> u32 {
        self.end.saturating_sub(self.entry).div_ceil(1024)
    }
}

/// Physical address of a kernel virtual address in the `KERNBASE` window.
pub const fn paddr(kva: u32) -> u32 {
    kva.wrapping_sub(KERNBASE)
}
