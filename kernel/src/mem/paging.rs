/// Page table walking for 32-bit x86 two-level paging.
///
/// The walker never allocates. A caller asking for `create = true` on a
/// missing table gets `None` back, same as for an unmapped address.
///
/// Page tables are reached through a [`PhysWindow`], which turns the
/// physical address of a table frame into a reference. On the kernel that
/// is the `KERNBASE` direct map; in tests it is a map of boxed tables.
use super::{PhysAddr, Pte, PteFlags, VirtAddr, NPTENTRIES};

/// Access to page-table frames by physical address.
pub trait PhysWindow {
    /// The 1024-entry table held in the frame at `pa`, if the frame is
    /// reachable.
    fn table(&mut self, pa: PhysAddr) -> Option<&mut [Pte; NPTENTRIES]>;
}

/// The page-table walker the monitor borrows for `showmappings` and `perm`.
pub trait PageWalker {
    /// Physical address of the active page directory.
    fn root(&self) -> PhysAddr;

    /// Entry slot for `va` under the directory at `root`.
    fn walk(&mut self, root: PhysAddr, va: VirtAddr, create: bool) -> Option<&mut Pte>;

    /// Drop any cached translation for `va` after its entry changed.
    fn invalidate(&mut self, _va: VirtAddr) {}
}

/// Walk the directory at `root` down to the page table entry for `va`.
///
/// Returns `None` if the directory or the page table is unreachable, the
/// directory entry is not present, or it maps a 4 MiB page (no 4 KiB entry
/// exists for it).
pub fn walk_pgdir<W: PhysWindow + ?Sized>(
    window: &mut W,
    root: PhysAddr,
    va: VirtAddr,
    create: bool,
) -> Option<&mut Pte> {
    let pde = *window.table(root)?.get(va.pdx())?;

    if !pde.is_present() {
        if create {
            log::warn!("paging: no page table for {:?}, not allocating one", va);
        }
        return None;
    }
    if pde.flags().contains(PteFlags::PS) {
        log::debug!("paging: {:?} is inside a 4 MiB page", va);
        return None;
    }

    window.table(pde.frame())?.get_mut(va.ptx())
}

/// A walker bound to a fixed page directory.
pub struct TwoLevelWalker<W> {
    window: W,
    root: PhysAddr,
}

impl<W: PhysWindow> TwoLevelWalker<W> {
    pub fn new(window: W, root: PhysAddr) -> Self {
        Self { window, root }
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }
}

impl<W: PhysWindow> PageWalker for TwoLevelWalker<W> {
    fn root(&self) -> PhysAddr {
        self.root
    }

    fn walk(&mut self, root: PhysAddr, va: VirtAddr, create: bool) -> Option<&mut Pte> {
        walk_pgdir(&mut self.window, root, va, create)
    }
}
