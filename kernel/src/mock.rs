/// Host-side stand-ins for the monitor's collaborators.
///
/// Page tables live in boxed 1024-entry arrays keyed by a made-up physical
/// frame address, the stack is a word map, and the console is a byte script.
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use crate::debug::{FnSymbol, LineEntry, StackMemory, SymbolTable, NARGS};
use crate::mem::{
    KernelLayout, PageWalker, PhysAddr, PhysWindow, Pte, PteFlags, TwoLevelWalker, VirtAddr,
    NPTENTRIES,
};
use crate::monitor::{runcmd, Control, Machine, Terminal, TerminalError, COMMANDS};

// ---- Physical memory ----

type Table = Box<[Pte; NPTENTRIES]>;

/// Page-table frames, addressed by physical address.
pub struct MockPhysMemory {
    frames: BTreeMap<u32, Table>,
    next_frame: u32,
}

impl MockPhysMemory {
    /// Frame holding the page directory.
    pub const ROOT: PhysAddr = PhysAddr(0x0011_7000);
    /// Page tables are handed out from here up.
    const FIRST_TABLE: u32 = 0x0f00_0000;

    pub fn new() -> Self {
        let mut frames = BTreeMap::new();
        frames.insert(Self::ROOT.0, Box::new([Pte(0); NPTENTRIES]));
        Self {
            frames,
            next_frame: Self::FIRST_TABLE,
        }
    }

    /// Map the page at `va` to frame `pa`. `P` is added to `flags`.
    pub fn map(&mut self, va: u32, pa: u32, flags: PteFlags) {
        let va = VirtAddr(va);
        let pde = self.pgdir()[va.pdx()];
        let table = if pde.is_present() {
            pde.frame()
        } else {
            let frame = PhysAddr(self.next_frame);
            self.next_frame += 0x1000;
            self.frames.insert(frame.0, Box::new([Pte(0); NPTENTRIES]));
            self.pgdir()[va.pdx()] = Pte::new(frame, PteFlags::P | PteFlags::W | PteFlags::U);
            frame
        };
        if let Some(t) = self.frames.get_mut(&table.0) {
            t[va.ptx()] = Pte::new(PhysAddr(pa), flags | PteFlags::P);
        }
    }

    /// The page directory itself.
    pub fn pgdir(&mut self) -> &mut [Pte; NPTENTRIES] {
        self.frames
            .get_mut(&Self::ROOT.0)
            .map(|t| &mut **t)
            .expect("page directory frame")
    }

    /// Copy of every frame, for before/after comparisons.
    pub fn snapshot(&self) -> Vec<(u32, Vec<u32>)> {
        self.frames
            .iter()
            .map(|(pa, t)| (*pa, t.iter().map(|p| p.0).collect()))
            .collect()
    }
}

impl PhysWindow for MockPhysMemory {
    fn table(&mut self, pa: PhysAddr) -> Option<&mut [Pte; NPTENTRIES]> {
        self.frames.get_mut(&pa.0).map(|t| &mut **t)
    }
}

/// Walker that records how it was used.
pub struct CountingPaging {
    pub inner: TwoLevelWalker<MockPhysMemory>,
    pub walks: usize,
    pub invalidated: Vec<VirtAddr>,
}

impl CountingPaging {
    pub fn new() -> Self {
        Self {
            inner: TwoLevelWalker::new(MockPhysMemory::new(), MockPhysMemory::ROOT),
            walks: 0,
            invalidated: Vec::new(),
        }
    }
}

impl PageWalker for CountingPaging {
    fn root(&self) -> PhysAddr {
        self.inner.root()
    }

    fn walk(&mut self, root: PhysAddr, va: VirtAddr, create: bool) -> Option<&mut Pte> {
        self.walks += 1;
        self.inner.walk(root, va, create)
    }

    fn invalidate(&mut self, va: VirtAddr) {
        self.invalidated.push(va);
    }
}

// ---- Stack ----

/// A stack as a sparse word map. Unset words read as zero.
pub struct MockStack {
    pub ebp: u32,
    words: BTreeMap<u32, u32>,
    reads: RefCell<Vec<u32>>,
}

impl MockStack {
    /// An empty chain: the frame pointer is already the sentinel.
    pub fn new() -> Self {
        Self {
            ebp: 0,
            words: BTreeMap::new(),
            reads: RefCell::new(Vec::new()),
        }
    }

    /// Lay out frames innermost first, each linked to the next, the last
    /// one to 0.
    pub fn chain(frames: &[(u32, u32, [u32; NARGS])]) -> Self {
        let mut stack = Self::new();
        for (i, &(ebp, eip, args)) in frames.iter().enumerate() {
            let caller = frames.get(i + 1).map_or(0, |f| f.0);
            stack.words.insert(ebp, caller);
            stack.words.insert(ebp + 4, eip);
            for (j, arg) in args.iter().enumerate() {
                stack.words.insert(ebp + 8 + 4 * j as u32, *arg);
            }
        }
        stack.ebp = frames.first().map_or(0, |f| f.0);
        stack
    }

    /// Addresses read so far, in order.
    pub fn reads(&self) -> Vec<u32> {
        self.reads.borrow().clone()
    }
}

impl StackMemory for MockStack {
    fn frame_pointer(&self) -> u32 {
        self.ebp
    }

    fn read_word(&self, addr: u32) -> u32 {
        self.reads.borrow_mut().push(addr);
        self.words.get(&addr).copied().unwrap_or(0)
    }
}

// ---- Symbols ----

pub static TEST_FUNCTIONS: [FnSymbol<'static>; 3] = [
    FnSymbol {
        addr: 0xf010_0034,
        size: 0x20,
        name: "relocated:F(0,1)",
        file: "kern/entry.S",
    },
    FnSymbol {
        addr: 0xf010_00a0,
        size: 0x60,
        name: "i386_init:F(0,25)",
        file: "kern/init.c",
    },
    FnSymbol {
        addr: 0xf010_0a20,
        size: 0x80,
        name: "mon_backtrace:F(0,25)",
        file: "kern/monitor.c",
    },
];

pub static TEST_LINES: [LineEntry; 7] = [
    LineEntry { addr: 0xf010_0034, line: 74 },
    LineEntry { addr: 0xf010_0039, line: 77 },
    LineEntry { addr: 0xf010_00a0, line: 24 },
    LineEntry { addr: 0xf010_00c8, line: 43 },
    LineEntry { addr: 0xf010_0a20, line: 63 },
    LineEntry { addr: 0xf010_0a5c, line: 67 },
    LineEntry { addr: 0xf010_0a90, line: 80 },
];

pub fn test_symbols() -> SymbolTable<'static> {
    SymbolTable::new(&TEST_FUNCTIONS, &TEST_LINES).expect("test tables are sorted")
}

pub const TEST_LAYOUT: KernelLayout = KernelLayout {
    start: 0x0010_000c,
    entry: 0xf010_000c,
    etext: 0xf010_1a75,
    edata: 0xf011_3300,
    end: 0xf011_3940,
};

// ---- Console ----

/// Plays back a byte script; closed once the script runs out.
pub struct ScriptedTerminal {
    input: VecDeque<u8>,
    echo: Vec<u8>,
}

impl ScriptedTerminal {
    pub fn new(script: &[u8]) -> Self {
        Self {
            input: script.iter().copied().collect(),
            echo: Vec::new(),
        }
    }

    /// Everything written back to the terminal.
    pub fn echo(&self) -> String {
        String::from_utf8_lossy(&self.echo).into_owned()
    }
}

impl Terminal for ScriptedTerminal {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        self.input.pop_front().ok_or(TerminalError::Closed)
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.echo.push(byte);
    }
}

// ---- Everything together ----

/// A machine assembled from the mocks above.
pub struct Rig {
    pub layout: KernelLayout,
    pub stack: MockStack,
    pub symbols: SymbolTable<'static>,
    pub paging: CountingPaging,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            layout: TEST_LAYOUT,
            stack: MockStack::new(),
            symbols: test_symbols(),
            paging: CountingPaging::new(),
        }
    }

    pub fn machine(&mut self) -> Machine<'_> {
        Machine {
            layout: self.layout,
            stack: &self.stack,
            debug_info: &self.symbols,
            paging: &mut self.paging,
        }
    }

    pub fn mem(&mut self) -> &mut MockPhysMemory {
        self.paging.inner.window_mut()
    }

    /// Run one command line; returns what it printed and the verdict.
    pub fn exec(&mut self, line: &str) -> (String, Control) {
        let mut out = String::new();
        let control = runcmd(&COMMANDS, line, &mut out, &mut self.machine(), None);
        (out, control)
    }

    /// Run one command line and return what it printed.
    pub fn run(&mut self, line: &str) -> String {
        self.exec(line).0
    }
}
