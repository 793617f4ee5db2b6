/// Symbol-table resolver for return addresses.
///
/// The table is two address-sorted arrays: function ranges and line
/// starts, the same information a STABS or DWARF line program encodes,
/// flattened at build time. The kernel installs its table once during
/// boot; until then every address resolves to `<unknown>`.
use super::{DebugInfo, EipDebugInfo};

/// A function's address range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FnSymbol<'a> {
    pub addr: u32,
    pub size: u32,
    /// Name as stored in the debug info; anything from the first `:` on is
    /// a type descriptor, not part of the name.
    pub name: &'a str,
    pub file: &'a str,
}

impl FnSymbol<'_> {
    fn contains(&self, eip: u32) -> bool {
        eip.wrapping_sub(self.addr) < self.size
    }
}

/// First instruction address belonging to a source line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineEntry {
    pub addr: u32,
    pub line: u32,
}

/// Sorted function and line tables.
#[derive(Clone, Copy, Debug)]
pub struct SymbolTable<'a> {
    functions: &'a [FnSymbol<'a>],
    lines: &'a [LineEntry],
}

impl<'a> SymbolTable<'a> {
    pub const EMPTY: SymbolTable<'static> = SymbolTable {
        functions: &[],
        lines: &[],
    };

    /// Both slices must be sorted by address. Returns `None` otherwise.
    pub fn new(functions: &'a [FnSymbol<'a>], lines: &'a [LineEntry]) -> Option<Self> {
        let sorted_fns = functions.windows(2).all(|w| w[0].addr <= w[1].addr);
        let sorted_lines = lines.windows(2).all(|w| w[0].addr <= w[1].addr);
        (sorted_fns && sorted_lines).then_some(Self { functions, lines })
    }

    fn function(&self, eip: u32) -> Option<&'a FnSymbol<'a>> {
        let idx = self.functions.partition_point(|f| f.addr <= eip);
        let f = self.functions.get(idx.checked_sub(1)?)?;
        f.contains(eip).then_some(f)
    }

    /// Line of the last line entry at or before `eip`, within `f`.
    fn line(&self, f: &FnSymbol<'_>, eip: u32) -> u32 {
        let idx = self.lines.partition_point(|l| l.addr <= eip);
        match idx.checked_sub(1).and_then(|i| self.lines.get(i)) {
            Some(l) if l.addr >= f.addr => l.line,
            _ => 0,
        }
    }
}

impl DebugInfo for SymbolTable<'_> {
    fn resolve(&self, eip: u32) -> EipDebugInfo<'_> {
        let Some(f) = self.function(eip) else {
            return EipDebugInfo::unknown(eip);
        };

        EipDebugInfo {
            file: f.file,
            line: self.line(f, eip),
            fn_name_raw: f.name,
            fn_namelen: f.name.find(':').unwrap_or(f.name.len()),
            fn_addr: f.addr,
        }
    }
}

/// The kernel's symbol table, installed once at boot.
static KERNEL_SYMBOLS: spin::Once<SymbolTable<'static>> = spin::Once::new();

/// Install the kernel's symbol table. Later calls are ignored.
pub fn install(table: SymbolTable<'static>) {
    KERNEL_SYMBOLS.call_once(|| table);
}

/// The installed table, or an empty one.
pub fn kernel_symbols() -> &'static SymbolTable<'static> {
    KERNEL_SYMBOLS.get().unwrap_or(&SymbolTable::EMPTY)
}
