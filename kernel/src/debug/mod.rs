/// Debug-information plumbing for `backtrace`.
///
/// - [`StackMemory`] / [`FrameWalker`]: follow the saved frame-pointer chain.
/// - [`DebugInfo`] / [`SymbolTable`]: map a return address back to
///   `file:line: function`.
pub mod backtrace;
pub mod symbols;

pub use backtrace::{Frame, FrameWalker, StackMemory, NARGS};
pub use symbols::{FnSymbol, LineEntry, SymbolTable};

/// Source location of an instruction address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EipDebugInfo<'a> {
    /// Source file name.
    pub file: &'a str,
    /// Source line number, 0 if unknown.
    pub line: u32,
    /// Enclosing function name. Not terminated at the name; may carry a
    /// type suffix (`"mon_backtrace:F(0,25)"`), use [`Self::fn_name`].
    pub fn_name_raw: &'a str,
    /// Length of the name proper within `fn_name_raw`.
    pub fn_namelen: usize,
    /// Entry address of the function.
    pub fn_addr: u32,
}

impl<'a> EipDebugInfo<'a> {
    pub const UNKNOWN: &'static str = "<unknown>";

    /// Placeholder for an address no symbol covers.
    pub const fn unknown(eip: u32) -> Self {
        Self {
            file: Self::UNKNOWN,
            line: 0,
            fn_name_raw: Self::UNKNOWN,
            fn_namelen: Self::UNKNOWN.len(),
            fn_addr: eip,
        }
    }

    /// The function name without its type suffix.
    pub fn fn_name(&self) -> &'a str {
        self.fn_name_raw
            .get(..self.fn_namelen)
            .unwrap_or(self.fn_name_raw)
    }

    /// Offset of `eip` from the start of the function.
    pub const fn offset(&self, eip: u32) -> u32 {
        eip.wrapping_sub(self.fn_addr)
    }
}

/// Resolves instruction addresses to source locations.
pub trait DebugInfo {
    /// Best effort; unknown addresses yield [`EipDebugInfo::unknown`].
    fn resolve(&self, eip: u32) -> EipDebugInfo<'_>;
}
