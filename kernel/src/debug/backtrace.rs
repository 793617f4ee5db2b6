/// Frame-pointer stack walking.
///
/// With frame pointers enabled every function starts with
/// `push %ebp; mov %esp, %ebp`, so each frame looks like:
///
/// ```text
///   ebp + 8 + 4*i   argument words (whatever the caller pushed)
///   ebp + 4         return address
///   ebp             caller's saved ebp   <- ebp
/// ```
///
/// The boot code clears `ebp` before calling into Rust, so the chain ends
/// at a zero frame pointer.
const WORD: u32 = 4;

/// Argument words shown per frame. The callee's real arity is unknown.
pub const NARGS: usize = 5;

/// Read access to the stack being walked.
pub trait StackMemory {
    /// Frame pointer of the frame the walk starts from.
    fn frame_pointer(&self) -> u32;

    /// Read the 32-bit word at `addr`.
    fn read_word(&self, addr: u32) -> u32;
}

/// One stack frame as seen from its frame pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub ebp: u32,
    /// Return address into the caller.
    pub eip: u32,
    pub args: [u32; NARGS],
}

/// Iterator over frames from the innermost outwards.
///
/// Stops at the zero frame pointer without reading through it.
pub struct FrameWalker<'s, S: ?Sized> {
    stack: &'s S,
    ebp: u32,
}

impl<'s, S: StackMemory + ?Sized> FrameWalker<'s, S> {
    /// Start from the stack's current frame pointer.
    pub fn new(stack: &'s S) -> Self {
        Self::from_frame(stack, stack.frame_pointer())
    }

    /// Start from an explicit frame pointer, e.g. a trap frame's saved `ebp`.
    pub fn from_frame(stack: &'s S, ebp: u32) -> Self {
        Self { stack, ebp }
    }
}

impl<S: StackMemory + ?Sized> Iterator for FrameWalker<'_, S> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let ebp = self.ebp;
        if ebp == 0 {
            return None;
        }

        let eip = self.stack.read_word(ebp.wrapping_add(WORD));
        let mut args = [0u32; NARGS];
        for (i, arg) in args.iter_mut().enumerate() {
            *arg = self
                .stack
                .read_word(ebp.wrapping_add(WORD * (2 + i as u32)));
        }
        self.ebp = self.stack.read_word(ebp);

        Some(Frame { ebp, eip, args })
    }
}
