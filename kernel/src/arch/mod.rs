/// Architecture support. Only i386 is implemented.
pub mod x86;
