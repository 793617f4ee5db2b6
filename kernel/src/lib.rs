//! kmon kernel monitor.
//!
//! An interactive shell for poking at a live 32-bit x86 kernel from the
//! serial console: backtraces, page mappings, page permissions.
//!
//! Everything outside `arch` is plain safe code that builds for the host,
//! so the monitor can be unit-tested with mock collaborators:
//! `cargo test -p kmon-kernel`.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod debug;
pub mod mem;
pub mod monitor;
pub mod trap;

// Bare-metal glue, only built for the kernel target (i686, no OS).
#[cfg(all(target_arch = "x86", target_os = "none"))]
pub mod arch;

#[cfg(test)]
pub mod mock;
