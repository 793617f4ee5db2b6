/// Compile-time monitor configuration.
///
/// The monitor reads no configuration at runtime. Everything tunable lives
/// here or behind a Cargo feature.
use log::LevelFilter;

/// Prompt printed before every command line.
pub const PROMPT: &str = "K> ";

/// Argument slots per command line, including the terminator slot.
/// At most `MAXARGS - 1` tokens are accepted.
pub const MAXARGS: usize = 16;

/// Line buffer size; one VGA text line.
pub const CMDBUF_SIZE: usize = 80;

/// Maximum log level installed by the serial logger.
pub const LOG_LEVEL: LevelFilter = if cfg!(feature = "verbose") {
    LevelFilter::Trace
} else {
    LevelFilter::Info
};
