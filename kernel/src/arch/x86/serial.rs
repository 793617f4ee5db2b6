/// 16550 UART on COM1: the monitor's console and the log sink.
///
/// Output goes through [`SERIAL`] (`serial_print!`, [`SerialWriter`]);
/// command lines are read through [`SerialTerminal`].
use core::fmt;
use spin::Mutex;

use super::{inb, outb};
use crate::monitor::{Terminal, TerminalError};

const COM1: u16 = 0x3F8;

// Register offsets from the base port.
const DATA: u16 = 0;
const IER: u16 = 1;
const FCR: u16 = 2;
const LCR: u16 = 3;
const MCR: u16 = 4;
const LSR: u16 = 5;

// Line status bits.
const LSR_DATA_READY: u8 = 0x01;
const LSR_TX_EMPTY: u8 = 0x20;

/// 8N1 at 115200 baud, FIFOs on, no interrupts. DLAB is set while the
/// divisor (1) is written to DATA/IER.
const INIT_SEQUENCE: [(u16, u8); 7] = [
    (IER, 0x00),
    (LCR, 0x80),
    (DATA, 0x01),
    (IER, 0x00),
    (LCR, 0x03),
    (FCR, 0xC7),
    (MCR, 0x0B),
];

pub static SERIAL: Mutex<Uart> = Mutex::new(Uart::new(COM1));

pub struct Uart {
    base: u16,
}

impl Uart {
    pub const fn new(base: u16) -> Self {
        Self { base }
    }

    pub fn init(&self) {
        for (reg, val) in INIT_SEQUENCE {
            outb(self.base + reg, val);
        }
    }

    fn status(&self) -> u8 {
        inb(self.base + LSR)
    }

    pub fn send(&self, byte: u8) {
        while self.status() & LSR_TX_EMPTY == 0 {
            core::hint::spin_loop();
        }
        outb(self.base + DATA, byte);
    }

    /// Send `s`, expanding `\n` to `\r\n`.
    pub fn send_str(&self, s: &str) {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.send(b'\r');
            }
            self.send(byte);
        }
    }

    pub fn try_recv(&self) -> Option<u8> {
        (self.status() & LSR_DATA_READY != 0).then(|| inb(self.base + DATA))
    }
}

impl fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.send_str(s);
        Ok(())
    }
}

/// Line-editor input over COM1.
///
/// Takes the lock per byte; a blocking read must not hold it, or the logger
/// would deadlock.
pub struct SerialTerminal;

impl Terminal for SerialTerminal {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        loop {
            if let Some(b) = SERIAL.lock().try_recv() {
                return Ok(b);
            }
            core::hint::spin_loop();
        }
    }

    fn try_read_byte(&mut self) -> Option<u8> {
        SERIAL.lock().try_recv()
    }

    fn write_byte(&mut self, byte: u8) {
        SERIAL.lock().send(byte);
    }
}

/// `fmt::Write` handle for monitor output.
pub struct SerialWriter;

impl fmt::Write for SerialWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        SERIAL.lock().send_str(s);
        Ok(())
    }
}

/// Print to the serial console.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::arch::x86::serial::SERIAL.lock(), $($arg)*);
    }};
}

/// Print to the serial console with a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => {
        $crate::serial_print!("{}\n", format_args!($($arg)*))
    };
}
