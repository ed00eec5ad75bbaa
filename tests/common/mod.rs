#![allow(dead_code)]

mod mock_serial_port;

pub use mock_serial_port::MockSerialPort;

use thermal_printer::{Config, Printer};

pub const BAUD_RATE: u32 = 19_200;

/// Time to transmit one byte at [`BAUD_RATE`].
pub const BYTE_TIME: u32 = 573;

/// Time to print a line of text with the default layout and dot times.
pub const TEXT_LINE_TIME: u32 = 24 * 30_000 + 6 * 2_100;

/// Create a printer on a mock serial port with a clock that starts at `start` and advances `step` per reading.
pub fn printer(config: Config, start: u32, step: u32) -> (Printer<MockSerialPort>, MockSerialPort) {
	let serial_port = MockSerialPort::new(BAUD_RATE, start, step);
	let printer = Printer::new(serial_port.clone(), config).unwrap();
	(printer, serial_port)
}
