//! [`SerialPort`] trait to support different serial port implementations.

#[cfg(feature = "serial2")]
pub mod serial2;

/// [`SerialPort`]s are used to communicate with the printer by writing data and reading status replies.
///
/// The implementor of the trait must also configure the serial line to use 8 bits characters, 1 stop bit, no parity and no flow control.
pub trait SerialPort {
	/// The error type returned by the serial port when reading or writing.
	type Error;

	/// Get the current baud rate of the serial port.
	fn baud_rate(&self) -> Result<u32, Self::Error>;

	/// Write all bytes in the buffer to the serial port.
	///
	/// The printer never acknowledges data, so a successful write only means the bytes were handed to the port.
	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error>;

	/// Read available bytes without blocking.
	///
	/// Returns `Ok(0)` if no data is available right now.
	fn try_read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

	/// Discard the input buffer of the serial port. Maybe a no-op on some platforms.
	fn discard_input_buffer(&mut self) -> Result<(), Self::Error>;

	/// Check if the busy line of the printer is at its active level.
	///
	/// Only used when the driver is configured with [`crate::Config::busy_signal`].
	fn read_busy_line(&mut self) -> Result<bool, Self::Error>;

	/// Get the current value of a free running microsecond counter.
	///
	/// The counter is allowed to wrap around.
	/// The driver only ever compares timestamps by their wrapping difference.
	fn micros(&self) -> u32;
}
