//! Trait implementation using the `serial2` crate.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Re-exported `serial2` crate in case you need to modify serial port settings.
pub use serial2;

/// Shared starting point for [`crate::SerialPort::micros()`].
fn epoch() -> Instant {
	static EPOCH: OnceLock<Instant> = OnceLock::new();
	*EPOCH.get_or_init(Instant::now)
}

impl crate::SerialPort for serial2::SerialPort {
	type Error = std::io::Error;

	fn baud_rate(&self) -> Result<u32, Self::Error> {
		self.get_configuration()?
			.get_baud_rate()
	}

	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
		serial2::SerialPort::write_all(self, buffer)
	}

	fn try_read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
		self.set_read_timeout(Duration::ZERO)?;
		match serial2::SerialPort::read(self, buffer) {
			Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
			Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
			x => x,
		}
	}

	fn discard_input_buffer(&mut self) -> Result<(), Self::Error> {
		serial2::SerialPort::discard_input_buffer(self)
	}

	/// The busy output of the printer is expected on the CTS line.
	///
	/// A TTL-level high (busy) output shows up as a de-asserted CTS on common USB serial adapters.
	fn read_busy_line(&mut self) -> Result<bool, Self::Error> {
		Ok(!self.read_cts()?)
	}

	fn micros(&self) -> u32 {
		// Wraps every ~71.6 minutes.
		epoch().elapsed().as_micros() as u32
	}
}
