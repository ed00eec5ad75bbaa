use std::collections::VecDeque;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::atomic::{AtomicBool, AtomicU32};
use std::sync::{Arc, Mutex};
use thermal_printer::SerialPort;

/// Serial port with a simulated microsecond clock.
///
/// Every call to [`SerialPort::micros()`] advances the clock by `step`,
/// so busy-waiting code makes progress without real time passing.
#[derive(Default, Clone)]
pub struct MockSerialPort {
	/// Bytes written to the port, with the clock value at the time of the write.
	pub write_log: Arc<Mutex<Vec<(u32, u8)>>>,
	pub read_buffer: Arc<Mutex<VecDeque<u8>>>,
	pub clock: Arc<AtomicU32>,
	pub step: u32,
	pub busy: Arc<AtomicBool>,
	pub fail_writes: Arc<AtomicBool>,
	pub baud_rate: u32,
}

impl MockSerialPort {
	pub fn new(baud_rate: u32, start: u32, step: u32) -> Self {
		Self {
			clock: Arc::new(AtomicU32::new(start)),
			step,
			baud_rate,
			..Default::default()
		}
	}

	pub fn now(&self) -> u32 {
		self.clock.load(Relaxed)
	}

	pub fn advance(&self, micros: u32) {
		self.clock.fetch_add(micros, Relaxed);
	}

	pub fn set_busy(&self, busy: bool) {
		self.busy.store(busy, Relaxed);
	}

	pub fn push_reply(&self, byte: u8) {
		self.read_buffer.lock().unwrap().push_back(byte);
	}

	pub fn written(&self) -> Vec<u8> {
		self.write_log.lock().unwrap().iter().map(|&(_, byte)| byte).collect()
	}

	pub fn write_times(&self) -> Vec<u32> {
		self.write_log.lock().unwrap().iter().map(|&(time, _)| time).collect()
	}

	/// The time between each pair of consecutive writes.
	pub fn write_gaps(&self) -> Vec<u32> {
		let times = self.write_times();
		times.windows(2).map(|pair| pair[1].wrapping_sub(pair[0])).collect()
	}
}

impl SerialPort for MockSerialPort {
	type Error = std::io::Error;

	fn baud_rate(&self) -> Result<u32, Self::Error> {
		Ok(self.baud_rate)
	}

	fn write_all(&mut self, buffer: &[u8]) -> Result<(), Self::Error> {
		if self.fail_writes.load(Relaxed) {
			return Err(std::io::ErrorKind::BrokenPipe.into());
		}
		let now = self.now();
		let mut log = self.write_log.lock().unwrap();
		for &byte in buffer {
			log.push((now, byte));
		}
		Ok(())
	}

	fn try_read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
		let mut data = self.read_buffer.lock().unwrap();
		let len = buffer.len().min(data.len());
		for (dest, byte) in buffer.iter_mut().zip(data.drain(..len)) {
			*dest = byte;
		}
		Ok(len)
	}

	fn discard_input_buffer(&mut self) -> Result<(), Self::Error> {
		self.read_buffer.lock().unwrap().clear();
		Ok(())
	}

	fn read_busy_line(&mut self) -> Result<bool, Self::Error> {
		Ok(self.busy.load(Relaxed))
	}

	fn micros(&self) -> u32 {
		self.clock.fetch_add(self.step, Relaxed)
	}
}
