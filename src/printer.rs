use alloc::vec;
use core::time::Duration;

use crate::queue::ByteQueue;
use crate::status::StatusPoll;
use crate::timing::{duration_to_micros, Deadline, Timing};
use crate::{commands, BitmapDataTooShort, BitmapError, BitmapTooWide, ChunkPlan, Config, DrainError, FlowControl};
use crate::{PaperStatus, Settle, StatusPollState, TextMetrics};

macro_rules! make_printer_struct {
	($($DefaultSerialPort:ty)?) => {
		/// Driver for a thermal printer connected to a serial port.
		///
		/// Bytes are queued by [`Self::enqueue()`], [`Self::write_text()`] and the other printing functions,
		/// and written to the serial port by [`Self::drain()`] or [`Self::flush()`].
		/// No byte is written before the printer is expected to be ready for it.
		///
		/// If the `"serial2"` feature is enabled, the `SerialPort` generic type argument defaults to [`serial2::SerialPort`].
		/// If it is not enabled, the `SerialPort` argument must always be specified.
		pub struct Printer<SerialPort $(= $DefaultSerialPort)?>
		where
			SerialPort: crate::SerialPort,
		{
			serial_port: SerialPort,
			baud_rate: u32,
			config: Config,
			flow_control: FlowControl,
			timing: Timing,
			deadline: Deadline,
			metrics: TextMetrics,
			queue: ByteQueue,
			status: StatusPoll,
		}
	};
}

#[cfg(feature = "serial2")]
make_printer_struct!(serial2::SerialPort);

#[cfg(not(feature = "serial2"))]
make_printer_struct!();

impl<SerialPort> core::fmt::Debug for Printer<SerialPort>
where
	SerialPort: crate::SerialPort + core::fmt::Debug,
{
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Printer")
			.field("serial_port", &self.serial_port)
			.field("baud_rate", &self.baud_rate)
			.field("flow_control", &self.flow_control)
			.field("pending_bytes", &self.queue.len())
			.finish_non_exhaustive()
	}
}

#[cfg(feature = "serial2")]
impl Printer<serial2::SerialPort> {
	/// Open a serial port with the given baud rate.
	///
	/// Most printers are configured for 19200 baud from the factory, some work at 9600.
	pub fn open(path: impl AsRef<std::path::Path>, baud_rate: u32, config: Config) -> std::io::Result<Self> {
		let serial_port = serial2::SerialPort::open(path, baud_rate)?;
		Ok(Self::with_baud_rate(serial_port, baud_rate, config))
	}
}

impl<SerialPort> Printer<SerialPort>
where
	SerialPort: crate::SerialPort,
{
	/// Create a new printer driver using an open serial port.
	///
	/// The serial port must already be configured in raw mode with the correct baud rate,
	/// character size (8), parity (disabled) and stop bits (1).
	pub fn new(serial_port: SerialPort, config: Config) -> Result<Self, SerialPort::Error> {
		let baud_rate = serial_port.baud_rate()?;
		Ok(Self::with_baud_rate(serial_port, baud_rate, config))
	}

	/// Create a new printer driver for a serial port with a known baud rate.
	pub fn with_baud_rate(serial_port: SerialPort, baud_rate: u32, config: Config) -> Self {
		let now = serial_port.micros();
		let flow_control = FlowControl::from_config(&config);
		let timing = Timing::new(baud_rate, config.dot_print_time, config.dot_feed_time);
		let status = StatusPoll::new(config.poll_attempts, duration_to_micros(config.poll_interval), config.paper_polarity);
		Self {
			serial_port,
			baud_rate,
			flow_control,
			timing,
			deadline: Deadline::new(now),
			metrics: TextMetrics::default(),
			queue: ByteQueue::with_capacity(config.queue_reserve),
			status,
			config,
		}
	}

	/// Get a reference to the underlying serial port.
	///
	/// Writing to the serial port directly bypasses the pacing of the driver.
	pub fn serial_port(&self) -> &SerialPort {
		&self.serial_port
	}

	/// Consume the driver to get ownership of the serial port.
	///
	/// Any bytes still in the queue are dropped.
	pub fn into_serial_port(self) -> SerialPort {
		self.serial_port
	}

	/// Get the baud rate of the serial port.
	pub fn baud_rate(&self) -> u32 {
		self.baud_rate
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn flow_control(&self) -> FlowControl {
		self.flow_control
	}

	pub fn timing(&self) -> &Timing {
		&self.timing
	}

	/// Get the time the last byte was written and the earliest time the next byte may be written.
	pub fn deadline(&self) -> &Deadline {
		&self.deadline
	}

	pub fn text_metrics(&self) -> &TextMetrics {
		&self.metrics
	}

	/// Get mutable access to the text layout, to update it after changing text size or line height.
	pub fn text_metrics_mut(&mut self) -> &mut TextMetrics {
		&mut self.metrics
	}

	/// Get the number of bytes waiting in the queue.
	pub fn pending_bytes(&self) -> usize {
		self.queue.len()
	}

	/// Add a byte to the end of the queue.
	///
	/// The byte is not taken into account for text layout.
	/// Use [`Self::write_text()`] for printable text.
	pub fn enqueue(&mut self, byte: u8) {
		self.push(byte);
	}

	/// Add bytes to the end of the queue.
	pub fn enqueue_bytes(&mut self, bytes: &[u8]) {
		for &byte in bytes {
			self.push(byte);
		}
	}

	/// Queue text for printing.
	///
	/// Carriage returns are dropped.
	/// Completed lines are charged with the time needed to print and feed them.
	pub fn write_text(&mut self, text: impl AsRef<[u8]>) {
		for &byte in text.as_ref() {
			if byte == b'\r' {
				continue;
			}
			self.push(byte);
			if let Some(settle) = self.metrics.accept(byte) {
				let cost = self.timing.cost(settle, &self.metrics);
				self.add_settle(cost);
			}
		}
	}

	/// Register the time the printer needs to complete the operation that was just queued.
	///
	/// The deadline starts when the last queued byte is written.
	/// If the queue is empty, it starts now.
	pub fn set_deadline(&mut self, duration: Duration) {
		self.add_settle(duration_to_micros(duration));
	}

	/// Register a physical operation for the bytes that were just queued.
	///
	/// Apart from [`Settle::Fixed`], this also ends the current line of text.
	pub fn settle(&mut self, settle: Settle) {
		let cost = self.timing.cost(settle, &self.metrics);
		if !matches!(settle, Settle::Fixed(_)) {
			self.metrics.line_break();
		}
		self.add_settle(cost);
	}

	/// Check if the printer can accept the next byte.
	pub fn is_ready(&mut self) -> Result<bool, DrainError<SerialPort::Error>> {
		match self.flow_control {
			FlowControl::SoftwareTimeout => Ok(self.deadline.check(self.serial_port.micros())),
			FlowControl::HardwareSignal => {
				let busy = self.serial_port.read_busy_line().map_err(DrainError::ReadBusyLine)?;
				Ok(!busy)
			},
		}
	}

	/// Block until the printer can accept the next byte.
	pub fn wait_until_ready(&mut self) -> Result<(), DrainError<SerialPort::Error>> {
		while !self.is_ready()? {
			relax();
		}
		Ok(())
	}

	/// Perform one step of background work without blocking.
	///
	/// Writes at most one byte from the queue if the printer is ready for it,
	/// and checks for a reply to an outstanding status request.
	/// Call this as often as possible from the idle loop of your application.
	///
	/// Returns `true` if a byte was written.
	pub fn drain(&mut self) -> Result<bool, DrainError<SerialPort::Error>> {
		let written = if self.queue.is_empty() {
			self.queue.release_excess();
			false
		} else if self.is_ready()? {
			match self.queue.pop() {
				Some((byte, settle)) => {
					self.write_byte(byte, settle)?;
					true
				},
				None => false,
			}
		} else {
			false
		};

		if self.status.wants_reply() {
			let mut reply = [0u8; 1];
			let read = self.serial_port.try_read(&mut reply).map_err(DrainError::ReadStatus)?;
			let now = self.serial_port.micros();
			self.status.tick(now, (read > 0).then_some(reply[0]));
		}

		Ok(written)
	}

	/// Block until all queued bytes have been written.
	pub fn flush(&mut self) -> Result<(), DrainError<SerialPort::Error>> {
		while !self.queue.is_empty() {
			self.wait_until_ready()?;
			self.drain()?;
		}
		Ok(())
	}

	/// Ask the printer for its paper status.
	///
	/// The reply is collected by [`Self::drain()`].
	/// Only one request can be outstanding: if one is, nothing is sent and `false` is returned.
	pub fn issue_status_poll(&mut self) -> Result<bool, DrainError<SerialPort::Error>> {
		if self.status.is_awaiting() {
			return Ok(false);
		}
		self.serial_port.discard_input_buffer().map_err(DrainError::DiscardInput)?;
		self.enqueue_bytes(&commands::PAPER_STATUS_REQUEST);
		let now = self.serial_port.micros();
		self.status.start(self.queue.len(), now);
		debug!("queued paper status request behind {} bytes", self.queue.len() - commands::PAPER_STATUS_REQUEST.len());
		Ok(true)
	}

	/// Get the state of the status poll without consuming a result.
	pub fn poll_state(&self) -> StatusPollState {
		self.status.state()
	}

	/// Get the last paper status reported by the printer.
	///
	/// Returns [`PaperStatus::Unknown`] if no status request has completed yet, or if the last one timed out.
	/// A pending result is consumed, which allows a new request to be issued.
	pub fn paper_status(&mut self) -> PaperStatus {
		self.status.take_result()
	}

	/// Wake the printer and initialize it.
	pub fn begin(&mut self) {
		self.wake();
		self.enqueue_bytes(&commands::INITIALIZE);
		self.metrics.reset();
		if self.flow_control == FlowControl::HardwareSignal {
			self.enqueue_bytes(&commands::ENABLE_BUSY_OUTPUT);
		}
	}

	/// Wake the printer from sleep.
	pub fn wake(&mut self) {
		if self.queue.is_empty() && self.flow_control.uses_deadlines() {
			let now = self.serial_port.micros();
			self.deadline.set(now, 0);
		}
		self.enqueue(commands::WAKE);
		if self.config.has_extended_commands() {
			self.set_deadline(Duration::from_millis(50));
			self.enqueue_bytes(&commands::sleep_after(0));
		} else {
			// Old firmware needs more than the documented 50 ms, padded with no-ops.
			for _ in 0..10 {
				self.enqueue(0);
				self.set_deadline(Duration::from_millis(10));
			}
		}
	}

	/// Put the printer to sleep after the given number of seconds.
	///
	/// Older firmware supports at most 255 seconds.
	pub fn sleep_after(&mut self, seconds: u16) {
		if self.config.has_extended_commands() {
			self.enqueue_bytes(&commands::sleep_after(seconds));
		} else {
			self.enqueue_bytes(&commands::sleep_after_legacy(seconds.min(255) as u8));
		}
	}

	/// Put the printer to sleep as soon as possible.
	pub fn sleep(&mut self) {
		// 0 would disable sleeping.
		self.sleep_after(1);
	}

	/// Feed the paper by a number of dot rows.
	pub fn feed_rows(&mut self, rows: u8) {
		self.enqueue_bytes(&commands::feed_rows(rows));
		self.settle(Settle::Feed { rows: rows.into() });
	}

	/// Feed the paper by a number of text lines.
	pub fn feed_lines(&mut self, lines: u8) {
		if self.config.has_extended_commands() {
			let line_height = u16::from(self.metrics.char_height()) + u16::from(self.metrics.line_spacing());
			self.enqueue_bytes(&commands::feed_lines(lines));
			self.settle(Settle::Feed {
				rows: u16::from(lines).saturating_mul(line_height),
			});
		} else {
			for _ in 0..lines {
				self.write_text(b"\n");
			}
		}
	}

	/// Check the dimensions of a bitmap and plan the transfer in chunks.
	pub fn plan_bitmap(&self, width: u16, height: u16) -> Result<ChunkPlan, BitmapTooWide> {
		if let Err(e) = BitmapTooWide::check(width, self.config.max_bitmap_width) {
			warn!("rejecting bitmap: {}", e);
			return Err(e);
		}
		Ok(ChunkPlan::new(width, height, self.flow_control, &self.config))
	}

	/// Print a bitmap, blocking until all data has been written.
	///
	/// The bitmap is sent in chunks that fit the receive buffer of the printer, bypassing the queue.
	/// Bytes queued earlier are written first.
	///
	/// Each row consists of `(width + 7) / 8` bytes, with the most significant bit as the leftmost pixel.
	/// Bytes beyond the width of the print head are cropped.
	/// Nothing is sent if the bitmap is too wide or the data is too short.
	pub fn print_bitmap(&mut self, width: u16, height: u16, data: &[u8]) -> Result<(), BitmapError<SerialPort::Error>> {
		let plan = self.plan_bitmap(width, height)?;
		BitmapDataTooShort::check(data.len(), plan.data_len())?;
		let row_len = usize::from(plan.row_bytes);
		let mut rows = data.chunks_exact(row_len.max(1));
		self.write_chunks(&plan, |row| {
			if let Some(data) = rows.next() {
				row.copy_from_slice(&data[..row.len()]);
			}
			Ok(())
		})
	}

	/// Print a bitmap read from a stream, blocking until all data has been written.
	///
	/// See [`Self::print_bitmap()`] for the data format.
	/// A read error aborts the transfer, possibly after some chunks have already been printed.
	#[cfg(feature = "std")]
	pub fn print_bitmap_from_reader<R>(&mut self, width: u16, height: u16, mut reader: R) -> Result<(), BitmapError<SerialPort::Error>>
	where
		R: std::io::Read,
	{
		let plan = self.plan_bitmap(width, height)?;
		self.write_chunks(&plan, |row| reader.read_exact(row).map_err(BitmapError::ReadSource))
	}

	/// Print a bitmap from a stream that starts with the width and height as little endian `u16` values.
	#[cfg(feature = "std")]
	pub fn print_bitmap_stream<R>(&mut self, mut reader: R) -> Result<(), BitmapError<SerialPort::Error>>
	where
		R: std::io::Read,
	{
		let mut header = [0u8; 4];
		reader.read_exact(&mut header).map_err(BitmapError::ReadSource)?;
		let width = u16::from_le_bytes([header[0], header[1]]);
		let height = u16::from_le_bytes([header[2], header[3]]);
		self.print_bitmap_from_reader(width, height, reader)
	}

	/// Queue a bitmap as a single raster image without blocking.
	///
	/// The bitmap is copied into the queue, which reserves room for it up front.
	/// Rows are cropped to the print head like for [`Self::print_bitmap()`].
	/// Nothing is queued if the bitmap would make the queue exceed [`Config::max_queue_bytes`].
	pub fn queue_bitmap(&mut self, width: u16, height: u16, data: &[u8]) -> Result<(), BitmapError<SerialPort::Error>> {
		let plan = self.plan_bitmap(width, height)?;
		BitmapDataTooShort::check(data.len(), plan.data_len())?;
		let clipped = usize::from(plan.clipped_row_bytes);
		let header = commands::raster_bitmap_header(plan.clipped_row_bytes.into(), height);
		if let Err(e) = self.queue.reserve_bulk(header.len() + clipped * usize::from(height), self.config.max_queue_bytes) {
			warn!("rejecting bitmap: {}", e);
			return Err(e.into());
		}
		self.enqueue_bytes(&header);
		if clipped > 0 {
			for row in data[..plan.data_len()].chunks_exact(usize::from(plan.row_bytes)) {
				self.enqueue_bytes(&row[..clipped]);
			}
		}
		self.settle(Settle::Print { rows: height });
		Ok(())
	}

	fn write_chunks<F>(&mut self, plan: &ChunkPlan, mut read_row: F) -> Result<(), BitmapError<SerialPort::Error>>
	where
		F: FnMut(&mut [u8]) -> Result<(), BitmapError<SerialPort::Error>>,
	{
		self.flush()?;
		let mut row = vec![0u8; usize::from(plan.row_bytes)];
		let clipped = usize::from(plan.clipped_row_bytes);
		for chunk_height in plan.chunks() {
			trace!("writing bitmap chunk of {} rows of {} bytes", chunk_height, clipped);
			for byte in commands::bitmap_chunk_header(chunk_height, plan.clipped_row_bytes) {
				self.write_direct(byte)?;
			}
			for _ in 0..chunk_height {
				read_row(&mut row)?;
				for &byte in &row[..clipped] {
					self.write_direct(byte)?;
				}
			}
			self.settle(Settle::Print { rows: chunk_height.into() });
		}
		Ok(())
	}

	fn write_direct(&mut self, byte: u8) -> Result<(), DrainError<SerialPort::Error>> {
		self.wait_until_ready()?;
		self.write_byte(byte, 0)
	}

	fn write_byte(&mut self, byte: u8, settle: u32) -> Result<(), DrainError<SerialPort::Error>> {
		self.serial_port.write_all(&[byte]).map_err(DrainError::Write)?;
		let now = self.serial_port.micros();
		trace!("wrote {:#04X}", byte);
		self.deadline.record_activity(now);
		if self.flow_control.uses_deadlines() {
			self.deadline.set(now, self.timing.byte_time.saturating_add(settle));
		}
		self.status.byte_written(now);
		Ok(())
	}

	fn push(&mut self, byte: u8) {
		if self.queue.is_empty() && self.flow_control.uses_deadlines() {
			// Catch a deadline that passed while idle before the clock can wrap past it.
			let now = self.serial_port.micros();
			self.deadline.check(now);
		}
		self.queue.push(byte);
	}

	fn add_settle(&mut self, micros: u32) {
		if !self.flow_control.uses_deadlines() {
			return;
		}
		if !self.queue.attach_settle(micros) {
			let now = self.serial_port.micros();
			self.deadline.extend(now, micros);
		}
	}
}

impl<SerialPort> core::fmt::Write for Printer<SerialPort>
where
	SerialPort: crate::SerialPort,
{
	fn write_str(&mut self, text: &str) -> core::fmt::Result {
		self.write_text(text);
		Ok(())
	}
}

fn relax() {
	#[cfg(feature = "std")]
	std::thread::yield_now();
	#[cfg(not(feature = "std"))]
	core::hint::spin_loop();
}
