use core::time::Duration;

use crate::PaperSensePolarity;

/// Configuration of a [`crate::Printer`].
///
/// The defaults match a common 58 mm TTL printer with 2.68 firmware,
/// without the busy line connected.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
	/// Firmware version of the printer as an integer, for example 268 for version 2.68.
	pub firmware: u16,

	/// Use the busy line of the printer for flow control instead of timing estimates.
	pub busy_signal: bool,

	/// Time it takes to print one dot row.
	pub dot_print_time: Duration,

	/// Time it takes to feed one dot row without printing.
	pub dot_feed_time: Duration,

	/// Assumed size of the receive buffer of the printer, used to size bitmap chunks.
	pub assumed_buffer_bytes: u16,

	/// Upper limit for the number of rows in one bitmap chunk.
	pub max_chunk_height: u8,

	/// Widest bitmap in pixels that is accepted at all.
	pub max_bitmap_width: u16,

	/// Number of bytes per bitmap row the print head can print, extra bytes are cropped.
	pub max_row_bytes: u8,

	/// Maximum number of bytes the queue may hold for a queued bitmap.
	pub max_queue_bytes: usize,

	/// Number of bytes the queue reserves up front, and shrinks back to after a bulk transfer.
	pub queue_reserve: usize,

	/// Number of attempt intervals to wait for a status reply.
	pub poll_attempts: u8,

	/// Duration of a single status reply attempt.
	pub poll_interval: Duration,

	/// Meaning of the paper sense bit in status replies.
	pub paper_polarity: PaperSensePolarity,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			firmware: 268,
			busy_signal: false,
			// These vary with supply voltage and paper, measured on a random test unit.
			dot_print_time: Duration::from_micros(30_000),
			dot_feed_time: Duration::from_micros(2_100),
			assumed_buffer_bytes: 256,
			max_chunk_height: 255,
			max_bitmap_width: 384,
			max_row_bytes: 48,
			max_queue_bytes: 64 * 1024,
			queue_reserve: 100,
			poll_attempts: 10,
			poll_interval: Duration::from_millis(100),
			paper_polarity: PaperSensePolarity::SetMeansEmpty,
		}
	}
}

impl Config {
	/// Check if the firmware supports the extended command set introduced with version 2.64.
	pub fn has_extended_commands(&self) -> bool {
		self.firmware >= 264
	}

	pub fn with_firmware(mut self, firmware: u16) -> Self {
		self.firmware = firmware;
		self
	}

	pub fn with_busy_signal(mut self, busy_signal: bool) -> Self {
		self.busy_signal = busy_signal;
		self
	}

	/// Set the time needed to print and to feed one dot row.
	pub fn with_dot_times(mut self, print: Duration, feed: Duration) -> Self {
		self.dot_print_time = print;
		self.dot_feed_time = feed;
		self
	}

	pub fn with_assumed_buffer_bytes(mut self, bytes: u16) -> Self {
		self.assumed_buffer_bytes = bytes;
		self
	}

	pub fn with_max_chunk_height(mut self, rows: u8) -> Self {
		self.max_chunk_height = rows;
		self
	}

	pub fn with_max_bitmap_width(mut self, pixels: u16) -> Self {
		self.max_bitmap_width = pixels;
		self
	}

	pub fn with_max_queue_bytes(mut self, bytes: usize) -> Self {
		self.max_queue_bytes = bytes;
		self
	}

	/// Set the number of attempts and the duration of each attempt when waiting for a status reply.
	pub fn with_poll_timeout(mut self, attempts: u8, interval: Duration) -> Self {
		self.poll_attempts = attempts;
		self.poll_interval = interval;
		self
	}

	pub fn with_paper_polarity(mut self, polarity: PaperSensePolarity) -> Self {
		self.paper_polarity = polarity;
		self
	}
}
