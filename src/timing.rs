//! Estimates of the time the printer needs to absorb queued data.
//!
//! All timestamps are values of the wrapping microsecond counter from [`crate::SerialPort::micros()`].
//! They are only ever compared through their wrapping difference, so the counter overflowing is harmless
//! as long as no single wait exceeds [`MAX_WAIT_MICROS`].

use core::time::Duration;

/// The number of bits it takes to transmit a byte: start bit, 8 data bits, stop bit and one idle bit.
pub const BITS_PER_BYTE: u64 = 11;

/// The longest wait that can be represented unambiguously on the wrapping clock.
pub const MAX_WAIT_MICROS: u32 = i32::MAX as u32;

/// Extra print rows charged for the human readable label below a barcode.
pub const BARCODE_LABEL_ROWS: u32 = 40;

/// Signed distance from `earlier` to `later` on the wrapping clock.
pub fn wrapping_diff(later: u32, earlier: u32) -> i32 {
	later.wrapping_sub(earlier) as i32
}

/// Calculate the time needed to transmit a single byte in microseconds, rounded to the nearest microsecond.
pub fn byte_transfer_time(baud_rate: u32) -> u32 {
	let baud_rate = u64::from(baud_rate.max(1));
	let micros = (BITS_PER_BYTE * 1_000_000 + baud_rate / 2) / baud_rate;
	micros as u32
}

/// Convert a duration to microseconds, saturating at [`MAX_WAIT_MICROS`].
pub fn duration_to_micros(duration: Duration) -> u32 {
	u32::try_from(duration.as_micros())
		.unwrap_or(u32::MAX)
		.min(MAX_WAIT_MICROS)
}

/// The earliest time the next byte may be written.
///
/// The wait is stored as a start time and a length, and expiry is judged by the unsigned time elapsed since the start.
/// Once a deadline is seen to have passed, that is remembered,
/// so a long idle period can not make it look pending again when the clock wraps.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Deadline {
	last_activity: u32,
	start: u32,
	wait: u32,
	passed: bool,
}

impl Deadline {
	/// Create an already expired deadline.
	pub fn new(now: u32) -> Self {
		Self {
			last_activity: now,
			start: now,
			wait: 0,
			passed: true,
		}
	}

	/// The time the last byte was written.
	pub fn last_activity(&self) -> u32 {
		self.last_activity
	}

	/// The earliest time the next byte may be written.
	pub fn resume_time(&self) -> u32 {
		self.start.wrapping_add(self.wait)
	}

	/// Record that a byte was written at `now`.
	pub fn record_activity(&mut self, now: u32) {
		self.last_activity = now;
	}

	/// Set the resume time to `duration` microseconds after `now` or the last activity, whichever is later.
	///
	/// The last activity is only taken into account while the current deadline is still pending.
	pub fn set(&mut self, now: u32, duration: u32) {
		let ahead = if self.expired(now) {
			0
		} else {
			wrapping_diff(self.last_activity, now).max(0) as u32
		};
		self.start = now;
		self.wait = ahead.saturating_add(duration).min(MAX_WAIT_MICROS);
		self.passed = false;
	}

	/// Like [`Self::set()`], but never moves a pending resume time closer.
	pub fn extend(&mut self, now: u32, duration: u32) {
		let remaining = self.remaining(now);
		self.set(now, duration);
		if remaining > self.wait {
			self.wait = remaining;
		}
	}

	/// Check if the resume time has been reached.
	pub fn expired(&self, now: u32) -> bool {
		self.passed || now.wrapping_sub(self.start) >= self.wait
	}

	/// Check if the resume time has been reached, and remember it if so.
	pub fn check(&mut self, now: u32) -> bool {
		if !self.passed && self.expired(now) {
			self.passed = true;
		}
		self.passed
	}

	/// The number of microseconds left until the resume time, or 0 if it has passed.
	pub fn remaining(&self, now: u32) -> u32 {
		if self.passed {
			0
		} else {
			self.wait.saturating_sub(now.wrapping_sub(self.start))
		}
	}
}

/// A physical operation that keeps the printer busy after its bytes have been received.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Settle {
	/// A line of text is printed and the paper advances by the line spacing.
	TextLine,

	/// An empty line: the paper advances by a full line height without printing.
	BlankLine,

	/// The paper advances by a number of dot rows.
	Feed { rows: u16 },

	/// A number of dot rows are printed, as for bitmaps and QR codes.
	Print { rows: u16 },

	/// A barcode of the given height is printed, including its label.
	Barcode { height: u8 },

	/// A fixed delay.
	Fixed(Duration),
}

/// Per-byte and per-dot timing of a printer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Timing {
	/// Time to transmit one byte in microseconds.
	pub byte_time: u32,

	/// Time to print one dot row in microseconds.
	pub dot_print_time: u32,

	/// Time to feed one dot row in microseconds.
	pub dot_feed_time: u32,
}

impl Timing {
	pub fn new(baud_rate: u32, dot_print_time: Duration, dot_feed_time: Duration) -> Self {
		Self {
			byte_time: byte_transfer_time(baud_rate),
			dot_print_time: duration_to_micros(dot_print_time),
			dot_feed_time: duration_to_micros(dot_feed_time),
		}
	}

	/// Estimate the time in microseconds the printer needs to complete an operation.
	pub fn cost(&self, settle: Settle, metrics: &TextMetrics) -> u32 {
		let char_height = u32::from(metrics.char_height());
		let line_spacing = u32::from(metrics.line_spacing());
		let print = |rows: u32| self.dot_print_time.saturating_mul(rows);
		let feed = |rows: u32| self.dot_feed_time.saturating_mul(rows);
		match settle {
			Settle::TextLine => print(char_height).saturating_add(feed(line_spacing)),
			Settle::BlankLine => feed(char_height + line_spacing),
			Settle::Feed { rows } => feed(rows.into()),
			Settle::Print { rows } => print(rows.into()),
			Settle::Barcode { height } => print(u32::from(height) + BARCODE_LABEL_ROWS),
			Settle::Fixed(duration) => duration_to_micros(duration),
		}
	}
}

/// Character sizes supported by the printer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TextSize {
	/// Normal width and height.
	Small,

	/// Double height.
	Medium,

	/// Double width and height.
	Large,
}

/// Tracks the text layout of the printer to know when a line is completed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TextMetrics {
	char_height: u8,
	line_spacing: u8,
	column: u8,
	max_column: u8,
	after_line_break: bool,
}

impl Default for TextMetrics {
	fn default() -> Self {
		Self {
			char_height: 24,
			line_spacing: 6,
			column: 0,
			max_column: 32,
			after_line_break: true,
		}
	}
}

impl TextMetrics {
	/// The height of a character in dots.
	pub fn char_height(&self) -> u8 {
		self.char_height
	}

	/// The number of dots fed between two lines of text.
	pub fn line_spacing(&self) -> u8 {
		self.line_spacing
	}

	/// The column the next character will be printed in.
	pub fn column(&self) -> u8 {
		self.column
	}

	/// The number of characters that fit on one line.
	pub fn max_column(&self) -> u8 {
		self.max_column
	}

	/// Check if nothing has been printed since the last line break.
	pub fn after_line_break(&self) -> bool {
		self.after_line_break
	}

	/// Restore the power-on defaults.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	/// Account for one byte of text.
	///
	/// Returns the operation the printer performs if the byte completes a line.
	/// Carriage returns must be filtered out by the caller.
	pub fn accept(&mut self, byte: u8) -> Option<Settle> {
		match byte {
			b'\n' => Some(self.end_line()),
			b'\t' => {
				self.after_line_break = false;
				let next = (u16::from(self.column) / 4 + 1) * 4;
				self.advance_to(next)
			},
			_ => {
				self.after_line_break = false;
				self.advance_to(u16::from(self.column) + 1)
			},
		}
	}

	/// Mark the end of the current line after a physical operation such as a feed.
	pub fn line_break(&mut self) {
		self.column = 0;
		self.after_line_break = true;
	}

	/// Update the layout after a change of character size.
	///
	/// The printer starts a new line when the size changes.
	pub fn set_size(&mut self, size: TextSize) {
		let (char_height, max_column) = match size {
			TextSize::Small => (24, 32),
			TextSize::Medium => (48, 32),
			TextSize::Large => (48, 16),
		};
		self.char_height = char_height;
		self.max_column = max_column;
		self.line_break();
	}

	/// Update the layout after double height printing was enabled or disabled.
	pub fn set_double_height(&mut self, enabled: bool) {
		self.char_height = if enabled { 48 } else { 24 };
	}

	/// Update the layout after double width printing was enabled or disabled.
	pub fn set_double_width(&mut self, enabled: bool) {
		self.max_column = if enabled { 16 } else { 32 };
		self.column = self.column.min(self.max_column - 1);
	}

	/// Update the layout after the line height was changed.
	///
	/// The line height includes the character height, so values below 24 are clamped.
	pub fn set_line_height(&mut self, line_height: u8) {
		self.line_spacing = line_height.max(24) - 24;
	}

	fn advance_to(&mut self, column: u16) -> Option<Settle> {
		if column >= u16::from(self.max_column) {
			// Reaching the last column wraps, just like an explicit newline.
			self.line_break();
			Some(Settle::TextLine)
		} else {
			self.column = column as u8;
			None
		}
	}

	fn end_line(&mut self) -> Settle {
		let settle = if self.after_line_break {
			Settle::BlankLine
		} else {
			Settle::TextLine
		};
		self.line_break();
		settle
	}
}
