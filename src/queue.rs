use alloc::collections::VecDeque;

use crate::InsufficientCapacity;

/// FIFO of bytes waiting to be written to the printer.
///
/// Each byte can carry an extra settle time, which is applied when that byte is written.
/// Settle times are rare compared to bytes, so they are stored separately, keyed by sequence number.
#[derive(Debug)]
pub(crate) struct ByteQueue {
	bytes: VecDeque<u8>,

	/// Settle times in microseconds, keyed by the sequence number of the byte they belong to.
	settles: VecDeque<(u64, u32)>,

	/// Sequence number of the byte at the front of the queue.
	front_seq: u64,

	/// Capacity to return to after a bulk reservation.
	default_capacity: usize,

	/// Set when a bulk reservation grew the queue beyond the default capacity.
	large_reserve: bool,
}

impl ByteQueue {
	pub fn with_capacity(default_capacity: usize) -> Self {
		Self {
			bytes: VecDeque::with_capacity(default_capacity),
			settles: VecDeque::new(),
			front_seq: 0,
			default_capacity,
			large_reserve: false,
		}
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.bytes.capacity()
	}

	pub fn push(&mut self, byte: u8) {
		self.bytes.push_back(byte);
	}

	/// Attach a settle time to the most recently pushed byte.
	///
	/// Settle times attached to the same byte add up.
	/// Returns `false` without doing anything if the queue is empty.
	pub fn attach_settle(&mut self, micros: u32) -> bool {
		if self.bytes.is_empty() {
			return false;
		}
		let seq = self.front_seq + self.bytes.len() as u64 - 1;
		match self.settles.back_mut() {
			Some((last_seq, total)) if *last_seq == seq => *total = total.saturating_add(micros),
			_ => self.settles.push_back((seq, micros)),
		}
		true
	}

	/// Remove the byte at the front of the queue, together with its settle time.
	pub fn pop(&mut self) -> Option<(u8, u32)> {
		let byte = self.bytes.pop_front()?;
		let seq = self.front_seq;
		self.front_seq += 1;
		let settle = match self.settles.front() {
			Some(&(settle_seq, micros)) if settle_seq == seq => {
				self.settles.pop_front();
				micros
			},
			_ => 0,
		};
		Some((byte, settle))
	}

	/// Reserve room for a bulk transfer of `additional` bytes, without letting the queue grow beyond `limit` bytes.
	pub fn reserve_bulk(&mut self, additional: usize, limit: usize) -> Result<(), InsufficientCapacity> {
		let available = limit.saturating_sub(self.bytes.len());
		InsufficientCapacity::check(additional, available)?;
		self.bytes.try_reserve(additional).map_err(|_| InsufficientCapacity {
			required: additional,
			available: self.bytes.capacity() - self.bytes.len(),
		})?;
		if self.bytes.capacity() > self.default_capacity {
			debug!("reserved queue capacity for {} bytes", self.bytes.capacity());
			self.large_reserve = true;
		}
		Ok(())
	}

	/// Release memory held by a bulk reservation once the queue is empty.
	///
	/// Returns `true` if memory was released.
	pub fn release_excess(&mut self) -> bool {
		if !self.large_reserve || !self.bytes.is_empty() {
			return false;
		}
		self.bytes.shrink_to(self.default_capacity);
		self.settles.shrink_to_fit();
		self.large_reserve = false;
		debug!("released queue capacity, {} bytes remain reserved", self.bytes.capacity());
		true
	}
}
