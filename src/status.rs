
/// The bit of the paper sensor status reply that reports the paper roll.
pub const PAPER_SENSE_MASK: u8 = 0b0000_0100;

/// Paper status as reported by the printer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PaperStatus {
	HasPaper,
	NoPaper,

	/// The printer did not reply in time, or no status request has completed yet.
	Unknown,
}

/// Meaning of the paper sense bit, which differs between hardware revisions.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PaperSensePolarity {
	/// The bit is set when the paper roll is empty.
	SetMeansEmpty,

	/// The bit is cleared when the paper roll is empty.
	ClearMeansEmpty,
}

impl PaperSensePolarity {
	/// Decode a paper sensor status reply.
	pub fn decode(self, status: u8) -> PaperStatus {
		let bit_set = status & PAPER_SENSE_MASK != 0;
		match (self, bit_set) {
			(Self::SetMeansEmpty, true) | (Self::ClearMeansEmpty, false) => PaperStatus::NoPaper,
			(Self::SetMeansEmpty, false) | (Self::ClearMeansEmpty, true) => PaperStatus::HasPaper,
		}
	}
}

/// The state of the status poll, as seen by the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatusPollState {
	/// No status request is outstanding.
	Idle,

	/// A status request is queued or waiting for a reply.
	AwaitingResponse,

	/// A reply was received and has not been consumed yet.
	ResultReady(PaperStatus),

	/// The printer did not reply and the timeout has not been consumed yet.
	TimedOut,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
	Idle,
	Awaiting {
		/// Number of queued bytes that have to be written before the request is complete.
		unsent: usize,

		/// Number of attempt intervals that passed without a reply.
		attempts: u8,

		/// Start of the current attempt interval.
		attempt_start: u32,
	},
	Ready(PaperStatus),
	TimedOut,
}

/// Non-blocking request/response state machine for the paper status.
#[derive(Debug)]
pub(crate) struct StatusPoll {
	state: State,
	last_result: PaperStatus,
	max_attempts: u8,
	attempt_interval: u32,
	polarity: PaperSensePolarity,
}

impl StatusPoll {
	pub fn new(max_attempts: u8, attempt_interval: u32, polarity: PaperSensePolarity) -> Self {
		Self {
			state: State::Idle,
			last_result: PaperStatus::Unknown,
			max_attempts: max_attempts.max(1),
			attempt_interval,
			polarity,
		}
	}

	pub fn state(&self) -> StatusPollState {
		match self.state {
			State::Idle => StatusPollState::Idle,
			State::Awaiting { .. } => StatusPollState::AwaitingResponse,
			State::Ready(status) => StatusPollState::ResultReady(status),
			State::TimedOut => StatusPollState::TimedOut,
		}
	}

	pub fn is_awaiting(&self) -> bool {
		matches!(self.state, State::Awaiting { .. })
	}

	/// Check if the request has been written completely and a reply should be read.
	pub fn wants_reply(&self) -> bool {
		matches!(self.state, State::Awaiting { unsent: 0, .. })
	}

	/// Start waiting for a reply to a request that completes after `unsent` more bytes are written.
	pub fn start(&mut self, unsent: usize, now: u32) {
		self.state = State::Awaiting {
			unsent,
			attempts: 0,
			attempt_start: now,
		};
	}

	/// Notify the state machine that a queued byte was written.
	pub fn byte_written(&mut self, now: u32) {
		if let State::Awaiting { unsent, attempt_start, .. } = &mut self.state {
			if *unsent > 0 {
				*unsent -= 1;
				if *unsent == 0 {
					*attempt_start = now;
				}
			}
		}
	}

	/// Advance the state machine with the reply byte read at `now`, if any.
	pub fn tick(&mut self, now: u32, reply: Option<u8>) {
		let (attempts, attempt_start) = match &mut self.state {
			State::Awaiting { unsent: 0, attempts, attempt_start } => (attempts, attempt_start),
			_ => return,
		};

		if let Some(status) = reply {
			let result = self.polarity.decode(status);
			debug!("paper status reply {:#04X}: {:?}", status, result);
			self.last_result = result;
			self.state = State::Ready(result);
			return;
		}

		let interval = self.attempt_interval.max(1);
		let elapsed = now.wrapping_sub(*attempt_start);
		if elapsed < interval {
			return;
		}
		// Infrequent ticks still count every interval that passed.
		let intervals = elapsed / interval;
		*attempts = attempts.saturating_add(u8::try_from(intervals).unwrap_or(u8::MAX));
		*attempt_start = attempt_start.wrapping_add(intervals * interval);
		trace!("no paper status reply after {} attempts", attempts);
		if *attempts >= self.max_attempts {
			warn!("printer did not reply to paper status request");
			self.last_result = PaperStatus::Unknown;
			self.state = State::TimedOut;
		}
	}

	/// Get the last result, consuming a pending resolution.
	pub fn take_result(&mut self) -> PaperStatus {
		if matches!(self.state, State::Ready(_) | State::TimedOut) {
			self.state = State::Idle;
		}
		self.last_result
	}
}
