use assert2::{assert, let_assert};
use std::fmt::Write;
use std::time::Duration;
use test_log::test;
use thermal_printer::{Config, DrainError, FlowControl, Settle, TextSize};

mod common;
use common::{BAUD_RATE, BYTE_TIME, TEXT_LINE_TIME};

#[test]
fn write_line_of_text() {
	let (mut printer, serial_port) = common::printer(Config::default(), 1_000, 10);
	assert!(printer.baud_rate() == BAUD_RATE);
	assert!(printer.timing().byte_time == BYTE_TIME);

	printer.write_text("Hi\n");
	assert!(printer.pending_bytes() == 3);
	assert!(serial_port.written().is_empty());

	let_assert!(Ok(()) = printer.flush());
	assert!(printer.pending_bytes() == 0);
	assert!(serial_port.written() == b"Hi\n");
	for gap in serial_port.write_gaps() {
		assert!(gap >= BYTE_TIME);
	}

	// The newline completes a line of text, which the printer needs time for.
	let times = serial_port.write_times();
	let deadline = printer.deadline();
	assert!(deadline.last_activity() == times[2]);
	assert!(deadline.resume_time().wrapping_sub(deadline.last_activity()) == BYTE_TIME + TEXT_LINE_TIME);
}

#[test]
fn carriage_returns_are_dropped() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 50);
	printer.write_text(b"a\r\nb\r\n");
	assert!(printer.pending_bytes() == 4);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == b"a\nb\n");
}

#[test]
fn bytes_are_written_in_order_and_never_early() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.write_text("abc\n");
	printer.enqueue_bytes(&[0x1B, b'E', 1]);
	printer.write_text("\nxyz");
	printer.feed_rows(10);
	let_assert!(Ok(()) = printer.flush());

	assert!(serial_port.written() == b"abc\n\x1BE\x01\nxyz\x1BJ\x0A");
	let gaps = serial_port.write_gaps();
	for &gap in &gaps {
		assert!(gap >= BYTE_TIME);
	}
	// After the first text line.
	assert!(gaps[3] >= BYTE_TIME + TEXT_LINE_TIME);
	// After the blank line.
	assert!(gaps[7] >= BYTE_TIME + 30 * 2_100);
	assert!(gaps[7] < BYTE_TIME + TEXT_LINE_TIME);

	// The feed is charged after its last byte.
	let deadline = printer.deadline();
	assert!(deadline.resume_time().wrapping_sub(deadline.last_activity()) == BYTE_TIME + 10 * 2_100);
}

#[test]
fn drain_writes_at_most_one_byte() {
	let (mut printer, serial_port) = common::printer(Config::default(), 5_000, 0);
	printer.enqueue_bytes(b"ab");

	let_assert!(Ok(true) = printer.drain());
	let_assert!(Ok(false) = printer.drain());
	assert!(serial_port.written() == b"a");

	serial_port.advance(BYTE_TIME - 1);
	let_assert!(Ok(false) = printer.drain());
	serial_port.advance(1);
	let_assert!(Ok(true) = printer.drain());
	assert!(serial_port.written() == b"ab");
}

#[test]
fn drain_on_empty_queue_does_nothing() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 0);
	let before = *printer.deadline();
	for _ in 0..3 {
		let_assert!(Ok(false) = printer.drain());
	}
	assert!(serial_port.written().is_empty());
	assert!(*printer.deadline() == before);
	let_assert!(Ok(()) = printer.flush());
}

#[test]
fn deadline_attaches_to_last_queued_byte() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 0);
	printer.enqueue(1);
	printer.set_deadline(Duration::from_millis(5));
	printer.enqueue(2);

	// The deadline does not delay the byte it is attached to.
	let_assert!(Ok(true) = printer.drain());
	serial_port.advance(BYTE_TIME + 5_000 - 1);
	let_assert!(Ok(false) = printer.drain());
	serial_port.advance(1);
	let_assert!(Ok(true) = printer.drain());
	assert!(serial_port.written() == [1, 2]);
}

#[test]
fn deadline_on_empty_queue_starts_now() {
	let (mut printer, serial_port) = common::printer(Config::default(), 1_000, 0);
	printer.set_deadline(Duration::from_millis(10));
	let_assert!(Ok(false) = printer.is_ready());
	assert!(printer.deadline().resume_time() == 11_000);

	// A shorter deadline does not cut the pending one short.
	printer.set_deadline(Duration::from_millis(1));
	assert!(printer.deadline().resume_time() == 11_000);

	printer.enqueue(b'a');
	serial_port.advance(9_999);
	let_assert!(Ok(false) = printer.drain());
	serial_port.advance(1);
	let_assert!(Ok(true) = printer.drain());
}

#[test]
fn clock_overflow() {
	let start = u32::MAX - 1_000;
	let (mut printer, serial_port) = common::printer(Config::default(), start, 50);
	printer.write_text("Hi\nok");
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == b"Hi\nok");

	let times = serial_port.write_times();
	assert!(times[0] > start);
	assert!(times[4] < start);
	let gaps = serial_port.write_gaps();
	for &gap in &gaps {
		assert!(gap >= BYTE_TIME);
		assert!(gap < BYTE_TIME + TEXT_LINE_TIME + 1_000);
	}
	assert!(gaps[2] >= BYTE_TIME + TEXT_LINE_TIME);
}

#[test]
fn long_idle_does_not_stall() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 10);
	printer.write_text("a");
	let_assert!(Ok(()) = printer.flush());

	// Idle for longer than half the range of the clock.
	serial_port.advance(2_400_000_000);
	printer.enqueue(b'b');
	let_assert!(Ok(true) = printer.drain());
	assert!(serial_port.written() == b"ab");

	// And for longer than the full range, as long as the printer is checked in between.
	serial_port.advance(BYTE_TIME);
	let_assert!(Ok(true) = printer.is_ready());
	serial_port.advance(2_500_000_000);
	serial_port.advance(2_500_000_000);
	printer.enqueue(b'c');
	let_assert!(Ok(true) = printer.drain());
	assert!(serial_port.written() == b"abc");
}

#[test]
fn wake_and_begin() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.begin();
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == [0xFF, 0x1B, b'8', 0, 0, 0x1B, b'@']);
	assert!(serial_port.write_gaps()[0] >= BYTE_TIME + 50_000);
}

#[test]
fn wake_legacy_firmware() {
	let (mut printer, serial_port) = common::printer(Config::default().with_firmware(263), 0, 100);
	printer.wake();
	let_assert!(Ok(()) = printer.flush());

	let mut expected: Vec<u8> = vec![0xFF];
	expected.extend([0; 10]);
	assert!(serial_port.written() == expected);
	let gaps = serial_port.write_gaps();
	assert!(gaps[0] >= BYTE_TIME);
	assert!(gaps[0] < BYTE_TIME + 10_000);
	for &gap in &gaps[1..] {
		assert!(gap >= BYTE_TIME + 10_000);
	}
}

#[test]
fn wake_resets_deadline_on_empty_queue() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 0);
	printer.set_deadline(Duration::from_secs(10));
	printer.wake();
	let_assert!(Ok(true) = printer.drain());
	assert!(serial_port.written() == [0xFF]);
}

#[test]
fn sleep_commands() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.sleep();
	printer.sleep_after(300);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == [0x1B, b'8', 1, 0, 0x1B, b'8', 0x2C, 0x01]);

	let (mut printer, serial_port) = common::printer(Config::default().with_firmware(260), 0, 100);
	printer.sleep_after(300);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == [0x1B, b'8', 255]);
}

#[test]
fn feed_lines() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.write_text("x");
	printer.feed_lines(2);
	printer.write_text("y");
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == [b'x', 0x1B, b'd', 2, b'y']);
	assert!(serial_port.write_gaps()[3] >= BYTE_TIME + 2 * 30 * 2_100);
	assert!(printer.text_metrics().column() == 1);

	let (mut printer, serial_port) = common::printer(Config::default().with_firmware(263), 0, 100);
	printer.feed_lines(2);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == b"\n\n");
}

#[test]
fn text_size_changes_line_cost() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.enqueue_bytes(&[0x1D, b'!', 0x11]);
	printer.text_metrics_mut().set_size(TextSize::Large);
	printer.write_text("big\n");
	printer.enqueue(b'.');
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.write_gaps()[6] >= BYTE_TIME + 48 * 30_000 + 6 * 2_100);
}

#[test]
fn settle_ends_the_line() {
	let (mut printer, _serial_port) = common::printer(Config::default(), 0, 100);
	printer.write_text("barcode");
	assert!(!printer.text_metrics().after_line_break());
	printer.settle(Settle::Barcode { height: 50 });
	assert!(printer.text_metrics().after_line_break());

	printer.write_text("abc");
	printer.settle(Settle::Fixed(Duration::from_millis(1)));
	assert!(printer.text_metrics().column() == 3);
}

#[test]
fn format_text() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	let_assert!(Ok(()) = writeln!(printer, "{} + {} = {}", 1, 2, 3));
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == b"1 + 2 = 3\n");
}

#[test]
fn busy_line_gates_writes() {
	let config = Config::default().with_busy_signal(true);
	let (mut printer, serial_port) = common::printer(config, 0, 0);
	assert!(printer.flow_control() == FlowControl::HardwareSignal);

	printer.begin();
	printer.write_text("Hi\n");
	printer.set_deadline(Duration::from_secs(1));

	serial_port.set_busy(true);
	let_assert!(Ok(false) = printer.drain());
	assert!(serial_port.written().is_empty());

	// The clock never advances, so only the busy line can release the bytes.
	serial_port.set_busy(false);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == [0xFF, 0x1B, b'8', 0, 0, 0x1B, b'@', 0x1D, b'a', 0x20, b'H', b'i', b'\n']);
}

#[test]
fn write_errors_are_reported() {
	let (mut printer, serial_port) = common::printer(Config::default(), 0, 100);
	printer.enqueue_bytes(b"ab");
	serial_port.fail_writes.store(true, std::sync::atomic::Ordering::Relaxed);
	let_assert!(Err(DrainError::Write(_)) = printer.drain());

	// A byte handed to the port is not sent again.
	serial_port.fail_writes.store(false, std::sync::atomic::Ordering::Relaxed);
	let_assert!(Ok(()) = printer.flush());
	assert!(serial_port.written() == b"b");
}
