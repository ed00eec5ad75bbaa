use std::path::PathBuf;
use std::time::{Duration, Instant};
use thermal_printer::{Config, PaperStatus, Printer, StatusPollState};

fn main() {
	let serial_port: PathBuf = std::env::args_os().nth(1).unwrap_or_else(|| "/dev/ttyUSB0".into()).into();
	let mut printer = Printer::open(&serial_port, 19200, Config::default())
		.map_err(|e| println!("Failed to open serial port: {}: {}", serial_port.display(), e))
		.unwrap();

	printer.begin();
	printer.issue_status_poll().unwrap();

	// Drive the printer from an idle loop, like an application with other work to do.
	let start = Instant::now();
	while printer.poll_state() == StatusPollState::AwaitingResponse && start.elapsed() < Duration::from_secs(5) {
		printer.drain().unwrap();
	}
	match printer.paper_status() {
		PaperStatus::NoPaper => {
			println!("Printer is out of paper");
			return;
		},
		PaperStatus::HasPaper => println!("Printer has paper"),
		PaperStatus::Unknown => println!("Printer did not report its paper status"),
	}

	printer.write_text("Hello, world!\n");
	let checkerboard: Vec<u8> = (0..64).flat_map(|row| [if row % 16 < 8 { 0xF0 } else { 0x0F }; 48]).collect();
	printer.print_bitmap(384, 64, &checkerboard).unwrap();
	printer.feed_lines(3);
	printer.sleep();
	printer.flush().unwrap();
}
