use std::thread;
use std::time::{
	Duration,
	Instant,
};

/// Delays the controller firmware needs after a command before its new
/// state can be trusted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SettlingIntervals {
	pub post_read: Duration,
	pub post_write: Duration,
	pub post_jump: Duration,
	pub post_reset: Duration,
}

impl SettlingIntervals {
	pub const HARDWARE: SettlingIntervals = SettlingIntervals {
		post_read: Duration::from_millis(500),
		post_write: Duration::from_millis(500),
		post_jump: Duration::from_millis(500),
		post_reset: Duration::from_millis(600),
	};

	// only useful against simulated controllers
	pub fn none() -> Self {
		let zero = Duration::from_millis(0);
		SettlingIntervals {
			post_read: zero,
			post_write: zero,
			post_jump: zero,
			post_reset: zero,
		}
	}
}

impl Default for SettlingIntervals {
	fn default() -> Self {
		Self::HARDWARE
	}
}

// sleep at least `duration`, even if woken early
pub fn reliable_sleep(mut duration: Duration) {
	while duration > Duration::from_millis(0) {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}
