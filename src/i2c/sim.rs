//! Simulated controllers on a shared bus, used in unit tests in place of
//! `/dev/i2c-*`.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{
	Arc,
	Mutex,
	MutexGuard,
};
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use super::{
	Bus,
	Channel,
};
use crate::pic::commands::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
	Write(u8, u8),
	Read(u8, u8),
}

impl Event {
	pub fn address(&self) -> u8 {
		match *self {
			Event::Write(address, _) | Event::Read(address, _) => address,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stage {
	Idle,
	GotPreamble1,
	Ready,
	AwaitSetValue,
	Respond(u8),
}

#[derive(Debug)]
pub struct SimController {
	pub version: u8,
	pub voltage: u8,
	// accept SET_VOLTAGE without changing the register
	pub ignore_set: bool,
	pub resets: usize,
	pub jumps: usize,
	stage: Stage,
}

impl SimController {
	fn new() -> Self {
		SimController {
			version: EXPECTED_PIC_VERSION,
			voltage: 0x10,
			ignore_set: false,
			resets: 0,
			jumps: 0,
			stage: Stage::Idle,
		}
	}
}

#[derive(Debug, Default)]
pub struct SimState {
	pub controllers: HashMap<u8, SimController>,
	pub log: Vec<Event>,
	// when each `log` entry happened
	pub stamps: Vec<Instant>,
	pub violations: Vec<String>,
	pub fail_open: bool,
	// fail the n-th write (0-based, counted over the whole bus)
	pub fail_write_at: Option<usize>,
	pub short_read: bool,
	pub write_delay: Duration,
	pub writes: usize,
	pub opened: usize,
	pub open_channels: usize,
}

impl SimState {
	fn controller_write(&mut self, address: u8, byte: u8) {
		let mut violation = None;
		{
			let c = match self.controllers.get_mut(&address) {
				Some(c) => c,
				None => return,
			};
			c.stage = match (c.stage, byte) {
				(Stage::Idle, PIC_COMMAND_1) => Stage::GotPreamble1,
				(Stage::GotPreamble1, PIC_COMMAND_2) => Stage::Ready,
				(Stage::Ready, READ_PIC_SOFTWARE_VERSION) => Stage::Respond(c.version),
				(Stage::Ready, GET_VOLTAGE) => Stage::Respond(c.voltage),
				(Stage::Ready, SET_VOLTAGE) => Stage::AwaitSetValue,
				(Stage::Ready, RESET_PIC) => {
					c.resets += 1;
					Stage::Idle
				},
				(Stage::Ready, JUMP_FROM_LOADER_TO_APP) => {
					c.jumps += 1;
					Stage::Idle
				},
				(Stage::AwaitSetValue, value) => {
					if !c.ignore_set {
						c.voltage = value;
					}
					Stage::Idle
				},
				(stage, byte) => {
					violation = Some(format!("0x{:02x}: unexpected write 0x{:02x} in {:?}", address, byte, stage));
					Stage::Idle
				},
			};
		}
		if let Some(v) = violation {
			self.violations.push(v);
		}
	}

	fn controller_read(&mut self, address: u8) -> u8 {
		let mut violation = None;
		let byte = match self.controllers.get_mut(&address) {
			None => 0xff,
			Some(c) => match c.stage {
				Stage::Respond(byte) => {
					c.stage = Stage::Idle;
					byte
				},
				stage => {
					violation = Some(format!("0x{:02x}: unexpected read in {:?}", address, stage));
					c.stage = Stage::Idle;
					0xff
				},
			},
		};
		if let Some(v) = violation {
			self.violations.push(v);
		}
		byte
	}

	/// Splits the log into exchanges (each starts with the first preamble
	/// byte) and checks every exchange only talks to a single address.
	pub fn exchanges_interleaved(&self) -> bool {
		let mut current = None;
		for event in &self.log {
			if let Event::Write(address, PIC_COMMAND_1) = *event {
				current = Some(address);
				continue;
			}
			if current != Some(event.address()) {
				return true;
			}
		}
		false
	}

	/// Time from the write of `first` to the next event on the bus.
	pub fn pause_after(&self, first: Event) -> Duration {
		let i = self.log.iter().position(|&e| e == first).expect("event not in log");
		self.stamps[i + 1].duration_since(self.stamps[i])
	}

	pub fn writes_to(&self, address: u8) -> Vec<u8> {
		self.log.iter().filter_map(|e| match *e {
			Event::Write(a, byte) if a == address => Some(byte),
			_ => None,
		}).collect()
	}
}

#[derive(Clone, Debug)]
pub struct SimBus {
	state: Arc<Mutex<SimState>>,
}

impl SimBus {
	/// four well-behaved controllers at the default chain addresses
	pub fn new() -> Self {
		let mut state = SimState::default();
		for address in 0x50..0x54 {
			state.controllers.insert(address, SimController::new());
		}
		SimBus {
			state: Arc::new(Mutex::new(state)),
		}
	}

	pub fn state(&self) -> MutexGuard<SimState> {
		self.state.lock().unwrap()
	}

	pub fn controller<F, R>(&self, address: u8, f: F) -> R
	where
		F: FnOnce(&mut SimController) -> R,
	{
		f(self.state().controllers.get_mut(&address).expect("no simulated controller at address"))
	}
}

impl Bus for SimBus {
	type Channel = SimChannel;

	fn open(&self, _path: &Path) -> io::Result<SimChannel> {
		let mut state = self.state();
		if state.fail_open {
			return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated open failure"));
		}
		state.opened += 1;
		state.open_channels += 1;
		Ok(SimChannel {
			state: self.state.clone(),
			address: None,
		})
	}
}

#[derive(Debug)]
pub struct SimChannel {
	state: Arc<Mutex<SimState>>,
	address: Option<u8>,
}

impl SimChannel {
	fn selected(&self) -> io::Result<u8> {
		self.address.ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no slave address selected"))
	}
}

impl Channel for SimChannel {
	fn select_address(&mut self, address: u8) -> io::Result<()> {
		if !self.state.lock().unwrap().controllers.contains_key(&address) {
			return Err(io::Error::new(io::ErrorKind::NotFound, "no device at address"));
		}
		self.address = Some(address);
		Ok(())
	}

	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		let address = self.selected()?;
		let delay = {
			let mut state = self.state.lock().unwrap();
			let n = state.writes;
			state.writes += 1;
			if state.fail_write_at == Some(n) {
				return Err(io::Error::new(io::ErrorKind::Other, "simulated write failure"));
			}
			for &byte in data {
				state.log.push(Event::Write(address, byte));
				state.stamps.push(Instant::now());
				state.controller_write(address, byte);
			}
			state.write_delay
		};
		// release the state between bytes so unserialized callers would interleave
		if delay > Duration::from_millis(0) {
			thread::sleep(delay);
		}
		Ok(data.len())
	}

	fn read(&mut self, target: &mut [u8]) -> io::Result<usize> {
		let address = self.selected()?;
		let mut state = self.state.lock().unwrap();
		if state.short_read {
			return Ok(0);
		}
		for t in target.iter_mut() {
			*t = state.controller_read(address);
			state.log.push(Event::Read(address, *t));
			state.stamps.push(Instant::now());
		}
		Ok(target.len())
	}
}

impl Drop for SimChannel {
	fn drop(&mut self) {
		if let Ok(mut state) = self.state.lock() {
			state.open_channels -= 1;
		}
	}
}
