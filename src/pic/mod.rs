//! Voltage controller protocol: version check, voltage read, and voltage
//! write verified by reading back.
//!
//! Every operation runs in its own session: open, validate the controller
//! firmware, issue the commands with their settling delays, close. Nothing
//! is retried; the caller decides whether to run an operation again.

pub mod commands;
mod timing;

use crate::bus::{
	BusManager,
	Session,
};
use crate::chain::{
	Chain,
	Voltage,
};
use crate::error::{
	Result,
	VoltageError,
};
use crate::i2c::Bus;

use self::commands::*;

pub use self::timing::{
	SettlingIntervals,
	reliable_sleep,
};

/// Result of a verified write
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WriteOutcome {
	/// register value before the write (diagnostic only)
	pub previous: u8,
	/// register value read back after settling; equals the requested value
	pub current: u8,
}

pub fn read_version<B: Bus>(session: &mut Session<B>) -> Result<u8> {
	let mut version = [0u8];
	session.exchange(&[READ_PIC_SOFTWARE_VERSION], &mut version)?;
	Ok(version[0])
}

/// Checks the controller runs the firmware revision this protocol is for.
/// Not cached: every session validates again.
pub fn validate_controller<B: Bus>(session: &mut Session<B>) -> Result<()> {
	let version = read_version(session)?;
	if version != EXPECTED_PIC_VERSION {
		return Err(VoltageError::UnsupportedControllerVersion {
			chain: session.chain(),
			version,
			expected: EXPECTED_PIC_VERSION,
		});
	}
	Ok(())
}

pub fn get_voltage<B: Bus>(session: &mut Session<B>) -> Result<u8> {
	let mut voltage = [0u8];
	session.exchange(&[GET_VOLTAGE], &mut voltage)?;
	reliable_sleep(session.manager().settling().post_read);
	Ok(voltage[0])
}

pub fn set_voltage<B: Bus>(session: &mut Session<B>, voltage: Voltage) -> Result<()> {
	session.exchange(&[SET_VOLTAGE, voltage.value()], &mut [])?;
	reliable_sleep(session.manager().settling().post_write);
	Ok(())
}

pub fn reset_controller<B: Bus>(session: &mut Session<B>) -> Result<()> {
	session.exchange(&[RESET_PIC], &mut [])?;
	reliable_sleep(session.manager().settling().post_reset);
	Ok(())
}

pub fn jump_to_app<B: Bus>(session: &mut Session<B>) -> Result<()> {
	session.exchange(&[JUMP_FROM_LOADER_TO_APP], &mut [])?;
	reliable_sleep(session.manager().settling().post_jump);
	Ok(())
}

/// The two user-facing operations on top of a `BusManager`.
#[derive(Debug)]
pub struct VoltageControl<'a, B: Bus + 'a> {
	manager: &'a BusManager<B>,
	reset_on_open: bool,
}

impl<'a, B: Bus> VoltageControl<'a, B> {
	pub fn new(manager: &'a BusManager<B>) -> Self {
		VoltageControl {
			manager,
			reset_on_open: false,
		}
	}

	/// Reset the controller and start its application firmware before
	/// validating it.
	pub fn reset_on_open(mut self, reset: bool) -> Self {
		self.reset_on_open = reset;
		self
	}

	fn open_validated(&self, chain: Chain) -> Result<Session<'a, B>> {
		let mut session = self.manager.open_session(chain)?;
		if self.reset_on_open {
			reset_controller(&mut session)?;
			jump_to_app(&mut session)?;
		}
		validate_controller(&mut session)?;
		Ok(session)
	}

	pub fn read_voltage(&self, chain: Chain) -> Result<u8> {
		let mut session = self.open_validated(chain)?;
		let voltage = get_voltage(&mut session)?;
		session.close();
		Ok(voltage)
	}

	/// Reads every chain; a failing chain doesn't stop the sweep.
	pub fn read_all_voltages(&self) -> Vec<(Chain, Result<u8>)> {
		Chain::all().map(|chain| (chain, self.read_voltage(chain))).collect()
	}

	/// Writes `requested` and confirms it by an independent read after the
	/// settling interval; the controller doesn't acknowledge writes.
	pub fn write_voltage(&self, chain: Chain, requested: u8) -> Result<WriteOutcome> {
		let requested = Voltage::new(requested)?;

		let mut session = self.open_validated(chain)?;
		let previous = get_voltage(&mut session)?;
		info!("chain {}: voltage = 0x{:02x}, setting {}", chain, previous, requested);
		set_voltage(&mut session, requested)?;
		let current = get_voltage(&mut session)?;
		session.close();

		if current != requested.value() {
			warn!("chain {}: voltage read back as 0x{:02x} after setting {}", chain, current, requested);
			return Err(VoltageError::VerificationMismatch {
				chain,
				requested: requested.value(),
				previous,
				actual: current,
			});
		}

		info!("chain {}: voltage updated to {}", chain, requested);
		Ok(WriteOutcome { previous, current })
	}
}
