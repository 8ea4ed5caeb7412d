use std::io;

use crate::chain::Chain;

/// Everything that can go wrong talking to a chain's voltage controller.
///
/// Each variant is fatal to the operation that raised it; the caller decides
/// whether to continue with other chains.
#[derive(Debug, Fail)]
pub enum VoltageError {
	#[fail(display = "failed to open bus {}: {}", path, cause)]
	BusOpen {
		path: String,
		#[fail(cause)]
		cause: io::Error,
	},

	#[fail(display = "chain {}: failed to select address 0x{:02x}: {}", chain, address, cause)]
	AddressBind {
		chain: Chain,
		address: u8,
		#[fail(cause)]
		cause: io::Error,
	},

	#[fail(display = "chain {}: unsupported controller version 0x{:02x} (expected 0x{:02x})", chain, version, expected)]
	UnsupportedControllerVersion {
		chain: Chain,
		version: u8,
		expected: u8,
	},

	#[fail(display = "chain {}: bus transaction failed ({}): {}", chain, step, cause)]
	TransactionIo {
		chain: Chain,
		step: &'static str,
		#[fail(cause)]
		cause: io::Error,
	},

	#[fail(display = "chain {}: voltage was not set (requested 0x{:02x}, read back 0x{:02x})", chain, requested, actual)]
	VerificationMismatch {
		chain: Chain,
		requested: u8,
		// value before the write
		previous: u8,
		actual: u8,
	},

	#[fail(display = "invalid argument: {}", _0)]
	InvalidArgument(String),
}

impl VoltageError {
	pub fn is_invalid_argument(&self) -> bool {
		match self {
			VoltageError::InvalidArgument(_) => true,
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, VoltageError>;
