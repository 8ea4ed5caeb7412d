#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub type AResult<T> = Result<T, failure::Error>;

pub mod bus;
pub mod chain;
pub mod error;
pub mod i2c;
pub mod pic;

pub use self::bus::{
	BusManager,
	Session,
};
pub use self::chain::{
	Chain,
	ChainTable,
	Voltage,
};
pub use self::error::VoltageError;
pub use self::pic::{
	SettlingIntervals,
	VoltageControl,
	WriteOutcome,
};
