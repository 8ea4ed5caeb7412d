#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate pic_set_voltage;
use pic_set_voltage::*;

use std::process::exit;

use pic_set_voltage::i2c::{
	DEFAULT_DEVICE,
	LinuxBus,
};

// parse an optional parameter; invalid values end the process with usage
fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> Option<T>
where
	T: std::str::FromStr<Err = VoltageError>,
{
	let param = matches.value_of(name)?;
	match param.parse::<T>() {
		Ok(v) => Some(v),
		Err(e) => {
			eprintln!("{}", e);
			eprintln!("{}", matches.usage());
			exit(1);
		},
	}
}

fn print_voltage(chain: Chain, voltage: u8) {
	println!("chain {}: voltage = 0x{:02x}", chain, voltage);
}

fn read_all(control: &VoltageControl<LinuxBus>) -> AResult<()> {
	println!("Reading all voltages");
	let mut failed = 0;
	for (chain, result) in control.read_all_voltages() {
		match result {
			Ok(voltage) => print_voltage(chain, voltage),
			Err(e) => {
				error!("{}", e);
				failed += 1;
			},
		}
	}
	if failed > 0 {
		bail!("failed to read {} of 4 chains", failed);
	}
	Ok(())
}

fn read_one(control: &VoltageControl<LinuxBus>, chain: Chain) -> AResult<()> {
	println!("Reading voltage chain {}:", chain);
	print_voltage(chain, control.read_voltage(chain)?);
	Ok(())
}

fn write_one(control: &VoltageControl<LinuxBus>, chain: Chain, voltage: Voltage) -> AResult<()> {
	println!("Setting voltage on chain {} to {}", chain, voltage);
	match control.write_voltage(chain, voltage.value()) {
		Ok(outcome) => {
			print_voltage(chain, outcome.previous);
			print_voltage(chain, outcome.current);
			println!("Success: Voltage updated!");
			Ok(())
		},
		Err(VoltageError::VerificationMismatch { chain, previous, actual, .. }) => {
			print_voltage(chain, previous);
			print_voltage(chain, actual);
			bail!("Voltage was not successfully set on chain {}", chain);
		},
		Err(e) => Err(e.into()),
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg device: -d --device +takes_value "i2c bus device the controllers are attached to [default: /dev/i2c-0]")
		(@arg reset: --reset "reset controllers and start their application firmware before use")
		(@arg CHAIN: "chain # 1-4; all chains are read if not given")
		(@arg VOLTAGE: "voltage in hex (0x00-0xfe) to set; voltage is read if not given")
	).get_matches();

	let chain: Option<Chain> = get_param(&matches, "CHAIN");
	let voltage: Option<Voltage> = get_param(&matches, "VOLTAGE");
	let device = matches.value_of("device").unwrap_or(DEFAULT_DEVICE);

	let manager = BusManager::linux(device);
	let control = VoltageControl::new(&manager).reset_on_open(matches.is_present("reset"));

	match (chain, voltage) {
		(None, _) => read_all(&control),
		(Some(chain), None) => read_one(&control, chain),
		(Some(chain), Some(voltage)) => write_one(&control, chain, voltage),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
