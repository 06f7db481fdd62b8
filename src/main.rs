//! ATM Engine CLI
//!
//! Replays a scripted ATM session against a card roster and prints the
//! outcome of every step as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 10000 cards.csv session.csv > outcomes.csv
//! cargo run -- 10000 cards.csv session.csv --verify-pin
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use atm_engine::{AtmError, Decimal4, PinPolicy, Result, SessionReplay};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;
use std::str::FromStr;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let (flags, args): (Vec<String>, Vec<String>) =
        env::args().skip(1).partition(|a| a.starts_with("--"));
    if args.len() < 3 {
        return Err(AtmError::MissingArgument);
    }

    let mut pin_policy = PinPolicy::Unchecked;
    for flag in flags {
        if flag != "--verify-pin" {
            return Err(AtmError::UnknownFlag { flag });
        }
        pin_policy = PinPolicy::Verify;
    }

    let cash = Decimal4::from_str(&args[0]).map_err(|source| AtmError::InvalidCash {
        value: args[0].clone(),
        source,
    })?;

    let mut replay = SessionReplay::new(cash, pin_policy)?;
    replay.load_cards(BufReader::new(File::open(&args[1])?))?;
    replay.run_session(BufReader::new(File::open(&args[2])?))?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    replay.write_output(handle)?;

    Ok(())
}
