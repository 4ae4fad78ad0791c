use std::process::ExitCode;

use clap::Parser;
use log::error;

use sgxget::download::SGX_BASE_URL;
use sgxget::driver;
use sgxget::logging;
use sgxget::settings::{Args, Settings};

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init() {
        eprintln!("failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }
    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    ExitCode::from(driver::run(&settings, SGX_BASE_URL))
}
