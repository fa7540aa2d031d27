use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use regart::{CliArgs, CliDriver, CliError, DriverConfig, FileSink, LogLevel, Logger};

/// Rotate the log file once it grows past 1 MiB.
const LOG_FILE_MAX_BYTES: u64 = 1024 * 1024;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config = match driver_config(&args) {
        Ok(config) => config,
        Err(err) => return fail(&CliDriver::default(), &err),
    };
    let driver = CliDriver::new(config);

    match driver.run(&args, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&driver, &err),
    }
}

fn driver_config(args: &CliArgs) -> Result<DriverConfig, CliError> {
    let logger = match &args.log_file {
        Some(path) => Some(
            Logger::new(FileSink::new(path, LOG_FILE_MAX_BYTES)?).with_min_level(LogLevel::Debug),
        ),
        None => None,
    };
    Ok(DriverConfig {
        logger,
        color: io::stderr().is_terminal(),
    })
}

fn fail(driver: &CliDriver, err: &CliError) -> ExitCode {
    driver.report_error(err, &mut io::stderr().lock()).ok();
    ExitCode::FAILURE
}
