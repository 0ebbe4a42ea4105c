use clap::Parser;
use servicedesk::cli::Args;
use servicedesk::desk::ServiceDesk;

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Args::parse().into_config();
    let result = ServiceDesk::new(&config).and_then(|mut desk| {
        println!("Simulation started, seed {}.", desk.seed());
        desk.run()
    });
    match result {
        Ok(report) => {
            println!("{}", report);
            println!("Simulation ended at {}.", report.end_time);
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("simulation failed: {}", error);
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}
