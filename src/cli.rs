//! Command-line interface of the `service-desk` binary.

use crate::desk::{DeskConfig, Targets};

use clap::Parser;

/// Simulate one workday of an IT service desk and print the final counters.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "service-desk", version)]
pub struct Args {
    /// Ride (on-site repair) requests to generate over the day
    pub ride: usize,
    /// Diagnostics requests to generate over the day
    pub diagnostics: usize,
    /// Software install requests to generate over the day
    pub install: usize,
    /// Office workers: intake, diagnostics and installs
    pub office_workers: usize,
    /// Ride workers: rides and network deployments
    pub ride_workers: usize,
    /// Non-zero staffs every task from a single universal pool
    pub universal: i64,
    /// Seed for the random stream; a fresh one is drawn and logged when omitted
    #[arg(long)]
    pub seed: Option<u64>,
    /// Size of the universal pool
    #[arg(long, default_value_t = DeskConfig::DEFAULT_UNIVERSAL_WORKERS)]
    pub universal_workers: usize,
}

impl Args {
    pub fn into_config(self) -> DeskConfig {
        let mut config = DeskConfig::new(
            Targets::new(self.ride, self.diagnostics, self.install),
            self.office_workers,
            self.ride_workers,
            self.universal != 0,
        );
        config.universal_workers = self.universal_workers;
        config.seed = self.seed;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn six_positionals_make_a_config() {
        let args = Args::try_parse_from(["service-desk", "20", "10", "15", "3", "2", "0"]).unwrap();
        let config = args.into_config();
        assert_eq!(Targets::new(20, 10, 15), config.targets);
        assert_eq!((3, 2), (config.office_workers, config.ride_workers));
        assert!(!config.universal);
        assert_eq!(5, config.universal_workers);
        assert_eq!(None, config.seed);
    }

    #[test]
    fn any_non_zero_switch_enables_universal_mode() {
        let args = Args::try_parse_from(["service-desk", "1", "1", "1", "1", "1", "7", "--seed", "42"]).unwrap();
        let config = args.into_config();
        assert!(config.universal);
        assert_eq!(Some(42), config.seed);

        let args =
            Args::try_parse_from(["service-desk", "0", "0", "0", "0", "0", "1", "--universal-workers", "8"]).unwrap();
        assert_eq!(8, args.into_config().universal_workers);
    }

    #[test]
    fn missing_or_malformed_parameters_are_rejected() {
        assert!(Args::try_parse_from(["service-desk", "20", "10", "15", "3", "2"]).is_err());
        assert!(Args::try_parse_from(["service-desk", "20", "10", "15", "3", "2", "0", "9"]).is_err());
        assert!(Args::try_parse_from(["service-desk", "20", "ten", "15", "3", "2", "0"]).is_err());
        assert!(Args::try_parse_from(["service-desk", "-1", "10", "15", "3", "2", "0"]).is_err());
    }
}
