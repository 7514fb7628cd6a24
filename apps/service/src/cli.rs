use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};

/// How the checker is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Check every endpoint and exit
    Cli,
    /// Serve `GET /health`, running the checks on every request
    Web,
}

#[derive(Debug, Parser)]
#[command(
    name = "health-checker",
    version,
    about = "Probe HTTP endpoints and alert when they are down"
)]
pub struct Cli {
    /// Run mode, falls back to the MODE environment variable
    #[arg(value_enum, env = "MODE", default_value_t = Mode::Cli, ignore_case = true)]
    pub mode: Mode,

    /// Repeat the checks every SECONDS until interrupted (cli mode)
    #[arg(
        long,
        env = "CHECK_INTERVAL",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: Option<u64>,

    /// Address the web server binds to
    #[arg(long, env = "BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port the web server listens on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
}

impl Cli {
    /// Parse the command line, exiting with usage and status 2 on invalid input
    pub fn parse_args() -> Self {
        let cli = Self::parse();

        if cli.mode == Mode::Web && !cfg!(feature = "web") {
            Self::command()
                .error(ErrorKind::InvalidValue, "web mode is not available in this build")
                .exit();
        }

        cli
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_modes_are_case_insensitive() {
        let cli = Cli::try_parse_from(["health-checker", "WEB"]).unwrap();
        assert_eq!(cli.mode, Mode::Web);

        let cli = Cli::try_parse_from(["health-checker", "cli"]).unwrap();
        assert_eq!(cli.mode, Mode::Cli);
    }

    #[test]
    fn test_unknown_mode_exits_with_usage_error() {
        let error = Cli::try_parse_from(["health-checker", "daemon"]).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::InvalidValue);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_web_options() {
        let cli =
            Cli::try_parse_from(["health-checker", "web", "--bind", "127.0.0.1", "--port", "8080"])
                .unwrap();

        assert_eq!(cli.bind, "127.0.0.1");
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn test_interval_must_be_positive() {
        let cli = Cli::try_parse_from(["health-checker", "cli", "--interval", "30"]).unwrap();
        assert_eq!(cli.interval, Some(30));

        assert!(Cli::try_parse_from(["health-checker", "cli", "--interval", "0"]).is_err());
    }
}
