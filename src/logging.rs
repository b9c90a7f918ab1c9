use std::{fs::File, path::Path, str::FromStr};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbosity {
    level: LevelFilter,
}

impl Verbosity {
    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity {
            level: LevelFilter::Warn,
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(string: &str) -> std::result::Result<Verbosity, String> {
        use LevelFilter::*;

        let level = match string {
            "quiet" => Off,
            "error" => Error,
            "warn" => Warn,
            "info" => Info,
            "debug" => Debug,
            "trace" => Trace,
            _ => return Err(format!("invalid verbosity choice '{}'", string)),
        };

        Ok(Verbosity { level })
    }
}

/// Installs the global logger: stderr always, plus `file` when given.
pub fn init(verbosity: Verbosity, file: Option<&Path>) -> Result<()> {
    let config = ConfigBuilder::new()
        .add_filter_allow_str(env!("CARGO_CRATE_NAME"))
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        verbosity.level(),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = file {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(verbosity.level(), config, file));
    }

    CombinedLogger::init(loggers)
        .map_err(|err| Error::InvalidConfig(format!("logger already installed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels() {
        assert_eq!("quiet".parse::<Verbosity>().unwrap().level(), LevelFilter::Off);
        assert_eq!("trace".parse::<Verbosity>().unwrap().level(), LevelFilter::Trace);
        assert_eq!(Verbosity::default().level(), LevelFilter::Warn);
        assert!("loud".parse::<Verbosity>().is_err());
    }
}
