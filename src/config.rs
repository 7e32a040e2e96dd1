//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::state::timer_state::{DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "study-streak")]
#[command(about = "A poll-driven Pomodoro session timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Work session duration in minutes
    #[arg(short, long, default_value_t = DEFAULT_WORK_MINUTES)]
    pub work: u64,

    /// Short break duration in minutes
    #[arg(short = 'b', long = "break-mins", default_value_t = DEFAULT_BREAK_MINUTES)]
    pub break_mins: u64,

    /// Interval between timer polls in milliseconds
    #[arg(long, default_value = "200")]
    pub tick_ms: u64,

    /// Minimum gap between accepted touch gestures in milliseconds
    #[arg(long, default_value = "300")]
    pub debounce_ms: u64,

    /// Start a work session as soon as the server is up
    #[arg(long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Reject settings the timer cannot run with
    pub fn validate(&self) -> Result<(), String> {
        if self.work == 0 {
            return Err("Work duration must be at least 1 minute".to_string());
        }
        if self.break_mins == 0 {
            return Err("Break duration must be at least 1 minute".to_string());
        }
        if self.work.checked_mul(60).is_none() {
            return Err(format!("Work duration of {} minutes is too large", self.work));
        }
        if self.break_mins.checked_mul(60).is_none() {
            return Err(format!("Break duration of {} minutes is too large", self.break_mins));
        }
        if self.tick_ms == 0 {
            return Err("Tick interval must be greater than 0ms".to_string());
        }
        Ok(())
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn touch_debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware_timings() {
        let config = Config::try_parse_from(["study-streak"]).unwrap();
        assert_eq!(config.work, 45);
        assert_eq!(config.break_mins, 5);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert_eq!(config.touch_debounce(), Duration::from_millis(300));
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_durations_parse() {
        let config = Config::try_parse_from(["study-streak", "-w", "25", "-b", "10", "-v"]).unwrap();
        assert_eq!(config.work, 25);
        assert_eq!(config.break_mins, 10);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn zero_durations_are_rejected() {
        let config = Config::try_parse_from(["study-streak", "--work", "0"]).unwrap();
        assert!(config.validate().is_err());

        let config = Config::try_parse_from(["study-streak", "--break-mins", "0"]).unwrap();
        assert!(config.validate().is_err());

        let config = Config::try_parse_from(["study-streak", "--tick-ms", "0"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let config = Config::try_parse_from(["study-streak", "--work", "307445734561825861"]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("too large"), "unexpected error: {err}");

        let config = Config::try_parse_from(["study-streak", "-b", "307445734561825861"]).unwrap();
        assert!(config.validate().is_err());

        // Largest value that still fits in seconds
        let config = Config::try_parse_from(["study-streak", "--work", "307445734561825860"]).unwrap();
        assert!(config.validate().is_ok());
    }
}
