use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::pipeline::IsbnPolicy;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Books without an ISBN-13 are dropped by default.
    pub const FILTER_ISBN: bool = true;

    /// Default bound on a single collaborator call, in seconds.
    pub const PIPELINE_TIMEOUT_SECS: u64 = 60;

    /// Default time budget of a shelf scan, in seconds.
    pub const SHELF_BUDGET_SECS: u64 = 90;

    pub const fn filter_isbn() -> bool {
        FILTER_ISBN
    }

    pub const fn pipeline_timeout_secs() -> u64 {
        PIPELINE_TIMEOUT_SECS
    }

    pub const fn shelf_budget_secs() -> u64 {
        SHELF_BUDGET_SECS
    }
}

/// Longest accepted collaborator call timeout, in seconds.
const MAX_PIPELINE_TIMEOUT_SECS: u64 = 300;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Drops books without an ISBN-13 from every response.
    ///
    /// Accepts boolean-like values such as `true`, `false`, `1`, `0`, `yes`, `no`.
    #[serde(default = "defaults::filter_isbn")]
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "FILTER_ISBN",
            default_value_t = defaults::FILTER_ISBN,
            action = clap::ArgAction::Set,
            value_parser = clap::builder::BoolishValueParser::new()
        )
    )]
    pub filter_isbn: bool,

    /// Upper bound on a single recognition, completion or catalog call, in seconds.
    #[serde(default = "defaults::pipeline_timeout_secs")]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PIPELINE_TIMEOUT", default_value_t = defaults::PIPELINE_TIMEOUT_SECS)
    )]
    pub pipeline_timeout_secs: u64,

    /// Time budget of a whole shelf scan, in seconds.
    ///
    /// Keep it below the request timeout: once spent, the scan answers with
    /// the regions it finished instead of timing out.
    #[serde(default = "defaults::shelf_budget_secs")]
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SHELF_BUDGET", default_value_t = defaults::SHELF_BUDGET_SECS)
    )]
    pub shelf_budget_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            filter_isbn: defaults::FILTER_ISBN,
            pipeline_timeout_secs: defaults::PIPELINE_TIMEOUT_SECS,
            shelf_budget_secs: defaults::SHELF_BUDGET_SECS,
        }
    }
}

impl ServiceConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PIPELINE_TIMEOUT_SECS).contains(&self.pipeline_timeout_secs) {
            return Err(Error::config(format!(
                "pipeline timeout must be between 1 and {MAX_PIPELINE_TIMEOUT_SECS} seconds, got {}",
                self.pipeline_timeout_secs
            )));
        }

        if !(1..=MAX_PIPELINE_TIMEOUT_SECS).contains(&self.shelf_budget_secs) {
            return Err(Error::config(format!(
                "shelf budget must be between 1 and {MAX_PIPELINE_TIMEOUT_SECS} seconds, got {}",
                self.shelf_budget_secs
            )));
        }

        Ok(())
    }

    /// Returns the collaborator call timeout as a Duration.
    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }

    /// Returns the shelf scan budget as a Duration.
    pub fn shelf_budget(&self) -> Duration {
        Duration::from_secs(self.shelf_budget_secs)
    }

    /// Returns the result filter this configuration selects.
    pub fn isbn_policy(&self) -> IsbnPolicy {
        IsbnPolicy::new(self.filter_isbn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn defaults_filter_and_validate() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.isbn_policy().requires_isbn());
        assert_eq!(config.pipeline_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_out_of_range_timeouts() {
        for secs in [0, MAX_PIPELINE_TIMEOUT_SECS + 1] {
            let config = ServiceConfig {
                pipeline_timeout_secs: secs,
                ..ServiceConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    #[test]
    fn rejects_out_of_range_shelf_budgets() {
        for secs in [0, MAX_PIPELINE_TIMEOUT_SECS + 1] {
            let config = ServiceConfig {
                shelf_budget_secs: secs,
                ..ServiceConfig::default()
            };
            assert!(config.validate().is_err());
        }
        assert_eq!(ServiceConfig::default().shelf_budget(), Duration::from_secs(90));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() -> anyhow::Result<()> {
        let config: ServiceConfig = serde_json::from_str("{}")?;
        assert!(config.filter_isbn);
        assert_eq!(config.pipeline_timeout_secs, 60);
        Ok(())
    }
}

#[cfg(all(test, feature = "config"))]
mod parse_tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[clap(flatten)]
        service: ServiceConfig,
    }

    #[test]
    fn filter_isbn_accepts_boolish_values() -> anyhow::Result<()> {
        for (value, expected) in [("false", false), ("0", false), ("no", false), ("yes", true)] {
            let cli = TestCli::try_parse_from(["tabby", "--filter-isbn", value])?;
            assert_eq!(cli.service.filter_isbn, expected);
        }
        Ok(())
    }
}
