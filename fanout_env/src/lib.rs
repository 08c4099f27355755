#![deny(missing_docs)]
//! This crate provides a typed utility for determining what environment we are in at runtime,
//! plus required-variable lookup shared by the collaborator client crates.

use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// The current environment the application is running in
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Dev and or staging environment
    Develop,
    /// The server is running on localhost
    Local,
}

/// An error which can occur when reading configuration from the environment
#[derive(Debug, Error)]
pub enum EnvError {
    /// A required environment variable was not set
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    /// the input string value was not recognized as a valid env
    #[error("{0}")]
    InvalidValue(#[from] UnknownValue),
}

impl Environment {
    /// Attempt to construct a new version of [Environment] from the `ENVIRONMENT` variable
    #[tracing::instrument(err, level = tracing::Level::TRACE)]
    pub fn new_from_env() -> Result<Self, EnvError> {
        let v = required_var("ENVIRONMENT")?;
        Ok(Self::from_str(&v)?)
    }

    /// attempt to create a new [Environment] falling back to production if we fail to construct
    pub fn new_or_prod() -> Self {
        Self::new_from_env().unwrap_or(Environment::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "prod"),
            Environment::Develop => write!(f, "dev"),
            Environment::Local => write!(f, "local"),
        }
    }
}

/// Represents a value which cannot be converted into an [Environment]
#[derive(Debug, Error)]
#[error("Could not convert {0} into an environment value")]
pub struct UnknownValue(String);

impl FromStr for Environment {
    type Err = UnknownValue;

    fn from_str(environment: &str) -> Result<Self, UnknownValue> {
        match environment {
            "prod" => Ok(Environment::Production),
            "dev" => Ok(Environment::Develop),
            "local" => Ok(Environment::Local),
            s => Err(UnknownValue(s.to_string())),
        }
    }
}

/// Reads a required environment variable by name
pub fn required_var(name: &'static str) -> Result<String, EnvError> {
    std::env::var(name).map_err(|_| EnvError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_environments() {
        assert_eq!("prod".parse::<Environment>().ok(), Some(Environment::Production));
        assert_eq!("dev".parse::<Environment>().ok(), Some(Environment::Develop));
        assert_eq!("local".parse::<Environment>().ok(), Some(Environment::Local));
    }

    #[test]
    fn rejects_unknown_environment() {
        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn display_matches_parse() {
        for env in [Environment::Production, Environment::Develop, Environment::Local] {
            assert_eq!(env.to_string().parse::<Environment>().ok(), Some(env));
        }
    }
}
