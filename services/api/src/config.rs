//! Server settings read from the environment

use anyhow::Result;
use config::{Config, Environment};
use serde::Deserialize;

/// Settings of the HTTP server process
///
/// # Environment Variables
/// - `PORT`: Listening port (default: 8888)
/// - `SKIP_SEEDER`: Skip seeding users at startup (default: false)
/// - `SEED_FILE`: JSON file of `{username, password}` entries (default: "seed/users.json")
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub skip_seeder: bool,
    pub seed_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(Environment::default())
    }

    fn from_source(environment: Environment) -> Result<Self> {
        let config = Config::builder()
            .set_default("port", 8888_i64)?
            .set_default("skip_seeder", false)?
            .set_default("seed_file", "seed/users.json")?
            .add_source(environment.try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use tokio_test::{assert_err, assert_ok};

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let mut map = Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults_apply_to_empty_environment() {
        let config = assert_ok!(AppConfig::from_source(environment(&[])));
        assert_eq!(
            config,
            AppConfig {
                port: 8888,
                skip_seeder: false,
                seed_file: "seed/users.json".to_string(),
            }
        );
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = assert_ok!(AppConfig::from_source(environment(&[
            ("PORT", "9000"),
            ("SKIP_SEEDER", "true"),
            ("SEED_FILE", "/etc/income/users.json"),
        ])));
        assert_eq!(config.port, 9000);
        assert!(config.skip_seeder);
        assert_eq!(config.seed_file, "/etc/income/users.json");
    }

    #[test]
    fn test_unparsable_values_are_rejected() {
        assert_err!(AppConfig::from_source(environment(&[("PORT", "http")])));
        assert_err!(AppConfig::from_source(environment(&[("SKIP_SEEDER", "maybe")])));
    }
}
