#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::HttpRoute;
use crate::domain::models::TransportKind;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiURL,
    BuildID,
    ConfigFile,
    DeliveryTimeout,
    HealthCheckTimeout,
    HttpRoute,
    RelayListen,
    RelayURL,
    Theme,
    ThemeFile,
    Transport,
    WsURL,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let default_transport = TransportKind::Http.to_string();
        let default_route = HttpRoute::Query.to_string();

        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("agentchat/config.toml")
            .to_string_lossy()
            .to_string();

        let res: &str = match key {
            ConfigKey::ApiURL => "http://localhost:8080",
            ConfigKey::BuildID => "local",
            ConfigKey::DeliveryTimeout => "30000",
            ConfigKey::HealthCheckTimeout => "1000",
            ConfigKey::HttpRoute => &default_route,
            ConfigKey::RelayListen => "127.0.0.1:3000",
            ConfigKey::RelayURL => "http://localhost:3000",
            ConfigKey::Theme => "base16-ocean.dark",
            ConfigKey::ThemeFile => "",
            ConfigKey::Transport => &default_transport,
            ConfigKey::WsURL => "ws://localhost:8080/ws",

            // Special
            ConfigKey::ConfigFile => &config_path,
        };

        return res.to_string();
    }

    fn possible_values(cmd: &Command, key: ConfigKey) -> Vec<String> {
        let key_name = key.to_string();
        if let Some(arg) = cmd
            .get_arguments()
            .find(|e| return e.get_long() == Some(key_name.as_str()))
        {
            return arg
                .get_possible_values()
                .iter()
                .map(|e| return e.get_name().to_string())
                .collect::<Vec<String>>();
        }

        return vec![];
    }

    /// Fills the config from defaults, then the TOML file, then command
    /// line arguments and their environment variables, later sources
    /// winning.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if key == ConfigKey::ConfigFile {
                    continue;
                }

                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let possible_values = Config::possible_values(&cmd, key);

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}': expected a string or integer"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiURL),
            ws_url = Config::get(ConfigKey::WsURL),
            relay_url = Config::get(ConfigKey::RelayURL),
            transport = Config::get(ConfigKey::Transport),
            http_route = Config::get(ConfigKey::HttpRoute),
            delivery_timeout = Config::get(ConfigKey::DeliveryTimeout),
            theme = Config::get(ConfigKey::Theme),
            theme_file = Config::get(ConfigKey::ThemeFile),
            "config"
        );

        return Ok(());
    }

    /// Commented TOML document listing every key with its default.
    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let key_name = key.to_string();
                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key_name.as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let possible_values = Config::possible_values(&cmd, key);
                if !possible_values.is_empty() {
                    description = format!(
                        "{description} [possible values: {}]",
                        possible_values.join(", ")
                    );
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
