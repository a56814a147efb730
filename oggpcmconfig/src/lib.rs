//! # OggPcm configuration
//!
//! Tunables of the decoding bridge, read from YAML:
//! - an embedded default configuration (`oggpcm.yaml`)
//! - merged with an optional `config.yaml` from the configuration directory
//! - then overridden by `OGGPCM_CONFIG__SECTION__KEY=value` environment variables
//!
//! ## Usage
//!
//! ```no_run
//! use oggpcmconfig::get_config;
//!
//! let config = get_config();
//! let buffer = config.get_decode_buffer_size();
//! let level = config.get_log_level();
//! println!("decode buffer: {buffer} bytes, log level: {level}");
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

const DEFAULT_CONFIG: &str = include_str!("oggpcm.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> = Arc::new(Config::load_or_default());
}

const ENV_CONFIG_DIR: &str = "OGGPCM_CONFIG";
const ENV_PREFIX: &str = "OGGPCM_CONFIG__";
const CONFIG_DIR_NAME: &str = ".oggpcm";
const CONFIG_FILE_NAME: &str = "config.yaml";

const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
const DEFAULT_BITRATE: u32 = 192_000;
const DEFAULT_FALLBACK_SAMPLE_RATE: u32 = 44_100;
const DEFAULT_FALLBACK_CHANNELS: u8 = 2;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Generates a getter for a positive integer value with a default
macro_rules! impl_uint_config {
    ($getter:ident, $ty:ty, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> $ty {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .filter(|v| *v > 0)
                    .unwrap_or($default),
                _ => $default,
            }
        }
    };
}

/// Configuration of the decoding bridge.
#[derive(Debug, Clone)]
pub struct Config {
    path: Option<PathBuf>,
    data: Value,
}

impl Config {
    /// Finds the config directory by trying different locations in order
    ///
    /// 1. The provided `directory`
    /// 2. The `OGGPCM_CONFIG` environment variable
    /// 3. `.oggpcm` in the current directory
    /// 4. `.oggpcm` in the user's home directory
    fn find_config_dir(directory: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = directory {
            return Some(dir.to_path_buf());
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return Some(PathBuf::from(env_path));
        }

        let local = Path::new(CONFIG_DIR_NAME);
        if local.is_dir() {
            return Some(local.to_path_buf());
        }

        home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .filter(|dir| dir.is_dir())
    }

    /// Loads the configuration
    ///
    /// The embedded defaults are merged with `config.yaml` from the config
    /// directory when it exists, keys are lower-cased, then environment
    /// overrides are applied. Unlike a missing file, an unreadable or invalid
    /// `config.yaml` is an error.
    pub fn load_config(directory: Option<&Path>) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let path = Self::find_config_dir(directory).map(|dir| dir.join(CONFIG_FILE_NAME));
        let path = match path {
            Some(path) if path.is_file() => {
                let data = fs::read(&path)?;
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut value, &lower_keys_value(external));
                info!(config_file = %path.display(), "Loaded config file");
                Some(path)
            }
            Some(path) => {
                info!(config_file = %path.display(), "Config file not found, using default embedded config");
                None
            }
            None => None,
        };

        let mut data = lower_keys_value(value);
        apply_overrides(&mut data, env::vars());
        Ok(Config { path, data })
    }

    /// Parses a configuration from YAML text merged over the embedded defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &lower_keys_value(external));
        Ok(Config {
            path: None,
            data: lower_keys_value(value),
        })
    }

    /// The embedded default configuration
    pub fn embedded() -> Self {
        Self::from_yaml_str("{}").unwrap_or_else(|_| Config {
            path: None,
            data: Value::Mapping(Mapping::new()),
        })
    }

    fn load_or_default() -> Self {
        Self::load_config(None).unwrap_or_else(|err| {
            warn!(error = %err, "Invalid configuration, using embedded defaults");
            Self::embedded()
        })
    }

    /// Path of the user configuration file that was merged, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Gets a configuration value at the specified path
    ///
    /// `path` is an array of keys such as `&["decoder", "buffer_size"]`.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let mut current = &self.data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(&Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    impl_uint_config!(
        get_decode_buffer_size,
        usize,
        &["decoder", "buffer_size"],
        DEFAULT_BUFFER_SIZE
    );
    impl_uint_config!(
        get_output_buffer_size,
        usize,
        &["decoder", "output_buffer_size"],
        DEFAULT_BUFFER_SIZE
    );
    impl_uint_config!(get_aac_bitrate, u32, &["encoder", "bitrate"], DEFAULT_BITRATE);
    impl_uint_config!(
        get_fallback_sample_rate,
        u32,
        &["encoder", "fallback_sample_rate"],
        DEFAULT_FALLBACK_SAMPLE_RATE
    );
    impl_uint_config!(
        get_fallback_channels,
        u8,
        &["encoder", "fallback_channels"],
        DEFAULT_FALLBACK_CHANNELS
    );

    /// Gets the log filter directive, e.g. `info` or `oggpcm=debug`
    pub fn get_log_level(&self) -> String {
        match self.get_value(&["logging", "level"]) {
            Ok(Value::String(s)) if !s.trim().is_empty() => s,
            _ => DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Returns the global configuration, loaded on first access
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Recursively merges `external` into `default`
///
/// Mappings are merged key by key, scalars and sequences are replaced, nulls
/// are ignored.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (d, e) => *d = e.clone(),
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Applies `OGGPCM_CONFIG__A__B=value` pairs onto the configuration tree
fn apply_overrides(config: &mut Value, vars: impl IntoIterator<Item = (String, String)>) {
    for (key, value) in vars {
        if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
            let key_path: Vec<&str> = rest.split("__").filter(|k| !k.is_empty()).collect();
            if key_path.is_empty() {
                continue;
            }
            if let Err(err) = set_value_internal(config, &key_path, convert_env_value(&value)) {
                warn!(env_var = %key, error = %err, "Ignoring configuration override");
            }
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}
