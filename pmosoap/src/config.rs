//! # Configuration du codec SOAP
//!
//! Configuration is read from YAML:
//! - the embedded default (`pmosoap.yaml`) is always loaded first
//! - an optional external file is merged on top of it
//! - environment variables prefixed with `PMOSOAP_CONFIG__` override
//!   individual keys (`PMOSOAP_CONFIG__ENCODER__PREFIX=s`)
//!
//! ```no_run
//! use pmosoap::SoapConfig;
//! use std::path::Path;
//!
//! let config = SoapConfig::load(Some(Path::new("soap.yaml")))?;
//! println!("prefix: {}", config.encoder.prefix);
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

use std::{env, fs, path::Path};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::error::{Result, SoapError};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmosoap.yaml");

const ENV_PREFIX: &str = "PMOSOAP_CONFIG__";

const DEFAULT_PREFIX: &str = "soap";
const DEFAULT_INDENT: &str = "  ";

/// Decoder options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Reject a second `Header`, `Body` or `Fault` instead of keeping the last one.
    pub reject_duplicates: bool,
}

/// Encoder and serializer options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Namespace prefix of the synthesized SOAP elements, never empty
    pub prefix: String,
    pub write_document_declaration: bool,
    pub perform_indent: bool,
    pub indent_string: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            write_document_declaration: true,
            perform_indent: false,
            indent_string: DEFAULT_INDENT.to_string(),
        }
    }
}

impl EncoderConfig {
    pub(crate) fn emitter_config(&self) -> xmltree::EmitterConfig {
        xmltree::EmitterConfig::new()
            .write_document_declaration(self.write_document_declaration)
            .perform_indent(self.perform_indent)
            .indent_string(self.indent_string.clone())
    }
}

/// Full codec configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SoapConfig {
    pub decoder: DecoderConfig,
    pub encoder: EncoderConfig,
}

impl SoapConfig {
    /// Parses a YAML document merged over the embedded defaults.
    ///
    /// Environment overrides are not applied.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut value = embedded_defaults()?;
        merge_yaml(&mut value, serde_yaml::from_str(yaml)?);
        Self::from_value(value)
    }

    /// Loads the configuration
    ///
    /// This method:
    /// 1. Loads the default embedded configuration
    /// 2. Merges it with the external YAML file at `path`, if given and present
    /// 3. Applies environment variable overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut value = embedded_defaults()?;

        if let Some(path) = path {
            if path.exists() {
                let data = fs::read(path)?;
                info!(config_file=%path.display(), "Loaded SOAP config file");
                merge_yaml(&mut value, serde_yaml::from_slice(&data)?);
            } else {
                info!(config_file=%path.display(), "SOAP config file not found, using defaults");
            }
        }

        apply_env_overrides(&mut value, env::vars());
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        let config: SoapConfig = serde_yaml::from_value(value)?;
        let prefix = &config.encoder.prefix;
        if prefix.is_empty() || prefix.contains(':') {
            return Err(SoapError::Config(format!(
                "invalid namespace prefix: {}",
                config.encoder.prefix
            )));
        }
        Ok(config)
    }
}

fn embedded_defaults() -> Result<Value> {
    let mut value = Value::Null;
    merge_yaml(&mut value, serde_yaml::from_str(DEFAULT_CONFIG)?);
    Ok(value)
}

/// `PMOSOAP_CONFIG__ENCODER__PREFIX=s` devient `{encoder: {prefix: s}}`,
/// fusionné comme un fichier externe.
fn apply_env_overrides(config: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (key, raw) in vars {
        let Some(path) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        debug!(env_var=%key, "Applying SOAP config override");

        // valeur YAML si elle se lit comme telle, chaîne sinon
        let value = serde_yaml::from_str(&raw).unwrap_or(Value::String(raw));
        let nested = path.rsplit("__").fold(value, |inner, segment| {
            let mut map = Mapping::new();
            map.insert(Value::String(segment.to_string()), inner);
            Value::Mapping(map)
        });
        merge_yaml(config, nested);
    }
}

/// Merges `layer` into `config`, lower-casing mapping keys.
///
/// Mappings are merged key by key; other values replace the current one.
/// `Null` (an empty document or an empty override) keeps the current value.
fn merge_yaml(config: &mut Value, layer: Value) {
    match layer {
        Value::Mapping(layer) => {
            if !config.is_mapping() {
                *config = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(map) = config {
                for (key, value) in layer {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    merge_yaml(map.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        Value::Null => {}
        other => *config = other,
    }
}
