// Copyright 2025 ScopeDB <contact@scopedb.io>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use annulus_ring::Configuration;
use annulus_ring::HashFunctionKind;
use exn::Result;
use exn::ResultExt;
use exn::bail;
use serde::Deserialize;
use serde::Serialize;
use serde::de::IntoDeserializer;
use toml_edit::DocumentMut;

use crate::Error;

const ENV_PREFIX: &str = "ANNULUS_CONFIG_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingConfig {
    #[serde(default)]
    pub variant: RingVariant,
    #[serde(default)]
    pub hash_function: HashFunctionKind,
    #[serde(default)]
    pub replica_count: u32,
}

impl RingConfig {
    pub fn build_configuration(&self) -> Configuration {
        Configuration::builder()
            .shared_hash_function(self.hash_function.build())
            .replica_count(self.replica_count)
            .build()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingVariant {
    /// Flat entries; replica positions are recomputed on removal.
    Ring,
    /// Real nodes keep the list of replicas they spawned.
    #[default]
    Cluster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub name: String,
    /// Overrides `ring.replica_count` for this node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "LogsConfig::disabled")]
    pub logs: LogsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            logs: LogsConfig::disabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<StderrAppenderConfig>,
}

impl LogsConfig {
    pub fn disabled() -> Self {
        Self { stderr: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StderrAppenderConfig {
    pub filter: String,
}

#[derive(Debug, Clone, Copy)]
enum OptionType {
    String,
    Integer,
}

impl OptionType {
    fn parse(self, name: &str, value: String) -> Result<toml_edit::Item, Error> {
        match self {
            OptionType::String => Ok(toml_edit::value(value)),
            OptionType::Integer => {
                let n = value.parse::<i64>().or_raise(|| {
                    Error(format!("failed to parse integer value {value} of key {name}"))
                })?;
                Ok(toml_edit::value(n))
            }
        }
    }
}

/// Environment variables that may override a config entry, keyed by name.
const KNOWN_OPTION_ENTRIES: &[(&str, &str, OptionType)] = &[
    ("ANNULUS_CONFIG_RING_VARIANT", "ring.variant", OptionType::String),
    ("ANNULUS_CONFIG_RING_HASH_FUNCTION", "ring.hash_function", OptionType::String),
    ("ANNULUS_CONFIG_RING_REPLICA_COUNT", "ring.replica_count", OptionType::Integer),
    (
        "ANNULUS_CONFIG_TELEMETRY_LOGS_STDERR_FILTER",
        "telemetry.logs.stderr.filter",
        OptionType::String,
    ),
];

#[derive(Debug)]
pub struct LoadConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

/// Reads `config_file` and applies `ANNULUS_CONFIG_*` overrides from the environment.
pub fn load_config(config_file: PathBuf) -> Result<LoadConfigResult, Error> {
    let content = std::fs::read_to_string(&config_file).or_raise(|| {
        Error(format!(
            "failed to read config file: {}",
            config_file.display()
        ))
    })?;
    let mut doc = DocumentMut::from_str(&content)
        .or_raise(|| Error("failed to parse config content".to_string()))?;

    let warnings = apply_env_overrides(&mut doc, std::env::vars())?;
    let config = Config::deserialize(doc.into_deserializer())
        .or_raise(|| Error("failed to deserialize config".to_string()))?;
    Ok(LoadConfigResult { config, warnings })
}

fn apply_env_overrides<I>(doc: &mut DocumentMut, vars: I) -> Result<Vec<String>, Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    let overrides = vars
        .into_iter()
        .filter(|(name, _)| name.starts_with(ENV_PREFIX))
        .collect::<BTreeMap<_, _>>();

    let mut warnings = vec![];
    for (name, value) in overrides {
        let Some((_, path, ty)) = KNOWN_OPTION_ENTRIES.iter().find(|(n, ..)| *n == name) else {
            bail!(Error(format!(
                "failed to parse unknown environment variable {name} with value {value}"
            )))
        };
        let item = ty.parse(&name, value)?;
        warnings.extend(set_toml_path(doc, &name, path, item));
    }
    Ok(warnings)
}

/// Sets the dotted `path` in `doc`, creating missing parent tables with a warning each.
fn set_toml_path(
    doc: &mut DocumentMut,
    name: &str,
    path: &str,
    value: toml_edit::Item,
) -> Vec<String> {
    let (parents, last) = path.rsplit_once('.').unwrap_or(("", path));
    let mut current = doc.as_item_mut();
    let mut warnings = vec![];
    for part in parents.split('.').filter(|part| !part.is_empty()) {
        if current.get(part).is_none() {
            warnings.push(format!(
                "[key={name}] config path '{path}' has missing parent '{part}'; created"
            ));
        }
        current = &mut current[part];
    }
    current[last] = value;
    warnings
}
