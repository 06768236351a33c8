use std::collections::BTreeMap;

use anyhow::Result;
use camino::Utf8Path;
use shellup::config::{ProviderConfig, load_config};
use shellup::credentials::CredentialSource;

/// Credential source that never finds anything, so finalize-time
/// defaulting can be tested without touching the process environment.
#[allow(dead_code)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn get(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Credential source backed by a fixed map.
#[allow(dead_code)]
pub struct MapCredentials(BTreeMap<String, String>);

#[allow(dead_code)]
impl MapCredentials {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl CredentialSource for MapCredentials {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Writes `yaml` to a temporary file and loads it as a provider
/// configuration.
#[allow(dead_code)]
pub fn load_config_from_yaml(yaml: &str) -> Result<ProviderConfig> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shellup.yaml");
    std::fs::write(&path, yaml)?;
    let path = Utf8Path::from_path(&path).expect("temp path is valid UTF-8");
    Ok(load_config(path)?)
}
