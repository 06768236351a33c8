//! Provider configuration model.
//!
//! A [`ProviderConfig`] holds the shell-provider settings for one deployment
//! target: credentials, image, instance type, region, timeouts, and an
//! environment map passed through to the helper binary. Configurations
//! support per-region override blocks, merging (last write wins), and a
//! one-time [`finalize`](ProviderConfig::finalize) pass that applies
//! defaults, resolves credential fallbacks, and compiles region-specific
//! child configurations.

mod setting;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::credentials::{
    ACCESS_KEY_VAR, CredentialSource, EnvCredentials, SECRET_KEY_VAR, SESSION_TOKEN_VAR,
};
use crate::error::ShellupError;

pub use setting::Setting;

/// Default `instance_ready_timeout`, in seconds.
pub const DEFAULT_INSTANCE_READY_TIMEOUT: u64 = 120;
/// Default `instance_check_interval`, in seconds.
pub const DEFAULT_INSTANCE_CHECK_INTERVAL: u64 = 2;
/// Default instance type.
pub const DEFAULT_INSTANCE_TYPE: &str = "m3.medium";
/// Default region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// A deferred mutation applied to a region-specific child configuration
/// at finalize time, in registration order.
#[derive(Clone)]
pub enum RegionOp {
    /// A partial configuration merged over the child (set fields win).
    Attributes(Box<ProviderConfig>),
    /// An arbitrary mutation applied to the child.
    Mutator(Arc<dyn Fn(&mut ProviderConfig) + Send + Sync>),
}

impl fmt::Debug for RegionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionOp::Attributes(attrs) => f.debug_tuple("Attributes").field(attrs).finish(),
            RegionOp::Mutator(_) => f.write_str("Mutator(..)"),
        }
    }
}

/// Shell-provider settings for one deployment target.
///
/// All fields start out [`Setting::Unset`]; construction never applies
/// defaults. Defaults are applied by [`finalize`](Self::finalize), which
/// also compiles per-region child configurations from the registered
/// region overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Access key credential. Falls back to the environment at finalize time.
    #[serde(default)]
    pub access_key: Setting<Option<String>>,
    /// Secret key credential. Falls back to the environment at finalize time.
    #[serde(default)]
    pub secret_key: Setting<Option<String>>,
    /// Session token credential. Falls back to the environment at finalize time.
    #[serde(default)]
    pub session_token: Setting<Option<String>>,
    /// Instance image identifier. No default; required by validation.
    #[serde(default)]
    pub image: Setting<Option<String>>,
    /// Instance type, e.g. `m3.medium`.
    #[serde(default)]
    pub instance_type: Setting<String>,
    /// Region name the machine is deployed in.
    #[serde(default)]
    pub region: Setting<String>,
    /// Availability zone within the region.
    #[serde(default)]
    pub availability_zone: Setting<Option<String>>,
    /// Endpoint URL override for the helper.
    #[serde(default)]
    pub endpoint: Setting<Option<String>>,
    /// API version override for the helper.
    #[serde(default)]
    pub version: Setting<Option<String>>,
    /// Seconds to wait for the instance to become ready.
    #[serde(default)]
    pub instance_ready_timeout: Setting<u64>,
    /// Seconds between instance state checks.
    #[serde(default)]
    pub instance_check_interval: Setting<u64>,
    /// Extra environment variables passed to the helper binary.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Region override blocks as they appear in YAML. Adopted into
    /// `region_overrides` by [`load_config`].
    #[serde(default, rename = "regions")]
    raw_regions: BTreeMap<String, ProviderConfig>,

    #[serde(skip)]
    region_overrides: BTreeMap<String, Vec<RegionOp>>,
    #[serde(skip)]
    region_configs: BTreeMap<String, ProviderConfig>,
    #[serde(skip)]
    region_specific: bool,
    #[serde(skip)]
    finalized: bool,
}

impl ProviderConfig {
    /// Creates a configuration with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base for compiled region children. Region-specific configurations
    /// never recurse into region compilation, which keeps finalize from
    /// looping on nested overrides.
    fn region_specific_base() -> Self {
        Self {
            region_specific: true,
            ..Self::default()
        }
    }

    /// Returns true once [`finalize`](Self::finalize) has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Returns true for compiled region children.
    pub fn is_region_specific(&self) -> bool {
        self.region_specific
    }

    /// Registers a partial-configuration override for `region`.
    ///
    /// Overrides are stored, not applied; they run in registration order
    /// against a fresh region-specific child at finalize time. No
    /// validation happens at call time.
    pub fn set_region_override(&mut self, region: impl Into<String>, attributes: ProviderConfig) {
        self.region_overrides
            .entry(region.into())
            .or_default()
            .push(RegionOp::Attributes(Box::new(attributes)));
    }

    /// Registers an arbitrary mutation for `region`, applied to the
    /// region-specific child after any earlier operations for that region.
    pub fn set_region_mutator(
        &mut self,
        region: impl Into<String>,
        mutator: impl Fn(&mut ProviderConfig) + Send + Sync + 'static,
    ) {
        self.region_overrides
            .entry(region.into())
            .or_default()
            .push(RegionOp::Mutator(Arc::new(mutator)));
    }

    /// Moves YAML `regions:` blocks into the override list.
    pub(crate) fn adopt_raw_regions(&mut self) {
        let raw = std::mem::take(&mut self.raw_regions);
        for (region, attributes) in raw {
            self.set_region_override(region, attributes);
        }
    }

    /// Produces a new configuration by merging `other` over `self`.
    ///
    /// Scalar fields follow last-write-wins: any field set in `other`
    /// overrides the receiver's value. The region-specific flag is OR'd.
    /// Region override lists combine per region name with the receiver's
    /// operations first. Environment maps shallow-merge, `other` winning
    /// on key collision. The result is not finalized.
    pub fn merge(&self, other: &ProviderConfig) -> ProviderConfig {
        let mut region_overrides = self.region_overrides.clone();
        for (region, ops) in &other.region_overrides {
            region_overrides
                .entry(region.clone())
                .or_default()
                .extend(ops.iter().cloned());
        }

        let mut environment = self.environment.clone();
        environment.extend(other.environment.iter().map(|(k, v)| (k.clone(), v.clone())));

        ProviderConfig {
            access_key: self.access_key.merged(&other.access_key),
            secret_key: self.secret_key.merged(&other.secret_key),
            session_token: self.session_token.merged(&other.session_token),
            image: self.image.merged(&other.image),
            instance_type: self.instance_type.merged(&other.instance_type),
            region: self.region.merged(&other.region),
            availability_zone: self.availability_zone.merged(&other.availability_zone),
            endpoint: self.endpoint.merged(&other.endpoint),
            version: self.version.merged(&other.version),
            instance_ready_timeout: self
                .instance_ready_timeout
                .merged(&other.instance_ready_timeout),
            instance_check_interval: self
                .instance_check_interval
                .merged(&other.instance_check_interval),
            environment,
            raw_regions: BTreeMap::new(),
            region_overrides,
            region_configs: BTreeMap::new(),
            region_specific: self.region_specific || other.region_specific,
            finalized: false,
        }
    }

    /// Applies defaults to unset fields and compiles region children,
    /// reading credential fallbacks from the process environment.
    pub fn finalize(&mut self) {
        self.finalize_with(&EnvCredentials);
    }

    /// Like [`finalize`](Self::finalize) with an injected credential source.
    pub fn finalize_with(&mut self, credentials: &dyn CredentialSource) {
        if self.access_key.is_unset() {
            self.access_key = Setting::Value(credentials.get(ACCESS_KEY_VAR));
        }
        if self.secret_key.is_unset() {
            self.secret_key = Setting::Value(credentials.get(SECRET_KEY_VAR));
        }
        if self.session_token.is_unset() {
            self.session_token = Setting::Value(credentials.get(SESSION_TOKEN_VAR));
        }

        self.image.set_default(None);
        self.availability_zone.set_default(None);
        self.endpoint.set_default(None);
        self.version.set_default(None);
        self.instance_ready_timeout
            .set_default(DEFAULT_INSTANCE_READY_TIMEOUT);
        self.instance_check_interval
            .set_default(DEFAULT_INSTANCE_CHECK_INTERVAL);
        self.instance_type
            .set_default(DEFAULT_INSTANCE_TYPE.to_string());
        self.region.set_default(DEFAULT_REGION.to_string());

        if !self.region_specific {
            let regions: Vec<String> = self.region_overrides.keys().cloned().collect();
            for region in regions {
                let ops = self
                    .region_overrides
                    .get(&region)
                    .cloned()
                    .unwrap_or_default();

                let mut child = Self::region_specific_base().merge(self);
                for op in &ops {
                    match op {
                        RegionOp::Attributes(attrs) => child = child.merge(attrs),
                        RegionOp::Mutator(mutator) => mutator(&mut child),
                    }
                }
                child.region = Setting::Value(region.clone());
                child.finalize_with(credentials);

                self.region_configs.insert(region, child);
            }
        }

        self.finalized = true;
    }

    /// Returns the compiled configuration for `region`.
    ///
    /// A region without a registered override inherits the top-level
    /// configuration verbatim. Calling this before finalize is a
    /// programmer error and returns [`ShellupError::Precondition`].
    pub fn get_region_config(&self, region: &str) -> Result<&ProviderConfig, ShellupError> {
        if !self.finalized {
            return Err(ShellupError::Precondition(
                "get_region_config called before finalize".to_string(),
            ));
        }
        Ok(self.region_configs.get(region).unwrap_or(self))
    }

    /// Collects validation error messages.
    ///
    /// Errors are aggregated and returned as data, never raised. The
    /// region must be non-empty; when set, the region-resolved effective
    /// configuration must carry an access key, a secret key, and an image.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let region = self.region.value().map(String::as_str).unwrap_or("");
        if region.is_empty() {
            errors.push("region is required".to_string());
            return errors;
        }

        let effective = self.region_configs.get(region).unwrap_or(self);
        if effective.access_key.as_option().is_none() {
            errors.push("access_key is required".to_string());
        }
        if effective.secret_key.as_option().is_none() {
            errors.push("secret_key is required".to_string());
        }
        if effective.image.as_option().is_none() {
            errors.push(format!("image is required for region {}", region));
        }

        errors
    }

    /// Finalized region name. Falls back to the default region when the
    /// field was somehow left unset.
    pub fn region_name(&self) -> &str {
        self.region.value().map(String::as_str).unwrap_or(DEFAULT_REGION)
    }

    /// Finalized instance-ready timeout, in seconds.
    pub fn ready_timeout_secs(&self) -> u64 {
        self.instance_ready_timeout
            .value()
            .copied()
            .unwrap_or(DEFAULT_INSTANCE_READY_TIMEOUT)
    }

    /// Finalized instance check interval, in seconds.
    pub fn check_interval_secs(&self) -> u64 {
        self.instance_check_interval
            .value()
            .copied()
            .unwrap_or(DEFAULT_INSTANCE_CHECK_INTERVAL)
    }
}

/// Loads a provider configuration from a YAML file.
///
/// Region blocks under a `regions:` key are registered as attribute
/// overrides. The returned configuration is not finalized.
pub fn load_config(path: &Utf8Path) -> Result<ProviderConfig, ShellupError> {
    let file = File::open(path).map_err(|e| ShellupError::io(path.to_string(), e))?;
    let reader = BufReader::new(file);
    let mut config: ProviderConfig = serde_yaml::from_reader(reader)
        .map_err(|e| ShellupError::Config(format!("failed to parse yaml: {}: {}", path, e)))?;
    config.adopt_raw_regions();
    Ok(config)
}
