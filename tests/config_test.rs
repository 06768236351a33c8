mod helpers;

use helpers::{MapCredentials, NoCredentials, load_config_from_yaml};
use shellup::ShellupError;
use shellup::config::{
    DEFAULT_INSTANCE_CHECK_INTERVAL, DEFAULT_INSTANCE_READY_TIMEOUT, DEFAULT_INSTANCE_TYPE,
    DEFAULT_REGION, ProviderConfig, Setting,
};
use shellup::credentials::{ACCESS_KEY_VAR, SECRET_KEY_VAR, SESSION_TOKEN_VAR};

fn set(value: &str) -> Setting<Option<String>> {
    Setting::Value(Some(value.to_string()))
}

#[test]
fn test_merge_last_write_wins() {
    let mut first = ProviderConfig::new();
    first.region = Setting::Value("us-west-1".to_string());
    first.instance_type = Setting::Value("t2.micro".to_string());

    let mut second = ProviderConfig::new();
    second.region = Setting::Value("eu-west-1".to_string());

    let merged = first.merge(&second);
    assert_eq!(merged.region, Setting::Value("eu-west-1".to_string()));
    // Unset in the second keeps the first's value.
    assert_eq!(merged.instance_type, Setting::Value("t2.micro".to_string()));
}

#[test]
fn test_merge_environment_shallow_other_wins() {
    let mut first = ProviderConfig::new();
    first.environment.insert("SHARED".to_string(), "first".to_string());
    first.environment.insert("ONLY_FIRST".to_string(), "1".to_string());

    let mut second = ProviderConfig::new();
    second.environment.insert("SHARED".to_string(), "second".to_string());

    let merged = first.merge(&second);
    assert_eq!(merged.environment.get("SHARED").map(String::as_str), Some("second"));
    assert_eq!(merged.environment.get("ONLY_FIRST").map(String::as_str), Some("1"));
}

#[test]
fn test_merge_preserves_region_override_order() {
    // Both configurations register a mutator for the same region writing
    // the same key. The receiver's operation must run first, so the
    // second configuration's value wins.
    let mut first = ProviderConfig::new();
    first.set_region_mutator("us-west-2", |c| {
        c.environment.insert("ORDER".to_string(), "first".to_string());
        c.environment.insert("FIRST_RAN".to_string(), "1".to_string());
    });

    let mut second = ProviderConfig::new();
    second.set_region_mutator("us-west-2", |c| {
        c.environment.insert("ORDER".to_string(), "second".to_string());
    });

    let mut merged = first.merge(&second);
    merged.finalize_with(&NoCredentials);

    let child = merged.get_region_config("us-west-2").unwrap();
    assert_eq!(child.environment.get("FIRST_RAN").map(String::as_str), Some("1"));
    assert_eq!(child.environment.get("ORDER").map(String::as_str), Some("second"));
}

#[test]
fn test_merge_attribute_overrides_concatenate() {
    let mut first = ProviderConfig::new();
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-first");
    first.set_region_override("us-west-2", attrs);

    let mut second = ProviderConfig::new();
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-second");
    second.set_region_override("us-west-2", attrs);

    let mut merged = first.merge(&second);
    merged.finalize_with(&NoCredentials);

    let child = merged.get_region_config("us-west-2").unwrap();
    assert_eq!(child.image, set("ami-second"));
}

#[test]
fn test_finalize_defaults() {
    let mut config = ProviderConfig::new();
    config.finalize_with(&NoCredentials);

    assert_eq!(config.ready_timeout_secs(), DEFAULT_INSTANCE_READY_TIMEOUT);
    assert_eq!(config.check_interval_secs(), DEFAULT_INSTANCE_CHECK_INTERVAL);
    assert_eq!(config.instance_type, Setting::Value(DEFAULT_INSTANCE_TYPE.to_string()));
    assert_eq!(config.region, Setting::Value(DEFAULT_REGION.to_string()));
    // No sensible default for an image: explicitly absent after finalize.
    assert_eq!(config.image, Setting::Value(None));
    assert_eq!(config.access_key, Setting::Value(None));
    assert!(config.is_finalized());
}

#[test]
fn test_finalize_reads_credentials_from_source() {
    let credentials = MapCredentials::new([
        (ACCESS_KEY_VAR, "AKIA123"),
        (SECRET_KEY_VAR, "secret"),
        (SESSION_TOKEN_VAR, "token"),
    ]);

    let mut config = ProviderConfig::new();
    config.finalize_with(&credentials);

    assert_eq!(config.access_key, set("AKIA123"));
    assert_eq!(config.secret_key, set("secret"));
    assert_eq!(config.session_token, set("token"));
}

#[test]
fn test_finalize_keeps_explicit_credentials() {
    let credentials = MapCredentials::new([(ACCESS_KEY_VAR, "from-env")]);

    let mut config = ProviderConfig::new();
    config.access_key = set("explicit");
    config.finalize_with(&credentials);

    assert_eq!(config.access_key, set("explicit"));
}

#[test]
fn test_get_region_config_before_finalize_fails() {
    let mut config = ProviderConfig::new();
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-1");
    config.set_region_override("us-west-2", attrs);

    // Registered and never-registered regions alike fail before finalize.
    for region in ["us-west-2", "ap-southeast-1"] {
        let err = config.get_region_config(region).unwrap_err();
        assert!(matches!(err, ShellupError::Precondition(_)), "unexpected error: {err}");
    }
}

#[test]
fn test_region_override_compiles_child() {
    let mut config = ProviderConfig::new();
    config.instance_type = Setting::Value("c3.large".to_string());
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-west");
    config.set_region_override("us-west-2", attrs);
    config.finalize_with(&NoCredentials);

    let child = config.get_region_config("us-west-2").unwrap();
    assert_eq!(child.image, set("ami-west"));
    // The child's region is forced to the override's name.
    assert_eq!(child.region_name(), "us-west-2");
    assert!(child.is_region_specific());
    assert!(child.is_finalized());
    // Fields not overridden inherit the top-level value.
    assert_eq!(child.instance_type, Setting::Value("c3.large".to_string()));
}

#[test]
fn test_unregistered_region_inherits_top_level() {
    let mut config = ProviderConfig::new();
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-west");
    config.set_region_override("us-west-2", attrs);
    config.finalize_with(&NoCredentials);

    let inherited = config.get_region_config("us-east-1").unwrap();
    assert_eq!(inherited.image, Setting::Value(None));
    assert_eq!(inherited.region_name(), DEFAULT_REGION);
    assert!(!inherited.is_region_specific());
}

#[test]
fn test_validate_region_unset() {
    let config = ProviderConfig::new();
    let errors = config.validate();
    assert_eq!(errors, vec!["region is required".to_string()]);
}

#[test]
fn test_validate_reports_missing_fields_with_region() {
    let mut config = ProviderConfig::new();
    config.region = Setting::Value("eu-west-1".to_string());

    let errors = config.validate();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().any(|e| e == "access_key is required"));
    assert!(errors.iter().any(|e| e == "secret_key is required"));
    assert!(errors.iter().any(|e| e == "image is required for region eu-west-1"));
}

#[test]
fn test_validate_resolves_region_config() {
    let mut config = ProviderConfig::new();
    config.region = Setting::Value("us-west-2".to_string());
    config.access_key = set("AKIA123");
    config.secret_key = set("secret");
    let mut attrs = ProviderConfig::new();
    attrs.image = set("ami-west");
    config.set_region_override("us-west-2", attrs);
    config.finalize_with(&NoCredentials);

    // The image only exists in the compiled region child.
    assert!(config.validate().is_empty());
}

#[test]
fn test_yaml_missing_keys_stay_unset() -> anyhow::Result<()> {
    let config = load_config_from_yaml("---\nregion: eu-central-1\n")?;
    assert_eq!(config.region, Setting::Value("eu-central-1".to_string()));
    assert!(config.image.is_unset());
    assert!(config.instance_ready_timeout.is_unset());
    assert!(config.environment.is_empty());
    Ok(())
}

#[test]
fn test_yaml_null_is_explicit_absence() -> anyhow::Result<()> {
    let config = load_config_from_yaml("---\nimage: null\n")?;
    assert_eq!(config.image, Setting::Value(None));
    assert!(config.image.is_set());
    Ok(())
}

#[test]
fn test_yaml_region_blocks_become_overrides() -> anyhow::Result<()> {
    let mut config = load_config_from_yaml(
        r#"---
region: us-west-2
access_key: AKIA123
secret_key: secret
instance_ready_timeout: 300
regions:
  us-west-2:
    image: ami-west
    instance_type: m4.large
"#,
    )?;
    config.finalize_with(&NoCredentials);

    let child = config.get_region_config("us-west-2")?;
    assert_eq!(child.image, set("ami-west"));
    assert_eq!(child.instance_type, Setting::Value("m4.large".to_string()));
    // Scalar settings inherit into the region child.
    assert_eq!(child.ready_timeout_secs(), 300);
    assert_eq!(child.access_key, set("AKIA123"));
    Ok(())
}

#[test]
fn test_load_config_missing_file() {
    let path = camino::Utf8PathBuf::from("/non/existent/shellup.yaml");
    let err = shellup::config::load_config(path.as_path()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("I/O error"), "expected I/O error, got: {msg}");
    assert!(msg.contains("not found"), "expected not found, got: {msg}");
}

#[test]
fn test_load_config_invalid_yaml() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("shellup.yaml");
    std::fs::write(&path, "region: [unclosed")?;
    let path = camino::Utf8Path::from_path(&path).expect("temp path is valid UTF-8");

    let err = shellup::config::load_config(path).unwrap_err();
    assert!(matches!(err, ShellupError::Config(_)), "unexpected error: {err}");
    Ok(())
}
