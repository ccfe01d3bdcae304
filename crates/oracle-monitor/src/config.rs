use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_ANALYSIS_MODEL: &str = "us.anthropic.claude-sonnet-4-5-20250929-v1:0";
const DEFAULT_CHAT_MODEL: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";
const DEFAULT_POLL_SECS: u64 = crate::poller::DEFAULT_POLL_INTERVAL.as_secs();

/// Fields missing from the file take their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    pub config_version: u32,
    pub region: String,
    pub analysis_model_id: String,
    pub chat_model_id: String,
    pub voice_id: String,
    pub poll_interval_secs: u64,
    /// Reasoning budget for the analysis model. `None` disables it.
    pub budget_tokens: Option<u32>,
    pub credentials: CredentialSource,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            region: DEFAULT_REGION.to_string(),
            analysis_model_id: DEFAULT_ANALYSIS_MODEL.to_string(),
            chat_model_id: DEFAULT_CHAT_MODEL.to_string(),
            voice_id: oracle_speech::DEFAULT_VOICE.to_string(),
            poll_interval_secs: DEFAULT_POLL_SECS,
            budget_tokens: Some(oracle_bedrock::analysis::DEFAULT_BUDGET_TOKENS),
            credentials: CredentialSource::DefaultChain,
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialSource {
    Inline {
        access_key_id: String,
        secret_access_key: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        session_token: Option<String>,
    },
    Profile {
        profile_name: String,
    },
    DefaultChain,
}

/// Redacted config info safe to log.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub region: String,
    pub analysis_model_id: String,
    pub chat_model_id: String,
    pub voice_id: String,
    pub poll_interval_secs: u64,
    pub credential_type: String,
    pub profile_name: Option<String>,
    pub access_key_hint: Option<String>,
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("com.outbreak-oracle.monitor"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config file if there is one, fall back to defaults otherwise,
/// then apply `ORACLE_*` environment overrides.
pub fn load_config() -> eyre::Result<MonitorConfig> {
    let path = config_path()?;
    let config = if path.exists() {
        load_config_from(&path)?
    } else {
        tracing::info!(path = %path.display(), "no config file, using defaults");
        MonitorConfig::default()
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

pub fn load_config_from(path: &Path) -> eyre::Result<MonitorConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;
    parse_config(&contents)
}

/// Parse config JSON, migrating older shapes to the current version.
pub fn parse_config(contents: &str) -> eyre::Result<MonitorConfig> {
    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: MonitorConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update the monitor."
        ));
    }

    // v0 → v1: hand-written files without a version are stamped as v1
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (stamped version)");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

/// Override config values from `ORACLE_*` variables. `lookup` is
/// `std::env::var` in production.
pub fn apply_env_overrides(
    mut config: MonitorConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> MonitorConfig {
    if let Some(region) = lookup("ORACLE_REGION") {
        config.region = region;
    }
    if let Some(model) = lookup("ORACLE_ANALYSIS_MODEL") {
        config.analysis_model_id = model;
    }
    if let Some(model) = lookup("ORACLE_CHAT_MODEL") {
        config.chat_model_id = model;
    }
    if let Some(voice) = lookup("ORACLE_VOICE") {
        config.voice_id = voice;
    }
    if let Some(secs) = lookup("ORACLE_POLL_SECS") {
        match secs.parse() {
            Ok(secs) => config.poll_interval_secs = secs,
            Err(_) => tracing::warn!(value = %secs, "ignoring unparseable ORACLE_POLL_SECS"),
        }
    }
    if let Some(profile_name) = lookup("ORACLE_AWS_PROFILE") {
        config.credentials = CredentialSource::Profile { profile_name };
    }
    config
}

pub fn config_info(config: &MonitorConfig) -> ConfigInfo {
    let (credential_type, profile_name, access_key_hint) = match &config.credentials {
        CredentialSource::Inline {
            access_key_id,
            session_token,
            ..
        } => {
            let cred_type = if session_token.is_some() {
                "temporary".to_string()
            } else {
                "inline".to_string()
            };
            (cred_type, None, Some(redact_access_key(access_key_id)))
        }
        CredentialSource::Profile { profile_name } => {
            ("profile".to_string(), Some(profile_name.clone()), None)
        }
        CredentialSource::DefaultChain => ("default_chain".to_string(), None, None),
    };

    ConfigInfo {
        region: config.region.clone(),
        analysis_model_id: config.analysis_model_id.clone(),
        chat_model_id: config.chat_model_id.clone(),
        voice_id: config.voice_id.clone(),
        poll_interval_secs: config.poll_interval_secs,
        credential_type,
        profile_name,
        access_key_hint,
    }
}

fn redact_access_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    let prefix = &key[..4];
    let suffix = &key[key.len() - 4..];
    format!("{prefix}...{suffix}")
}
