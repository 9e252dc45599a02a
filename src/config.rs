use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Command ids to register; empty registers all of them.
    #[serde(default)]
    pub enabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

fn default_max_bytes() -> u64 {
    64 * 1024 * 1024
}

const MIN_MAX_BYTES: u64 = 1024;
const MAX_MAX_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub in_place: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: ConfigProfile,

    #[serde(flatten)]
    profiles: HashMap<String, ConfigProfile>,
}

/// File-level view: every field optional so layers only override what they set.
#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    #[serde(default)]
    commands: ProfileCommands,

    #[serde(default)]
    input: ProfileInput,

    #[serde(default)]
    output: ProfileOutput,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ProfileCommands {
    enabled: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ProfileInput {
    max_bytes: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ProfileOutput {
    in_place: Option<bool>,
}

impl Config {
    pub fn load(config_path: Option<&PathBuf>, profile: Option<&String>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            tracing::debug!("Loading global config: {:?}", global_path);
            let profile_config = Self::load_from_file(&global_path, profile)?;
            config.merge(profile_config);
        }

        // 2. Load project config
        if let Some(project_path) = Self::project_config_path() {
            tracing::debug!("Loading project config: {:?}", project_path);
            let profile_config = Self::load_from_file(&project_path, profile)?;
            config.merge(profile_config);
        }

        // 3. Load custom config file
        if let Some(path) = config_path {
            tracing::debug!("Loading custom config: {:?}", path);
            let profile_config = Self::load_from_file(path, profile)?;
            config.merge(profile_config);
        }

        // 4. Environment variables override
        config.apply_env(|key| std::env::var(key).ok())?;

        // CLI flags are applied per invocation, see `runner::execute`
        config.validate()?;

        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(val) = var("TEXTFUNK_COMMANDS") {
            self.commands.enabled = val
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
                .collect();
        }

        if let Some(val) = var("TEXTFUNK_IN_PLACE") {
            self.output.in_place = parse_bool(&val).context("Invalid TEXTFUNK_IN_PLACE")?;
        }

        if let Some(val) = var("TEXTFUNK_MAX_INPUT_BYTES") {
            self.input.max_bytes = val
                .trim()
                .parse()
                .context("Invalid TEXTFUNK_MAX_INPUT_BYTES")?;
        }

        Ok(())
    }

    fn load_from_file(path: &Path, profile: Option<&String>) -> Result<ConfigProfile> {
        #[cfg(unix)]
        Self::check_permissions(path)?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse_profile(&content, profile)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn parse_profile(content: &str, profile: Option<&String>) -> Result<ConfigProfile> {
        let config_file: ConfigFile = toml::from_str(content)?;

        if let Some(profile_name) = profile {
            config_file
                .profiles
                .get(profile_name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", profile_name))
        } else {
            Ok(config_file.default)
        }
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(path)?.permissions().mode();

        if mode & 0o022 != 0 {
            tracing::warn!(
                "Config file {:?} is writable by group or others: {:o}. \
                 Recommend: chmod 644 {:?}",
                path,
                mode,
                path
            );
        }

        Ok(())
    }

    fn merge(&mut self, other: ConfigProfile) {
        if let Some(enabled) = other.commands.enabled {
            self.commands.enabled = enabled;
        }
        if let Some(max_bytes) = other.input.max_bytes {
            self.input.max_bytes = max_bytes;
        }
        if let Some(in_place) = other.output.in_place {
            self.output.in_place = in_place;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for id in &self.commands.enabled {
            id.parse::<crate::commands::Command>()
                .context("Invalid entry in commands.enabled")?;
        }

        if self.input.max_bytes < MIN_MAX_BYTES || self.input.max_bytes > MAX_MAX_BYTES {
            anyhow::bail!(
                "input.max_bytes must be between {} and {} bytes",
                MIN_MAX_BYTES,
                MAX_MAX_BYTES
            );
        }

        Ok(())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/textfunk/config.toml"))
    }

    pub fn project_config_path() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_config(&current)
    }

    fn find_project_config(start: &Path) -> Option<PathBuf> {
        let mut dir = start;

        loop {
            let candidate = dir.join(".textfunk.toml");
            if candidate.exists() {
                return Some(candidate);
            }

            let alt = dir.join(".textfunk/config.toml");
            if alt.exists() {
                return Some(alt);
            }

            dir = dir.parent()?;
        }
    }

    pub fn init_config(global: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().context("Failed to determine global config path")?
        } else {
            PathBuf::from(".textfunk.toml")
        };

        Self::write_template(&path)?;
        Ok(path)
    }

    fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists: {:?}", path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let template = r#"[default.commands]
# Restrict the registered commands; leave empty to enable all of them.
enabled = []
# enabled = ["join-lines", "trim-leading-trailing-spaces"]

[default.input]
max_bytes = 67108864

[default.output]
in_place = false

# Additional profiles
# [notes.commands]
# enabled = ["remove-consecutive-empty-lines"]
#
# [notes.output]
# in_place = true
"#;

        fs::write(path, template)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected a boolean, got '{}'", other),
    }
}
