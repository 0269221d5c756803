//! Execution options and the optional `bf.toml` settings file.
//!
//! Values are layered by the CLI: flags, then environment, then the settings
//! file, then the defaults defined here.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use cross_xdg::BaseDirs;

use crate::tape::TapeConfig;

/// Steps after which a still-running program gets a one-time advisory.
pub const DEFAULT_STEP_WARNING_THRESHOLD: u64 = 10_000_000;

/// File suffixes accepted for program sources.
pub const SOURCE_EXTENSIONS: &[&str] = &["bf", "b"];

/// Problems detected before any instruction runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: tape wrapping requires a fixed tape size")]
    WrapWithoutSize,

    #[error("Configuration error: tape size must be at least 1")]
    ZeroTapeSize,

    #[error("Configuration error: tape size {size} exceeds the addressable maximum ({max})", max = isize::MAX)]
    TapeTooLarge { size: usize },

    #[error("Configuration error: no program source given (pass code or --file)")]
    MissingSource,

    #[error("Configuration error: cannot use positional code together with --file")]
    ConflictingSource,

    #[error("Configuration error: unrecognized source file '{path}' (expected .bf or .b)")]
    UnrecognizedExtension { path: String },

    #[error("Configuration error: invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

/// Options consumed by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecConfig {
    pub tape: TapeConfig,
    /// Emit a snapshot after every step.
    pub debug: bool,
    /// `None` disables the long-run advisory.
    pub step_warning_threshold: Option<u64>,
    /// Fail with a step-limit error after this many steps.
    pub max_steps: Option<u64>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            tape: TapeConfig::unbounded(),
            debug: false,
            step_warning_threshold: Some(DEFAULT_STEP_WARNING_THRESHOLD),
            max_steps: None,
        }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tape.validate()
    }
}

/// Check that `path` carries one of the [`SOURCE_EXTENSIONS`].
pub fn check_source_path(path: &Path) -> Result<(), ConfigError> {
    let recognized = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
    if recognized {
        Ok(())
    } else {
        Err(ConfigError::UnrecognizedExtension {
            path: path.display().to_string(),
        })
    }
}

/// Values read from the `[interpreter]` section of `bf.toml`.
///
/// Every field is optional; missing keys fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// `Some(None)` means the file explicitly asked for an unbounded tape.
    pub tape_size: Option<Option<usize>>,
    pub tape_wrap: Option<bool>,
    pub debug: Option<bool>,
    pub step_warning_threshold: Option<u64>,
    pub max_steps: Option<u64>,
    pub timeout_ms: Option<u64>,
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Process-wide settings, loaded on first use.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

fn settings_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_settings() -> Option<Settings> {
    let path = settings_path()?;
    let content = fs::read_to_string(&path).ok()?;
    tracing::debug!(path = %path.display(), "loaded settings file");
    Some(parse_settings(&content))
}

/// Parse the `[interpreter]` section of a settings file.
///
/// Only flat `key = value` pairs are understood. Unknown keys are ignored and
/// malformed values are logged and skipped.
pub fn parse_settings(content: &str) -> Settings {
    let mut in_section = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = &line[1..line.len() - 1] == "interpreter";
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, raw)) = line.split_once('=') {
            let raw = raw.trim();
            let val = raw
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(raw);
            map.insert(key.trim().to_string(), val.to_string());
        }
    }

    let mut settings = Settings::default();

    if let Some(v) = map.get("tape_size") {
        if v.eq_ignore_ascii_case("unbounded") {
            settings.tape_size = Some(None);
        } else {
            settings.tape_size = parse_or_warn("tape_size", v, parse_int::<usize>).map(Some);
        }
    }

    macro_rules! set {
        ($field:ident, $parse:expr) => {
            if let Some(v) = map.get(stringify!($field)) {
                settings.$field = parse_or_warn(stringify!($field), v, $parse);
            }
        };
    }

    set!(tape_wrap, |s: &str| s.parse::<bool>().ok());
    set!(debug, |s: &str| s.parse::<bool>().ok());
    set!(step_warning_threshold, parse_int::<u64>);
    set!(max_steps, parse_int::<u64>);
    set!(timeout_ms, parse_int::<u64>);

    settings
}

/// Integers accept `_` digit separators, as in TOML.
fn parse_int<T: FromStr>(value: &str) -> Option<T> {
    if value.starts_with('_') || value.ends_with('_') || value.contains("__") {
        return None;
    }
    value.replace('_', "").parse().ok()
}

fn parse_or_warn<T>(key: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value);
    if parsed.is_none() {
        let err = ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        tracing::warn!("{err}; ignoring");
    }
    parsed
}
