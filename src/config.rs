//! Exclusion rules for the organize scan.
//!
//! Rules load from a TOML file and decide which directory entries the scan
//! passes over. They only narrow eligibility; classification of the files
//! that remain is untouched. Because the scan never recurses, all matching
//! works on bare file names rather than paths.
//!
//! # Configuration File Format
//!
//! ```toml
//! [rules]
//! skip_hidden = true
//! ignore_names = ["Thumbs.db"]
//! ignore_extensions = ["tmp", "bak"]
//! ignore_globs = ["*.partial"]
//! ignore_regex = []
//! keep_globs = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading or compiling filter rules.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly named configuration file does not exist.
    NotFound(PathBuf),
    /// The file is not valid TOML for the expected structure.
    Invalid(String),
    /// A glob in the rules failed to compile.
    BadGlob(String),
    /// A regex in the rules failed to compile.
    BadRegex { pattern: String, reason: String },
    /// The file could not be read.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => {
                write!(f, "configuration file not found: {}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
            ConfigError::BadGlob(pattern) => write!(f, "invalid glob pattern '{}'", pattern),
            ConfigError::BadRegex { pattern, reason } => {
                write!(f, "invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::Io(msg) => write!(f, "could not read configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Filter rules as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub rules: FilterRules,
}

/// The rule set itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Skip files whose name starts with a dot. Defaults to true.
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,

    /// Exact file names to skip.
    #[serde(default)]
    pub ignore_names: Vec<String>,

    /// Extensions (without the dot) to skip, matched case-insensitively.
    #[serde(default)]
    pub ignore_extensions: Vec<String>,

    /// Glob patterns to skip.
    #[serde(default)]
    pub ignore_globs: Vec<String>,

    /// Regex patterns to skip.
    #[serde(default)]
    pub ignore_regex: Vec<String>,

    /// Globs that keep a file even when another rule would skip it.
    #[serde(default)]
    pub keep_globs: Vec<String>,
}

fn default_skip_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            skip_hidden: true,
            ignore_names: Vec::new(),
            ignore_extensions: Vec::new(),
            ignore_globs: Vec::new(),
            ignore_regex: Vec::new(),
            keep_globs: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Loads filter rules, falling back through the usual locations.
    ///
    /// 1. The explicitly provided path, if any
    /// 2. `.desktidyrc.toml` in the current directory
    /// 3. `~/.config/desktidy/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::from_file(path);
        }

        let local = PathBuf::from(".desktidyrc.toml");
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Ok(home) = std::env::var("HOME") {
            let fallback = PathBuf::from(home)
                .join(".config")
                .join("desktidy")
                .join("config.toml");
            if fallback.exists() {
                return Self::from_file(&fallback);
            }
        }

        Ok(Self::default())
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Compiles the rules into a matcher. Pattern compilation happens once
    /// here so scanning never re-parses globs or regexes.
    pub fn compile(self) -> Result<FileFilter, ConfigError> {
        FileFilter::new(self.rules)
    }
}

/// Compiled filter rules, ready for per-file matching.
pub struct FileFilter {
    skip_hidden: bool,
    ignored_names: HashSet<String>,
    ignored_extensions: HashSet<String>,
    ignored_globs: Vec<Pattern>,
    ignored_regex: Vec<Regex>,
    kept_globs: Vec<Pattern>,
}

impl FileFilter {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Pattern::new(p).map_err(|_| ConfigError::BadGlob(p.clone())))
                .collect::<Result<Vec<_>, _>>()
        };

        let ignored_globs = compile_globs(&rules.ignore_globs)?;
        let kept_globs = compile_globs(&rules.keep_globs)?;

        let ignored_regex = rules
            .ignore_regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::BadRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            ignored_names: rules.ignore_names.into_iter().collect(),
            ignored_extensions: rules
                .ignore_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            ignored_globs,
            ignored_regex,
            kept_globs,
        })
    }

    /// True when the scan should pass over this file name.
    ///
    /// `keep_globs` wins over every other rule; after that, the first
    /// matching skip rule decides.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        if self.kept_globs.iter().any(|p| p.matches(file_name)) {
            return false;
        }

        if self.skip_hidden && file_name.starts_with('.') {
            return true;
        }

        if self.ignored_names.contains(file_name) {
            return true;
        }

        if let Some((_, ext)) = file_name.rsplit_once('.')
            && self.ignored_extensions.contains(&ext.to_ascii_lowercase())
        {
            return true;
        }

        if self.ignored_globs.iter().any(|p| p.matches(file_name)) {
            return true;
        }

        self.ignored_regex.iter().any(|r| r.is_match(file_name))
    }
}
