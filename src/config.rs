//! Configuration loading for yorbox
//!
//! A [`BoxConfig`] is assembled from three layers, lowest first: the embedded
//! `defaults/yorbox.default.toml`, the TOML file given with `--config`, and the individual
//! command-line flags. The TOML keys are the [`BoxConfig`] field names.

pub mod render;

use crate::boxing::{BlockSelector, KeyMatcher, TemplateError, DEFAULT_MARKED_KEYS};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use render::TemplateVars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/yorbox.default.toml");

/// Default toggle variable name.
pub const DEFAULT_TOGGLE_NAME: &str = "yor_toggle";

/// Default box template: a ternary on the toggle variable.
pub const DEFAULT_BOX_TEMPLATE: &str =
    "(var.{{ toggleName }} ? /*<box>*/ { yor_trace = 123 } /*</box>*/ : {})";

/// Everything a boxing run is configured with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BoxConfig {
    pub toggle_name: String,
    pub box_template: String,
    /// Unset means the same as `box_template`: no migration.
    pub old_box_template: Option<String>,
    pub tags_prefix: String,
    pub marked_keys: Vec<String>,
    pub block_kinds: Vec<String>,
    pub ignored_block_kinds: BTreeSet<String>,
    pub tags_attribute: String,
    pub legacy_toggle_detection: bool,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            toggle_name: DEFAULT_TOGGLE_NAME.to_string(),
            box_template: DEFAULT_BOX_TEMPLATE.to_string(),
            old_box_template: None,
            tags_prefix: String::new(),
            marked_keys: DEFAULT_MARKED_KEYS.map(String::from).to_vec(),
            block_kinds: vec!["resource".to_string(), "module".to_string()],
            ignored_block_kinds: BTreeSet::new(),
            tags_attribute: "tags".to_string(),
            legacy_toggle_detection: true,
        }
    }
}

impl BoxConfig {
    fn vars(&self, dir: &Path) -> TemplateVars {
        TemplateVars {
            toggle_name: self.toggle_name.clone(),
            tags_prefix: self.tags_prefix.clone(),
            dir_path: dir.display().to_string(),
        }
    }

    pub fn render_box_template(&self, dir: &Path) -> Result<String, TemplateError> {
        render::render(&self.box_template, &self.vars(dir))
    }

    /// The rendered old template, or `None` when no migration is configured.
    pub fn render_old_box_template(&self, dir: &Path) -> Result<Option<String>, TemplateError> {
        match self.old_box_template.as_deref() {
            Some(old) if !old.trim().is_empty() && old != self.box_template => {
                render::render(old, &self.vars(dir)).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn key_matcher(&self) -> KeyMatcher {
        KeyMatcher::new(self.tags_prefix.clone(), self.marked_keys.iter().cloned())
    }

    pub fn block_selector(&self) -> BlockSelector {
        BlockSelector {
            kinds: self.block_kinds.iter().cloned().collect(),
            ignored: self.ignored_block_kinds.clone(),
            attribute: self.tags_attribute.clone(),
        }
    }
}

/// Builds a [`BoxConfig`] from the defaults, a `--config` file and flag overrides.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Seeded with `defaults/yorbox.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file passed with `--config`; `build` fails if it does not exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one [`BoxConfig`] field, e.g. `toggle_name` from `--toggle-name`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Override from an optional flag; `None` keeps the value of the lower layers.
    pub fn set_override_option<I>(self, key: &str, value: Option<I>) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        match value {
            Some(value) => self.set_override(key, value),
            None => Ok(self),
        }
    }

    /// Merge the layers into a [`BoxConfig`].
    pub fn build(self) -> Result<BoxConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The configuration used when no file or flag is given.
pub fn load_defaults() -> Result<BoxConfig, ConfigError> {
    Loader::new().build()
}
