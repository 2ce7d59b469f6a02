//! Configuration model, load/save, and rule-set invariants
//!
//! The on-disk format is a JSON document: top-level flags, the global default
//! animation, and the ordered rule list. Loading repairs the structural
//! invariant (exactly one Global rule, always first) instead of rejecting the
//! file; saving is atomic (temp file + rename) so a crash mid-write never
//! leaves a truncated config behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::animation::{AnimationKind, AnimationSpec};
use crate::color::normalize;
use crate::constants::{config as paths, defaults};
use crate::rules::{Rule, RuleKind};

/// Rule-set mutations that the controller boundary refuses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSetError {
    #[error("the Global rule is fixed and cannot be removed or duplicated")]
    GlobalImmutable,

    #[error("no rule at index {0}")]
    IndexOutOfRange(usize),

    #[error("a rule for process '{0}' already exists")]
    DuplicateProcess(String),
}

/// The whole application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Consumed by the (external) tray layer only
    #[serde(default)]
    pub hide_tray_icon: bool,

    /// Whether the recoloring service runs at startup
    #[serde(default)]
    pub service_enabled: bool,

    /// Global default animation, applied when a matched rule has none
    #[serde(default)]
    pub animation: AnimationSpec,

    #[serde(default)]
    pub window_rules: Vec<Rule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hide_tray_icon: false,
            service_enabled: false,
            animation: AnimationSpec::default(),
            window_rules: vec![Rule::global_default()],
        }
    }
}

impl Config {
    /// Default config file location under the user config directory.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::FILENAME);
        path
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable. The rule-set invariant is repaired either way.
    pub fn load(path: &Path) -> Config {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Config>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config file is malformed, using defaults");
                    Config::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file is unreadable, using defaults");
                Config::default()
            }
        };
        config.ensure_single_global_on_top();
        config
    }

    /// Save atomically: normalize colors, repair the invariant, write a temp
    /// file next to the target, then rename over it.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        for rule in &mut self.window_rules {
            rule.active_border_color = normalize(&rule.active_border_color);
            rule.inactive_border_color = normalize(&rule.inactive_border_color);
        }
        self.ensure_single_global_on_top();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("failed to create config directory {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(self).context("failed to serialize config")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)
            .context(format!("failed to write temp config file {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .context(format!("failed to replace config file {}", path.display()))?;
        Ok(())
    }

    /// Enforce the structural invariant: exactly one Global rule, first in
    /// evaluation order, with an empty `contains`. Extra Globals are dropped
    /// (first wins); a missing Global is synthesized with default colors.
    pub fn ensure_single_global_on_top(&mut self) {
        let mut seen_global = false;
        self.window_rules.retain(|rule| match rule.kind {
            RuleKind::Process => true,
            RuleKind::Global => !std::mem::replace(&mut seen_global, true),
        });
        match self.window_rules.iter().position(|r| r.kind == RuleKind::Global) {
            None => self.window_rules.insert(0, Rule::global_default()),
            Some(0) => {}
            Some(i) => {
                let global = self.window_rules.remove(i);
                self.window_rules.insert(0, global);
            }
        }
        self.window_rules[0].contains.clear();
    }

    /// Whether anything in this config can animate, i.e. whether the
    /// animation-rate tick is worth running at all.
    pub fn animations_configured(&self) -> bool {
        self.animation.kind != AnimationKind::None
            || self
                .window_rules
                .iter()
                .any(|r| r.animation.kind != AnimationKind::None)
    }

    // ---- Rule mutation operations (controller boundary) ----

    pub fn add_rule(&mut self, rule: Rule) {
        self.window_rules.push(rule);
        self.ensure_single_global_on_top();
    }

    /// Replace the rule at `index`. A Process rule edit that arrives with an
    /// empty `contains` keeps the old value rather than silently widening
    /// the rule.
    pub fn edit_rule(&mut self, index: usize, mut new_rule: Rule) -> Result<(), RuleSetError> {
        let old = self
            .window_rules
            .get(index)
            .ok_or(RuleSetError::IndexOutOfRange(index))?;
        if new_rule.kind == RuleKind::Process && new_rule.contains.is_empty() {
            new_rule.contains = old.contains.clone();
        }
        self.window_rules[index] = new_rule;
        self.ensure_single_global_on_top();
        Ok(())
    }

    pub fn remove_rule(&mut self, index: usize) -> Result<(), RuleSetError> {
        let rule = self
            .window_rules
            .get(index)
            .ok_or(RuleSetError::IndexOutOfRange(index))?;
        if rule.kind == RuleKind::Global {
            return Err(RuleSetError::GlobalImmutable);
        }
        self.window_rules.remove(index);
        Ok(())
    }

    pub fn duplicate_rule(&mut self, index: usize) -> Result<(), RuleSetError> {
        let rule = self
            .window_rules
            .get(index)
            .ok_or(RuleSetError::IndexOutOfRange(index))?;
        if rule.kind == RuleKind::Global {
            return Err(RuleSetError::GlobalImmutable);
        }
        let copy = rule.clone();
        self.window_rules.push(copy);
        Ok(())
    }

    /// Index of the Process rule whose `contains` equals `exe` exactly
    /// (case-insensitive), if any.
    pub fn find_process_rule(&self, exe: &str) -> Option<usize> {
        let exe = exe.trim().to_ascii_lowercase();
        self.window_rules.iter().position(|r| {
            r.kind == RuleKind::Process && r.contains.trim().to_ascii_lowercase() == exe
        })
    }

    /// Add a Process rule for `exe` with the stock colors, refusing
    /// duplicates.
    pub fn add_process_rule(&mut self, exe: &str) -> Result<(), RuleSetError> {
        let exe = exe.trim();
        if exe.is_empty() {
            return Ok(());
        }
        if self.find_process_rule(exe).is_some() {
            return Err(RuleSetError::DuplicateProcess(exe.to_string()));
        }
        self.window_rules.push(Rule::for_process(
            exe,
            defaults::PROCESS_ACTIVE_COLOR,
            defaults::PROCESS_INACTIVE_COLOR,
        ));
        Ok(())
    }
}
