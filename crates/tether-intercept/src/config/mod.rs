//! Engine configuration.
//!
//! A YAML file carries the stub defaults and, optionally, rules to install
//! when the engine starts. Rules in the file are installed in file order, so
//! later entries shadow earlier ones of the same kind.

mod defaults;
mod rules;

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::stub::StubResponse;
use crate::throttle::Throttle;

pub use defaults::StubDefaults;
pub use rules::{
    CookieBlockRuleConfig, MonitorRuleConfig, RewriteRuleConfig, StubRuleConfig,
    ThrottleRuleConfig,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub defaults: StubDefaults,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stubs: Vec<StubRuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<RewriteRuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throttles: Vec<ThrottleRuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cookie_blocks: Vec<CookieBlockRuleConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitors: Vec<MonitorRuleConfig>,
}

impl Config {
    /// Load configuration from a YAML file. Relative stub `file` paths are
    /// resolved against the directory holding the configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for stub in &mut self.stubs {
            if let Some(file) = stub.file.as_mut() {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(100..=999).contains(&self.defaults.status_code) {
            anyhow::bail!(
                "Default status code {} is outside 100..=999",
                self.defaults.status_code
            );
        }

        for (i, stub) in self.stubs.iter().enumerate() {
            stub.predicate
                .compile()
                .with_context(|| format!("stubs[{i}]: invalid match"))?;

            match &stub.file {
                Some(file) => {
                    if stub.response.body.is_some() {
                        anyhow::bail!("stubs[{i}]: 'file' and 'response.body' are mutually exclusive");
                    }
                    if !file.is_file() {
                        anyhow::bail!("stubs[{i}]: stub file {} does not exist", file.display());
                    }
                }
                None => {
                    StubResponse::from_spec(stub.response.clone(), &self.defaults)
                        .with_context(|| format!("stubs[{i}]: invalid response"))?;
                }
            }
        }

        for (i, rewrite) in self.rewrites.iter().enumerate() {
            rewrite
                .predicate
                .compile()
                .with_context(|| format!("rewrites[{i}]: invalid match"))?;
            rewrite
                .rewrite
                .validate()
                .with_context(|| format!("rewrites[{i}]: invalid rewrite"))?;
        }

        for (i, throttle) in self.throttles.iter().enumerate() {
            throttle
                .predicate
                .compile()
                .with_context(|| format!("throttles[{i}]: invalid match"))?;
            Throttle::from_secs(throttle.delay).with_context(|| format!("throttles[{i}]"))?;
        }

        for (i, block) in self.cookie_blocks.iter().enumerate() {
            block
                .predicate
                .compile()
                .with_context(|| format!("cookieBlocks[{i}]: invalid match"))?;
        }

        for (i, monitor) in self.monitors.iter().enumerate() {
            monitor
                .predicate
                .compile()
                .with_context(|| format!("monitors[{i}]: invalid match"))?;
        }

        Ok(())
    }

    /// Number of preloaded rules across all kinds.
    pub fn rule_count(&self) -> usize {
        self.stubs.len()
            + self.rewrites.len()
            + self.throttles.len()
            + self.cookie_blocks.len()
            + self.monitors.len()
    }
}
