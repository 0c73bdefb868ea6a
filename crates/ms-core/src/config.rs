//! Kernel configuration.
//!
//! Typically built in code by model setup, or (with the `serde` feature)
//! loaded from a TOML document by the application crate and handed to
//! `ms_sim::EnvironmentBuilder`.

use crate::{CoreError, CoreResult};

// ── FailurePolicy ─────────────────────────────────────────────────────────────

/// What an agent does when one of its rules reports an error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailurePolicy {
    /// Log the failure, record it in the agent's diagnostics buffer, and
    /// treat the control mode as completed.
    #[default]
    Continue,
    /// Stop the agent's current execution and return the error to the caller.
    Halt,
}

// ── KernelConfig ──────────────────────────────────────────────────────────────

/// Top-level kernel configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KernelConfig {
    /// Simulated time after which `Environment::execute` stops.
    pub final_time: f64,

    /// Master RNG seed.  The same seed always produces identical model setup.
    pub seed: u64,

    /// Maximum number of consecutive jumps a `GlobalAgent` may chain within
    /// one event before the chain is reported as an error.
    pub max_jump_chain: usize,

    /// How agents react to rule failures.
    pub failure_policy: FailurePolicy,
}

impl KernelConfig {
    pub const DEFAULT_MAX_JUMP_CHAIN: usize = 1_000;

    /// A default configuration that stops at `final_time`.
    pub fn with_final_time(final_time: f64) -> Self {
        Self { final_time, ..Self::default() }
    }

    /// Parse a configuration from a TOML document.  Missing keys take their
    /// default values.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(src: &str) -> CoreResult<Self> {
        let config: KernelConfig =
            toml::from_str(src).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the kernel cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.final_time.is_nan() {
            return Err(CoreError::Config("final_time must not be NaN".into()));
        }
        if self.max_jump_chain == 0 {
            return Err(CoreError::Config(
                "max_jump_chain must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            final_time:     f64::INFINITY,
            seed:           0,
            max_jump_chain: Self::DEFAULT_MAX_JUMP_CHAIN,
            failure_policy: FailurePolicy::Continue,
        }
    }
}
