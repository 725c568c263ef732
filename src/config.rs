//! Centralized configuration for the harness.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - HarnessConfig::from_env() reads the SG_* variables; builder-style
//!   setters for embedding code that configures explicitly.
//!
//! The snapshot size cap bounds the non-preemptible copy window inside
//! take/rollback: the copy runs inside the region's exclusive section, so
//! hard-real-time deployments size the cap to their latency budget.

/// Top-level configuration for the harness.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Upper bound for a single snapshot payload in bytes (0 = uncapped).
    /// Env: SG_MAX_SNAPSHOT_BYTES (default 16 MiB)
    pub max_snapshot_bytes: usize,

    /// Default iteration budget for LoopContext::with_default_limit.
    /// Env: SG_DEFAULT_LOOP_LIMIT (default 1_000_000)
    pub default_loop_limit: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_snapshot_bytes: 16 * 1024 * 1024,
            default_loop_limit: 1_000_000,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables. Unset or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SG_MAX_SNAPSHOT_BYTES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.max_snapshot_bytes = n;
            }
        }

        if let Ok(v) = std::env::var("SG_DEFAULT_LOOP_LIMIT") {
            if let Ok(n) = v.trim().parse::<u32>() {
                cfg.default_loop_limit = n;
            }
        }

        cfg
    }

    /// Builder-style: snapshot payload cap in bytes (0 = uncapped).
    pub fn with_max_snapshot_bytes(mut self, n: usize) -> Self {
        self.max_snapshot_bytes = n;
        self
    }

    /// Builder-style: default loop iteration budget.
    pub fn with_default_loop_limit(mut self, n: u32) -> Self {
        self.default_loop_limit = n;
        self
    }
}
