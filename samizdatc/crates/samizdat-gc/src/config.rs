//! Collector tuning parameters.
//!
//! Trimmed from the teacher's region/NUMA/TLAB-tuning `GcConfig` down to
//! the handful of knobs a single-threaded stop-the-world mark-sweep
//! collector actually reads (spec 4.1, 4.2's "maximum immortals" /
//! "maximum stack depth" fatal conditions).

#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Number of allocations between collections. A collection runs once
    /// the allocation counter exceeds this (spec 4.1: "triggered by an
    /// allocation counter exceeding a threshold").
    pub alloc_trip_threshold: usize,

    /// Initial capacity reserved for the immortals root set.
    pub initial_immortals_capacity: usize,

    /// Initial capacity reserved for the thread-local root (value) stack.
    pub initial_stack_capacity: usize,

    /// Hard cap on immortals. Exceeding it is a fatal resource-exhaustion
    /// error (spec 4.1's failure model).
    pub max_immortals: usize,

    /// Hard cap on root-stack depth. Exceeding it is fatal.
    pub max_stack_depth: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            alloc_trip_threshold: 10_000,
            initial_immortals_capacity: 256,
            initial_stack_capacity: 4096,
            max_immortals: 1 << 20,
            max_stack_depth: 1 << 20,
        }
    }
}

impl GcConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.alloc_trip_threshold == 0 {
            return Err(crate::error::GcError::Corruption {
                operation: "config validation".into(),
                reason: "alloc_trip_threshold must be nonzero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(GcConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_threshold_rejected() {
        let mut config = GcConfig::default();
        config.alloc_trip_threshold = 0;
        assert!(config.validate().is_err());
    }
}
