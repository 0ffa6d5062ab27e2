// src/config/validate.rs

use crate::config::model::{BenchConfig, RawBenchConfig};
use crate::errors::{DepQueueError, Result};

impl TryFrom<RawBenchConfig> for BenchConfig {
    type Error = DepQueueError;

    fn try_from(raw: RawBenchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(BenchConfig::new_unchecked(raw.suite, raw.workload))
    }
}

fn validate_raw_config(cfg: &RawBenchConfig) -> Result<()> {
    ensure_has_workloads(cfg)?;
    validate_suite(cfg)?;
    validate_workloads(cfg)?;
    Ok(())
}

fn ensure_has_workloads(cfg: &RawBenchConfig) -> Result<()> {
    if cfg.workload.is_empty() {
        return Err(DepQueueError::ConfigError(
            "config must contain at least one [workload.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_suite(cfg: &RawBenchConfig) -> Result<()> {
    let suite = &cfg.suite;

    for (field, value) in [
        ("steps", suite.steps),
        ("repetitions", suite.repetitions),
        ("base_size", suite.base_size),
    ] {
        if value == 0 {
            return Err(DepQueueError::ConfigError(format!(
                "[suite].{field} must be >= 1 (got 0)"
            )));
        }
    }

    Ok(())
}

fn validate_workloads(cfg: &RawBenchConfig) -> Result<()> {
    for (name, workload) in cfg.workload.iter() {
        if workload.scale == 0 {
            return Err(DepQueueError::ConfigError(format!(
                "workload '{name}' has scale = 0; it must be >= 1"
            )));
        }
        // The last step is the largest; if it fits, every step does.
        step_size(cfg.suite.base_size, cfg.suite.steps, workload.scale).ok_or_else(|| {
            DepQueueError::ConfigError(format!(
                "workload '{name}': base_size * steps * scale overflows usize"
            ))
        })?;
    }
    Ok(())
}

/// Task count of step `step`, or `None` if it does not fit in `usize`.
pub fn step_size(base_size: usize, step: usize, scale: usize) -> Option<usize> {
    base_size.checked_mul(step)?.checked_mul(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> RawBenchConfig {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn defaults_fill_missing_suite() {
        let cfg = BenchConfig::try_from(parse(
            r#"
            [workload.w]
            kind = "fan_in"
            "#,
        ))
        .unwrap();

        assert_eq!(cfg.suite.steps, 5);
        assert_eq!(cfg.suite.repetitions, 3);
        assert_eq!(cfg.workload["w"].scale, 1);
    }

    #[test]
    fn rejects_empty_workload_list() {
        let err = BenchConfig::try_from(parse("[suite]\nsteps = 2\n")).unwrap_err();
        assert!(matches!(err, DepQueueError::ConfigError(_)));
    }

    #[test]
    fn rejects_zero_repetitions() {
        let err = BenchConfig::try_from(parse(
            r#"
            [suite]
            repetitions = 0

            [workload.w]
            kind = "chain"
            "#,
        ))
        .unwrap_err();

        assert!(err.to_string().contains("repetitions"));
    }

    #[test]
    fn rejects_sizes_that_overflow() {
        let err = BenchConfig::try_from(parse(&format!(
            r#"
            [suite]
            steps = 4
            base_size = {}

            [workload.w]
            kind = "independent"
            scale = 2
            "#,
            usize::MAX / 4
        )))
        .unwrap_err();

        assert!(matches!(err, DepQueueError::ConfigError(_)));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn step_size_is_checked() {
        assert_eq!(step_size(64, 3, 2), Some(384));
        assert_eq!(step_size(usize::MAX, 2, 1), None);
        assert_eq!(step_size(2, 2, usize::MAX), None);
    }

    #[test]
    fn rejects_zero_scale() {
        let err = BenchConfig::try_from(parse(
            r#"
            [workload.w]
            kind = "layered"
            scale = 0
            "#,
        ))
        .unwrap_err();

        assert!(err.to_string().contains("scale"));
    }
}
