//! Configuration validation.
//!
//! Checks numeric ranges and collects every error into a single
//! `ConfigError`.

use simplepay_common::ConfigError;

use crate::schema::CheckoutConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &CheckoutConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(&mut errors, "timing.settle_ms", config.timing.settle_ms, 0, 5000);
    validate_range(
        &mut errors,
        "timing.loader_fade_delay_ms",
        config.timing.loader_fade_delay_ms,
        0,
        5000,
    );
    validate_range(
        &mut errors,
        "timing.loader_hide_delay_ms",
        config.timing.loader_hide_delay_ms,
        0,
        5000,
    );
    validate_range_f64(
        &mut errors,
        "gesture.dismiss_threshold",
        config.gesture.dismiss_threshold,
        0.01,
        1.0,
    );
    validate_range_f64(
        &mut errors,
        "layout.compact_max_width",
        config.layout.compact_max_width,
        0.0,
        4096.0,
    );
    if config.text.cancel_prompt.trim().is_empty() {
        errors.push("text.cancel_prompt must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

fn validate_range_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    // NaN fails both comparisons, so check it explicitly.
    if value.is_nan() || value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
