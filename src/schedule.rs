use std::time::Duration;

use crate::config::DurationUnit;

/// Number of seconds in one unit of slide time
pub fn unit_seconds(unit: DurationUnit) -> f64 {
    match unit {
        DurationUnit::Minutes => 60.0,
        DurationUnit::Seconds => 1.0,
    }
}

/// Parse a user-entered slide time ("1.5", " 10 ") into a positive number
pub fn parse_slide_time(time_str: &str) -> Result<f64, String> {
    let time: f64 = time_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid slide time '{}', expected a number", time_str))?;
    validate_slide_time(time)?;
    Ok(time)
}

/// Slide time must be a finite number greater than zero
pub fn validate_slide_time(time: f64) -> Result<(), String> {
    if !time.is_finite() || time <= 0.0 {
        return Err(format!("Slide time must be greater than 0, got {}", time));
    }
    Ok(())
}

/// Convert a slide's stored time into the wait before the next transition
pub fn slide_delay(time: f64, unit: DurationUnit) -> Result<Duration, String> {
    validate_slide_time(time)?;
    let secs = time * unit_seconds(unit);
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("Slide time {} is out of range: {}", time, e))
}

/// Total length of one full pass over the given slide times
pub fn cycle_length(times: &[f64], unit: DurationUnit) -> Result<Duration, String> {
    times.iter().try_fold(Duration::ZERO, |acc, &t| {
        let delay = slide_delay(t, unit)?;
        acc.checked_add(delay)
            .ok_or_else(|| format!("Total rotation time overflows at slide time {}", t))
    })
}
