//! Throughput accounting for a finished export.

use std::fmt;

/// Shortest duration used when computing a rate.
const MIN_ELAPSED_SECS: f64 = 0.001;

/// Rounded figures for the status line printed after each statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSummary {
    pub rows: u64,
    /// Seconds, rounded to 3 decimal places.
    pub duration: f64,
    /// Rows per second, rounded to 2 decimal places.
    pub rate: f64,
}

/// Computes the export rate, never dividing by zero.
pub fn report(rows: u64, elapsed_secs: f64) -> ThroughputSummary {
    let duration = round_to(elapsed_secs.max(0.0), 3);
    let rate = if rows == 0 {
        0.0
    } else {
        round_to(rows as f64 / elapsed_secs.max(MIN_ELAPSED_SECS), 2)
    };

    ThroughputSummary {
        rows,
        duration,
        rate,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl ThroughputSummary {
    /// The status line, including the statement that was run.
    pub fn describe(&self, sql: &str) -> String {
        format!("{} from sql '{}'", self, sql)
    }
}

impl fmt::Display for ThroughputSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exported {} rows in {:.3}s {:.2}rows/s",
            self.rows, self.duration, self.rate
        )
    }
}
