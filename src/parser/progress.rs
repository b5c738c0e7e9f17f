use crate::errors::{AppError, AppResult};
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// Per-run counters shown on the progress line
pub trait ProgressMetrics {
    /// e.g. "Blocks: 100 | Txes: 2304"
    fn format_metrics(&self) -> String;
}

/// Throttled in-place progress line for long-running loops
pub struct ProgressTracker {
    operation: String,
    start_time: Instant,
    last_report: Instant,
    report_interval_ms: u128,
    total_estimate: Option<usize>,
}

impl ProgressTracker {
    pub fn start(operation: &str, total_estimate: Option<usize>) -> Self {
        let now = Instant::now();
        info!("=== {} started ===", operation);
        Self {
            operation: operation.to_string(),
            start_time: now,
            last_report: now,
            report_interval_ms: 500,
            total_estimate,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Print the progress line if the report interval has passed
    pub fn update<M: ProgressMetrics>(&mut self, processed: usize, metrics: &M) -> AppResult<()> {
        if self.last_report.elapsed().as_millis() <= self.report_interval_ms {
            return Ok(());
        }
        self.last_report = Instant::now();

        let line = format_progress_line(
            processed,
            self.total_estimate,
            self.elapsed_seconds(),
            &metrics.format_metrics(),
        );
        print!("\r{}", line);
        std::io::stdout().flush().map_err(AppError::Io)?;
        Ok(())
    }

    /// End the in-place line and log a summary
    pub fn finish<M: ProgressMetrics>(self, processed: usize, metrics: &M) {
        println!();
        let elapsed = self.elapsed_seconds();
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };
        info!("=== {} completed ===", self.operation);
        info!("  Total processed: {}", processed);
        info!("  {}", metrics.format_metrics());
        info!("  Time elapsed: {}", format_elapsed_time(elapsed));
        info!("  Average rate: {:.1} items/sec", rate);
    }
}

pub fn format_progress_line(
    processed: usize,
    total_estimate: Option<usize>,
    elapsed_secs: f64,
    metrics: &str,
) -> String {
    let rate = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    let pct = match total_estimate {
        Some(total) if total > 0 => format!(" ({:.1}%)", processed as f64 / total as f64 * 100.0),
        _ => String::new(),
    };
    format!(
        "Processed: {}{} | Rate: {:.1}/sec | Elapsed: {} | {}",
        processed,
        pct,
        rate,
        format_elapsed_time(elapsed_secs),
        metrics
    )
}

/// Human-readable duration: "5.5s", "1m 30s (90.0s)", "1h 0m 0s (3600.0s)", "1d 0h 0m 0s (86400.0s)"
pub fn format_elapsed_time(elapsed_secs: f64) -> String {
    if elapsed_secs < 60.0 {
        return format!("{:.1}s", elapsed_secs);
    }

    let days = (elapsed_secs / 86400.0).floor();
    let hours = ((elapsed_secs % 86400.0) / 3600.0).floor();
    let minutes = ((elapsed_secs % 3600.0) / 60.0).floor();
    let seconds = elapsed_secs % 60.0;

    if elapsed_secs < 3600.0 {
        format!("{}m {:.0}s ({:.1}s)", minutes, seconds, elapsed_secs)
    } else if elapsed_secs < 86400.0 {
        format!(
            "{}h {}m {:.0}s ({:.1}s)",
            hours, minutes, seconds, elapsed_secs
        )
    } else {
        format!(
            "{}d {}h {}m {:.0}s ({:.1}s)",
            days, hours, minutes, seconds, elapsed_secs
        )
    }
}
