// file: src/utils/logging.rs
// description: tracing setup for the CLI and server, plus colored status lines for terminal output

use crate::pipeline::IndexStats;
use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset: our crate and request traces at the
/// chosen level, dependencies only when they warn.
pub fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("warn,{}={level},tower_http={level}", env!("CARGO_CRATE_NAME"))
}

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag.
///
/// `colored_output = false` also strips color from the `format_*` helpers,
/// so piped CLI output stays plain.
pub fn init_logger(colored_output: bool, verbose: bool) {
    if !colored_output {
        colored::control::set_override(false);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let fmt_layer = fmt::layer()
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    // a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

/// One-line summary of an indexing run into `index`.
pub fn format_index_summary(index: &str, stats: &IndexStats) -> String {
    let line = format!(
        "Indexed {} documents into '{}' ({} skipped, {} iterated) in {:.2}s, {:.1} docs/sec, {:.1}% indexed",
        stats.processed,
        index,
        stats.skipped,
        stats.total_attempted,
        stats.duration_secs,
        stats.docs_per_second(),
        stats.success_rate()
    );

    if stats.skipped == 0 {
        format_success(&line)
    } else {
        format_warning(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_the_crate() {
        assert_eq!(default_directives(false), "warn,esempeha=info,tower_http=info");
        assert_eq!(default_directives(true), "warn,esempeha=debug,tower_http=debug");
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
    }

    #[test]
    fn test_index_summary_line() {
        colored::control::set_override(false);

        let clean = IndexStats {
            processed: 4,
            total_attempted: 4,
            duration_secs: 2.0,
            ..IndexStats::default()
        };
        assert_eq!(
            format_index_summary("scifact", &clean),
            "✓ Indexed 4 documents into 'scifact' (0 skipped, 4 iterated) in 2.00s, 2.0 docs/sec, 100.0% indexed"
        );

        let lossy = IndexStats {
            processed: 3,
            skipped: 1,
            total_attempted: 4,
            duration_secs: 0.0,
            ..IndexStats::default()
        };
        assert!(format_index_summary("scifact", &lossy).starts_with("⚠ Indexed 3 documents"));
    }
}
