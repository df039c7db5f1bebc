use std::{sync::OnceLock, thread};

use anyhow::{anyhow, Result};
use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};
use regex::Regex;
use textwrap::{termwidth, Options};

/// The running logger. Dropping the handle would flush and stop logging, so
/// it lives for the rest of the process once setup() succeeds.
static LOGGER_HANDLE: OnceLock<LoggerHandle> = OnceLock::new();

/// The outcome of the first setup() call, replayed to every later caller.
static SETUP_OUTCOME: OnceLock<Result<(), String>> = OnceLock::new();

/// Matches the final wrapped line of a record so it can be capped with a
/// closing delimiter.
static LAST_LINE_MATCHER: OnceLock<Regex> = OnceLock::new();

/// Setup console logging for binaries which use the pacer.
///
/// Only the first call configures the logger. Later calls return the same
/// result, so a failed setup keeps failing instead of silently running
/// without a logger.
pub fn setup() -> Result<()> {
    SETUP_OUTCOME
        .get_or_init(|| start_logger().map_err(|error| format!("{:#}", error)))
        .clone()
        .map_err(|message| anyhow!("unable to start the logger: {}", message))
}

fn start_logger() -> Result<()> {
    let handle = Logger::try_with_env_or_str("info")?
        .format(multiline_format)
        .start()?;
    let _ = LOGGER_HANDLE.set(handle);

    log::info!(
        "Adjust the log level by setting RUST_LOG. By default RUST_LOG=info"
    );

    Ok(())
}

fn last_line_matcher() -> &'static Regex {
    LAST_LINE_MATCHER.get_or_init(|| {
        Regex::new(r"(?s)(.*\n)┃(.*)$").expect("the delimiter regex is valid")
    })
}

/// A multiline log format for flexi_logger.
///
/// The header names the thread which logged, so timekeeper records are easy
/// to tell apart from the caller's loop. Records are wrapped at terminal
/// width and framed with `┏`, `┃` and `┗`.
pub fn multiline_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let current = thread::current();
    let header = format!(
        "{} [{}] [{}] {}:{}",
        record.level(),
        now.now().format("%H:%M:%S%.6f"),
        current.name().unwrap_or("<unnamed>"),
        record.target(),
        record.line().unwrap_or(0),
    );
    let body = record.args().to_string();

    writeln!(w, "{}", frame_record(&header, &body, termwidth().min(74)))
}

/// Wrap a header and body to `width` columns and frame the lines.
fn frame_record(header: &str, body: &str, width: usize) -> String {
    let options = Options::new(width)
        .initial_indent("┏ ")
        .subsequent_indent("┃ ");
    let wrapped = textwrap::fill(&format!("{}\n{}", header, body), options);
    cap_last_line(&wrapped)
}

/// Replace the continuation marker on the last line of a wrapped record with
/// a closing marker.
fn cap_last_line(wrapped: &str) -> String {
    last_line_matcher().replace(wrapped, "$1┗$2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_only_the_final_continuation_line() {
        let wrapped = "┏ INFO [00:00:00] [a.rs:1]\n┃ first\n┃ second";
        assert_eq!(
            cap_last_line(wrapped),
            "┏ INFO [00:00:00] [a.rs:1]\n┃ first\n┗ second"
        );
    }

    #[test]
    fn single_line_records_are_untouched() {
        let wrapped = "┏ INFO [00:00:00] [a.rs:1]";
        assert_eq!(cap_last_line(wrapped), wrapped);
    }

    #[test]
    fn short_records_open_and_close() {
        assert_eq!(
            frame_record("DEBUG [t] [main] hertz:1", "resynchronizing", 74),
            "┏ DEBUG [t] [main] hertz:1\n┗ resynchronizing"
        );
    }

    #[test]
    fn long_bodies_wrap_between_the_markers() {
        let framed = frame_record("INFO [t] [main] hertz:1", "one two three", 9);
        let lines: Vec<&str> = framed.lines().collect();
        assert!(lines[0].starts_with("┏ "));
        assert!(lines.len() > 2, "{:?}", lines);
        for line in &lines[1..lines.len() - 1] {
            assert!(line.starts_with("┃ "), "{:?}", line);
        }
        assert!(lines[lines.len() - 1].starts_with("┗ "));
    }

    #[test]
    fn repeated_setup_reports_the_first_outcome() {
        let first = setup().map_err(|error| error.to_string());
        let second = setup().map_err(|error| error.to_string());
        assert_eq!(first, second);
    }
}
