//! Logging setup for the command line

use clap::{value_parser, ArgAction, Args};
use std::io;
use std::io::{stderr, stdout, Stderr, StderrLock, Stdout, StdoutLock};
use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::{format, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Layer, Registry};

/// Sets how much is logged
#[derive(Debug, Clone, Copy, Args)]
pub struct LoggingArgs {
    /// Log more, can be used up to three times
    #[clap(short = 'v', value_parser = value_parser!(u8).range(0..=3), action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Log less, can be used twice
    #[clap(short = 'q', value_parser = value_parser!(u8).range(0..=2), action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl LoggingArgs {
    /// Gets the logging level based on whether `-v[v]` or `-q[q]` has been used
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.verbose as i8 - self.quiet as i8 {
            i8::MIN..=-2 => LevelFilter::OFF,
            -1 => LevelFilter::ERROR,
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Sends warnings and errors to stderr, everything else to stdout
struct StdioWriter {
    stdout: Stdout,
    stderr: Stderr,
}

enum StdioLock<'a> {
    Stdout(StdoutLock<'a>),
    Stderr(StderrLock<'a>),
}

impl<'a> io::Write for StdioLock<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdioLock::Stdout(stdout) => stdout.write(buf),
            StdioLock::Stderr(stderr) => stderr.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdioLock::Stdout(stdout) => stdout.flush(),
            StdioLock::Stderr(stderr) => stderr.flush(),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            StdioLock::Stdout(stdout) => stdout.write_all(buf),
            StdioLock::Stderr(stderr) => stderr.write_all(buf),
        }
    }
}

impl<'a> MakeWriter<'a> for StdioWriter {
    type Writer = StdioLock<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        StdioLock::Stdout(self.stdout.lock())
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        if meta.level() <= &Level::WARN {
            StdioLock::Stderr(self.stderr.lock())
        } else {
            StdioLock::Stdout(self.stdout.lock())
        }
    }
}

/// Installs the global subscriber
pub fn init_logging(level_filter: LevelFilter) -> eyre::Result<()> {
    let registry = Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format().with_thread_ids(true))
                .with_writer(StdioWriter {
                    stdout: stdout(),
                    stderr: stderr(),
                })
                .with_filter(level_filter),
        )
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(registry)?;

    Ok(())
}
