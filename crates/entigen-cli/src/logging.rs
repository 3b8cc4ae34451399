// Logging and verbosity control

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::Level;

/// Global verbosity level
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Quiet mode - errors only
    Quiet = 0,
    /// Normal mode - standard output
    Normal = 1,
    /// Verbose mode - detailed output
    Verbose = 2,
}

impl VerbosityLevel {
    /// Get the current verbosity level
    pub fn current() -> Self {
        match VERBOSITY.load(Ordering::Relaxed) {
            0 => VerbosityLevel::Quiet,
            1 => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }

    /// Set the verbosity level
    pub fn set(level: Self) {
        VERBOSITY.store(level as u8, Ordering::Relaxed);
    }

    /// Check if we should output at this level
    pub fn should_output(&self) -> bool {
        self <= &Self::current()
    }

    /// Level selected by CLI flags
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Parse a `log_level` setting
pub fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Tracing level for the given flags; `--quiet` and `--verbose` win over the configured level
pub fn effective_level(verbosity: VerbosityLevel, configured: &str) -> Level {
    match verbosity {
        VerbosityLevel::Quiet => Level::ERROR,
        VerbosityLevel::Verbose => Level::DEBUG,
        VerbosityLevel::Normal => parse_level(configured),
    }
}

/// Initialize logging based on CLI flags and the configured level.
///
/// Diagnostics go to stderr so generated listings on stdout stay clean.
pub fn init_logging(verbose: bool, quiet: bool, configured: &str) {
    let verbosity = VerbosityLevel::from_flags(verbose, quiet);
    VerbosityLevel::set(verbosity);

    let level = effective_level(verbosity, configured);
    // Already installed when called twice in one process
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}
