//! Check command
//!
//! Usage: restartcheck <FILE_PATTERN> <BASELINE_PATTERN> [-r REL] [-a ABS]
//!        [-e REGEX]... [-m] [-w] [-j N] [--log-format human|json]

use clap::{Args, ValueEnum};
use restartcheck_core::config::{ComparisonConfig, ExclusionSet, Tolerance};
use restartcheck_core::config::{ATOL_DEFAULT, RTOL_DEFAULT};
use restartcheck_core::logging_facility::{init, Profile};
use restartcheck_engine::{check, CheckOptions};

/// Log output format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Pattern of the file to compare; the basename is a regular expression
    pub file_pattern: String,

    /// Pattern of the baseline file; the basename is a regular expression
    pub baseline_pattern: String,

    /// Relative tolerance
    #[arg(short = 'r', long, default_value_t = RTOL_DEFAULT, allow_negative_numbers = true)]
    pub relative: f64,

    /// Absolute tolerance
    #[arg(short = 'a', long, default_value_t = ATOL_DEFAULT, allow_negative_numbers = true)]
    pub absolute: f64,

    /// Additional path regex to exclude; may be repeated
    #[arg(short = 'e', long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Ignore values missing from the file to compare
    #[arg(short = 'm', long)]
    pub skip_missing: bool,

    /// Treat warnings as errors
    #[arg(short = 'w', long = "Werror")]
    pub warnings_are_errors: bool,

    /// Number of worker threads
    #[arg(short = 'j', long, default_value_t = 1)]
    pub jobs: usize,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,
}

impl CheckArgs {
    /// Build the comparison configuration; the default exclusions come first
    pub fn to_config(&self) -> restartcheck_core::Result<ComparisonConfig> {
        let tolerance = Tolerance::new(self.absolute, self.relative)?;
        let mut exclusions = ExclusionSet::defaults()?;
        for pattern in &self.exclude {
            exclusions.push(pattern)?;
        }
        Ok(ComparisonConfig::new(tolerance, exclusions)
            .with_skip_missing(self.skip_missing)
            .with_warnings_are_errors(self.warnings_are_errors))
    }
}

/// Execute the check; returns whether the files differ
pub fn execute(args: CheckArgs) -> Result<bool, Box<dyn std::error::Error>> {
    init(match args.log_format {
        LogFormat::Human => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let options = CheckOptions {
        config: args.to_config()?,
        file_pattern: args.file_pattern,
        baseline_pattern: args.baseline_pattern,
        jobs: args.jobs,
    };

    let report = check(&options)?;
    print!("{}", report.text);

    Ok(report.differs)
}
