use std::path::PathBuf;

use abtest_stats::{
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_GRID_POINTS, DEFAULT_POWER, DEFAULT_SIGNIFICANCE_LEVEL,
};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "abtest",
    version,
    about = "Plan and inspect two-group conversion experiments"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Print results as pretty JSON")]
    pub json: bool,

    #[arg(
        value_enum,
        long,
        global = true,
        default_value = "normal",
        value_name = "VERBOSITY",
        help = "Verbosity level"
    )]
    pub verbosity: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Users needed per group to detect a lift
    SampleSize(SampleSizeArgs),
    /// Posterior conversion-rate curves of both groups
    Density(DensityArgs),
    /// Pooled two-proportion z-test
    ZTest(ZTestArgs),
    /// Validate and summarise a saved backend response
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct SampleSizeArgs {
    #[arg(
        long,
        short = 'b',
        value_name = "RATE",
        required_unless_present = "input",
        help = "Baseline conversion rate, e.g. 0.2"
    )]
    pub baseline: Option<f64>,

    #[arg(
        long,
        short = 'l',
        value_name = "LIFT",
        required_unless_present = "input",
        allow_negative_numbers = true,
        help = "Absolute lift to detect, e.g. 0.03 (may be negative)"
    )]
    pub lift: Option<f64>,

    #[arg(
        long,
        short = 'c',
        value_name = "LEVEL",
        default_value_t = DEFAULT_CONFIDENCE_LEVEL,
        help = "Confidence level of the two-sided test"
    )]
    pub confidence: f64,

    #[arg(
        long,
        short = 'p',
        value_name = "POWER",
        default_value_t = DEFAULT_POWER,
        help = "Desired statistical power"
    )]
    pub power: f64,

    #[arg(
        long,
        short = 'i',
        value_name = "PLAN_JSON",
        conflicts_with_all = ["baseline", "lift", "confidence", "power"],
        help = "Read the analysis input from a JSON file instead"
    )]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GroupCounts {
    #[arg(long, value_name = "N", help = "Conversions in the control group")]
    pub a_success: u64,

    #[arg(long, value_name = "N", help = "Users in the control group")]
    pub a_total: u64,

    #[arg(long, value_name = "N", help = "Conversions in the variant group")]
    pub b_success: u64,

    #[arg(long, value_name = "N", help = "Users in the variant group")]
    pub b_total: u64,
}

#[derive(Args, Debug)]
pub struct DensityArgs {
    #[command(flatten)]
    pub counts: GroupCounts,

    #[arg(
        long,
        value_name = "POINTS",
        default_value_t = DEFAULT_GRID_POINTS,
        help = "Number of grid points"
    )]
    pub points: usize,

    #[arg(long, help = "Scale each curve to a peak of 1")]
    pub normalize: bool,

    #[arg(long, help = "Evaluate over [0, 1] instead of the window around the means")]
    pub full_support: bool,
}

#[derive(Args, Debug)]
pub struct ZTestArgs {
    #[command(flatten)]
    pub counts: GroupCounts,

    #[arg(
        long,
        value_name = "ALPHA",
        default_value_t = DEFAULT_SIGNIFICANCE_LEVEL,
        help = "Significance level"
    )]
    pub alpha: f64,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(value_name = "RESPONSE_JSON", help = "Saved response body of the inference API")]
    pub response: PathBuf,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Verbose,
    Normal,
    Silent,
}
