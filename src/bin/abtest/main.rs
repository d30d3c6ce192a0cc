use abtest_stats::density::{self, PreviewCurves};
use abtest_stats::frequentist::two_proportion_z_test;
use abtest_stats::grid::linspace;
use abtest_stats::observation::{BetaShapeParameters, ProportionObservation};
use abtest_stats::power::{required_sample_size, PowerAnalysisInput};
use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use serde::Serialize;

mod cli;
mod io;

fn main() {
    let args = cli::Cli::parse();
    let filter = match args.verbosity {
        cli::LogLevel::Silent => "off",
        cli::LogLevel::Normal => "info",
        cli::LogLevel::Verbose => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    run(&args).unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn run(args: &cli::Cli) -> Result<()> {
    match &args.command {
        cli::Command::SampleSize(a) => sample_size(a, args.json),
        cli::Command::Density(a) => density(a, args.json),
        cli::Command::ZTest(a) => z_test(a, args.json),
        cli::Command::Inspect(a) => inspect(a, args.json),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn observations(
    counts: &cli::GroupCounts,
) -> Result<(ProportionObservation, ProportionObservation)> {
    let control = ProportionObservation::new(counts.a_success, counts.a_total)
        .context("control group")?;
    let variant = ProportionObservation::new(counts.b_success, counts.b_total)
        .context("variant group")?;
    Ok((control, variant))
}

fn sample_size(args: &cli::SampleSizeArgs, json: bool) -> Result<()> {
    let input = match &args.input {
        Some(path) => {
            info!("Loading analysis input from {}", path.display());
            io::load_plan(path)?
        }
        None => PowerAnalysisInput {
            // clap enforces presence unless --input is given
            baseline_rate: args.baseline.unwrap_or_default(),
            absolute_lift: args.lift.unwrap_or_default(),
            confidence_level: args.confidence,
            power: args.power,
        },
    };
    debug!("{input:?}");

    let result = required_sample_size(&input)?;

    if json {
        #[derive(Serialize)]
        struct Report<'a> {
            input: &'a PowerAnalysisInput,
            result: &'a abtest_stats::power::SampleSizeResult,
        }
        return print_json(&Report {
            input: &input,
            result: &result,
        });
    }

    let (p1, p2) = input.rates();
    println!(
        "Detecting {:.2}% -> {:.2}% at {:.0}% confidence with {:.0}% power",
        p1 * 100.0,
        p2 * 100.0,
        input.confidence_level * 100.0,
        input.power * 100.0
    );
    println!("Per group: {}", result.per_group);
    println!("Total:     {}", result.total);
    Ok(())
}

fn density(args: &cli::DensityArgs, json: bool) -> Result<()> {
    let (control, variant) = observations(&args.counts)?;

    let mut curves = if args.full_support {
        let xs = linspace(0.0, 1.0, args.points)?;
        PreviewCurves {
            control: density::evaluate_density(
                &BetaShapeParameters::from_observation(&control),
                &xs,
            )?,
            variant: density::evaluate_density(
                &BetaShapeParameters::from_observation(&variant),
                &xs,
            )?,
        }
    } else {
        density::preview_curves(&control, &variant, args.points)?
    };
    if args.normalize {
        curves = curves.normalized();
    }
    info!(
        "Evaluated {} points for each group (control rate {:.4}, variant rate {:.4})",
        curves.control.len(),
        control.rate(),
        variant.rate()
    );

    if json {
        return print_json(&curves);
    }

    println!("x\tcontrol\tvariant");
    for (a, b) in curves.control.points().iter().zip(curves.variant.points()) {
        println!("{:.6}\t{:.6}\t{:.6}", a.x, a.y, b.y);
    }
    Ok(())
}

fn z_test(args: &cli::ZTestArgs, json: bool) -> Result<()> {
    let (control, variant) = observations(&args.counts)?;
    let result = two_proportion_z_test(&control, &variant, args.alpha)?;

    if json {
        return print_json(&result);
    }

    println!("Control rate: {:.4}%", result.control_rate * 100.0);
    println!("Variant rate: {:.4}%", result.variant_rate * 100.0);
    println!("z:            {:.4}", result.z);
    println!("p-value:      {:.6}", result.p_value);
    if result.significant {
        println!("Statistically significant difference (p < {})", args.alpha);
    } else {
        println!("No statistically significant difference (p >= {})", args.alpha);
    }
    Ok(())
}

fn inspect(args: &cli::InspectArgs, json: bool) -> Result<()> {
    info!("Inspecting {}", args.response.display());
    let response = io::load_response(&args.response)?;

    if json {
        #[derive(Serialize)]
        struct Summary {
            freq_p_value: f64,
            freq_significant: bool,
            bayes_prob_b_better: f64,
            evidence: abtest_stats::inference::EvidenceStrength,
            control: abtest_stats::inference::GroupSummary,
            variant: abtest_stats::inference::GroupSummary,
        }
        return print_json(&Summary {
            freq_p_value: response.freq_p_value,
            freq_significant: response.freq_significant,
            bayes_prob_b_better: response.bayes_prob_b_better,
            evidence: response.evidence(),
            control: response.control(),
            variant: response.variant(),
        });
    }

    println!("Frequentist p-value: {}", response.freq_p_value);
    println!(
        "Significant:         {}",
        if response.freq_significant { "yes" } else { "no" }
    );
    println!(
        "P(variant better):   {:.1}% ({})",
        response.bayes_prob_b_better * 100.0,
        response.evidence()
    );
    println!();
    println!("group\tconversion\tprob_best\texpected_loss");
    for (name, g) in [("control", response.control()), ("variant", response.variant())] {
        println!(
            "{name}\t{:.2}%\t{:.2}%\t{:.4}%",
            g.mean * 100.0,
            g.prob_best * 100.0,
            g.expected_loss * 100.0
        );
    }
    Ok(())
}
