use anyhow::{ensure, Context as _};
use clap::Parser;
use log::{info, warn};
use olsbench::{Benchmark, BenchmarkOptions, DataSource, Strategy, Table};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Fits one simple linear regression per feature column against the last column and
/// times the full pass.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opt {
    /// Delimited text table: header row, identifier column, features, target last.
    input: PathBuf,

    #[arg(
        long,
        value_enum,
        default_value_t = Strategy::Concurrent,
        conflicts_with = "compare"
    )]
    strategy: Strategy,

    /// Number of timed repetitions of the full pass.
    #[arg(long, default_value = "100")]
    trials: NonZeroUsize,

    /// Size of a dedicated worker pool for the concurrent strategy.
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Reload the input inside every trial, timing I/O as well as compute.
    #[arg(long)]
    reload_per_trial: bool,

    /// Run both strategies, check that they agree and report the speedup.
    #[arg(long)]
    compare: bool,
}

const AGREEMENT_TOLERANCE: f64 = 1e-9;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::parse();

    let table = olsbench::load_table(&opt.input)
        .with_context(|| format!("error loading {}", opt.input.display()))?;
    info!(
        "{}: {} rows, {} features",
        opt.input.display(),
        table.rows_len(),
        table.features_len()
    );

    let source = if opt.reload_per_trial {
        DataSource::ReloadEachTrial(&opt.input)
    } else {
        DataSource::Loaded(&table)
    };

    if opt.compare {
        let sequential = options(&opt, Strategy::Sequential).measure(source)?;
        let concurrent = options(&opt, Strategy::Concurrent).measure(source)?;
        let agree = olsbench::results_agree(
            &sequential.fits,
            &concurrent.fits,
            AGREEMENT_TOLERANCE,
        );
        if !agree {
            warn!("sequential and concurrent fits differ");
        }

        report(&table, &concurrent);
        println!("[sequential]\n{}", sequential);
        println!("[concurrent]\n{}", concurrent);
        println!(
            "Speedup: {:.2}x",
            sequential.average.as_secs_f64() / concurrent.average.as_secs_f64()
        );
        ensure!(agree, "strategies disagree beyond {}", AGREEMENT_TOLERANCE);
    } else {
        let benchmark = options(&opt, opt.strategy).measure(source)?;
        report(&table, &benchmark);
        println!("{}", benchmark);
    }

    Ok(())
}

fn options(opt: &Opt, strategy: Strategy) -> BenchmarkOptions {
    let options = BenchmarkOptions::new().strategy(strategy).trials(opt.trials);
    match opt.threads {
        Some(threads) => options.threads(threads),
        None => options,
    }
}

fn report(table: &Table, benchmark: &Benchmark) {
    for fit in &benchmark.fits {
        println!("{}", fit.display(table));
    }
    if let Some(best) = olsbench::best_predictor(&benchmark.fits) {
        println!("Best predictor: Feature {} (MSE: {:.6})", best.feature, best.mse);
    }
}
