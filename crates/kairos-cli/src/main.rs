//! Kairos CLI
//!
//! Runs the scheduling simulator over a process description file and a
//! random number table, then prints the per-process report and summary.
//!
//! ```bash
//! kairos -sF input1 rfile
//! kairos -sR4 -v input2 rfile
//! kairos -sE2:5 --output result.json input3 rfile
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kairos_core::{workload, RandomOracle, SchedSpec, Simulator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod report;

#[derive(Parser, Debug)]
#[command(name = "kairos")]
#[command(about = "Deterministic CPU scheduling simulator", long_about = None)]
struct Args {
    /// Scheduler: F, L, S, R<quantum>, P<quantum>[:<maxprio>], E<quantum>[:<maxprio>]
    #[arg(short = 's', value_name = "SPEC")]
    scheduler: String,

    /// Trace state transitions
    #[arg(short = 'v')]
    verbose: bool,

    /// Trace event-queue operations
    #[arg(short = 't')]
    trace_events: bool,

    /// Trace preemption decisions
    #[arg(short = 'e')]
    trace_preemption: bool,

    /// Trace runqueue activity
    #[arg(short = 'p')]
    trace_runqueue: bool,

    /// Also write the result as JSON
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Process description file
    input: PathBuf,

    /// Random number table file
    randfile: PathBuf,
}

impl Args {
    fn log_filter(&self) -> &'static str {
        if self.trace_events || self.trace_preemption || self.trace_runqueue {
            "kairos_core=trace"
        } else if self.verbose {
            "kairos_core=debug"
        } else {
            "kairos_core=warn"
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let spec: SchedSpec = args.scheduler.parse()?;
    let oracle = RandomOracle::from_file(&args.randfile)
        .with_context(|| format!("could not load random file {}", args.randfile.display()))?;
    let processes = workload::load(&args.input)
        .with_context(|| format!("could not load input file {}", args.input.display()))?;

    let mut simulator = Simulator::new(spec.build(), oracle);
    for process in processes {
        simulator.admit(process);
    }
    let result = simulator.run();

    print!("{}", report::render(&result));

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result)?;
        fs::write(path, json)
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    Ok(())
}
