use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use processor::{format_listing, format_stats, Processor};
use scheduler::{round_robin, Config, IoDoneBehavior, Program, Scheduler, SwitchBehavior};

/// Simulates how a CPU scheduler runs a set of processes that use the CPU
/// and issue I/Os.
#[derive(Parser, Debug)]
#[command(name = "process-run", version, about)]
struct Cli {
    /// The random seed
    #[arg(short = 's', long, default_value_t = 0)]
    seed: u64,

    /// A comma-separated list of processes to run, in the form X1:Y1,X2:Y2,...
    /// where X is the number of instructions that process should run, and Y
    /// the chances (from 0 to 100) that an instruction will use the CPU or
    /// issue an IO
    #[arg(short = 'l', long = "processes", default_value = "")]
    process_list: String,

    /// More specific controls over programs, e.g. c7,i,c3:c5 runs two
    /// processes; cN is N CPU instructions and i is one IO
    #[arg(short = 'P', long = "program", default_value = "")]
    program: String,

    /// How long an IO takes
    #[arg(
        short = 'L',
        long = "iolength",
        default_value_t = 5,
        allow_negative_numbers = true
    )]
    io_length: i64,

    /// When to switch between processes: SWITCH_ON_IO, SWITCH_ON_END
    #[arg(short = 'S', long = "switch", default_value = "SWITCH_ON_IO")]
    switch: String,

    /// Type of behavior when IO ends: IO_RUN_LATER, IO_RUN_IMMEDIATE
    #[arg(short = 'I', long = "iodone", default_value = "IO_RUN_LATER")]
    io_done: String,

    /// Compute answers for me
    #[arg(short = 'c', long = "compute")]
    solve: bool,

    /// Print statistics at end; only useful with -c flag (otherwise stats are not printed)
    #[arg(short = 'p', long = "printstats")]
    print_stats: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let switch = self.switch.parse::<SwitchBehavior>()?;
        let io_done = self.io_done.parse::<IoDoneBehavior>()?;
        Ok(Config::new(switch, io_done, self.io_length, self.seed)?)
    }

    fn programs(&self) -> Vec<Program<'_>> {
        if !self.program.is_empty() {
            self.program.split(':').map(Program::Explicit).collect()
        } else {
            self.process_list.split(',').map(Program::Generated).collect()
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config().context("invalid configuration")?;

    let mut scheduler = round_robin(config);
    let pids = scheduler
        .load_all(cli.programs())
        .context("error loading process")?;
    debug!(processes = pids.len(), "processes loaded");

    if !cli.solve {
        print!("{}", format_listing(&scheduler.list(), scheduler.config()));
        return Ok(());
    }

    let stats = Processor::run(&mut scheduler, io::stdout().lock()).context("simulation failed")?;

    if cli.print_stats {
        print!("{}", format_stats(&stats));
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// Do not delete this line
#[cfg(test)]
mod tests;
