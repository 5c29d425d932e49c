//! A trace emission library
//!
//! This is used for printing simulations run by the [`scheduler`] crate:
//! the per-tick trace table, the end-of-run statistics and the listing of
//! the loaded processes.

use std::fmt::{self, Display, Write as _};
use std::io::{self, Write};

use scheduler::{
    Config, IoDoneBehavior, Observer, Pid, Process, Scheduler, SchedulerError, Stats,
    SwitchBehavior, Tick,
};

/// Width of every column after the time column.
const COLUMN_WIDTH: usize = 14;

/// Running iteration log
#[derive(Debug, Clone, PartialEq)]
pub struct Log {
    /// The tick this row describes.
    pub tick: Tick,
}

impl Log {
    fn new(tick: Tick) -> Log {
        Log { tick }
    }
}

impl Display for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Row(&self.tick).fmt(f)
    }
}

/// One trace row, borrowed from the scheduler's [`Tick`].
struct Row<'a>(&'a Tick);

impl Display for Row<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tick = self.0;
        let marker = if tick.io_done { '*' } else { ' ' };
        write!(f, "{:3}{}", tick.clock, marker)?;

        for column in &tick.columns {
            write!(f, "{:>COLUMN_WIDTH$}", column.to_string())?;
        }

        let cpu = if tick.executed.is_some() { "1" } else { "" };
        write!(f, "{:>COLUMN_WIDTH$}", cpu)?;

        if tick.ios_in_flight > 0 {
            write!(f, "{:>COLUMN_WIDTH$}", tick.ios_in_flight)
        } else {
            write!(f, "{:>COLUMN_WIDTH$}", "")
        }
    }
}

/// The header line of the trace table.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub pids: Vec<Pid>,
}

impl Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Time")?;
        for pid in &self.pids {
            write!(f, "{:>COLUMN_WIDTH$}", format!("PID:{:2}", pid.index()))?;
        }
        write!(f, "{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}", "CPU", "IOs")
    }
}

/// The processor simulator.
///
/// Streams the trace of a run to `out` as the scheduler produces it.
pub struct Processor<W: Write> {
    out: W,
}

impl<W: Write> Processor<W> {
    /// Run a simulation to completion, writing the trace to `out`.
    ///
    /// * `scheduler` - the loaded scheduler to run.
    /// * `out` - where the trace table goes, one line per tick.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use processor::Processor;
    /// use scheduler::{round_robin, Config};
    ///
    /// let mut scheduler = round_robin(Config::default().with_io_length(2));
    /// scheduler.load_program("c2,i,c1").unwrap();
    /// scheduler.load_program("c3").unwrap();
    ///
    /// let mut trace = Vec::<u8>::new();
    /// let stats = Processor::run(&mut scheduler, &mut trace).unwrap();
    /// assert_eq!(stats.total, 8);
    /// ```
    pub fn run<S>(scheduler: &mut S, out: W) -> Result<Stats, SchedulerError>
    where
        S: Scheduler + ?Sized,
    {
        let mut processor = Processor { out };
        let stats = scheduler.run(&mut processor)?;
        processor.out.flush()?;
        Ok(stats)
    }
}

impl<W: Write> Observer for Processor<W> {
    fn start(&mut self, processes: &[&dyn Process]) -> io::Result<()> {
        let header = Header {
            pids: processes.iter().map(|p| p.pid()).collect(),
        };
        writeln!(self.out, "{}", header)
    }

    fn tick(&mut self, tick: &Tick) -> io::Result<()> {
        writeln!(self.out, "{}", Row(tick))
    }
}

/// Collects the trace of a run instead of printing it.
#[derive(Debug, Default)]
pub struct Recorder {
    header: Option<Header>,
    logs: Vec<Log>,
}

impl Recorder {
    /// Run a simulation to completion and return its logs.
    pub fn run<S>(scheduler: &mut S) -> Result<(Header, Vec<Log>, Stats), SchedulerError>
    where
        S: Scheduler + ?Sized,
    {
        let mut recorder = Recorder::default();
        let stats = scheduler.run(&mut recorder)?;
        let header = recorder.header.unwrap_or(Header { pids: Vec::new() });
        Ok((header, recorder.logs, stats))
    }
}

impl Observer for Recorder {
    fn start(&mut self, processes: &[&dyn Process]) -> io::Result<()> {
        self.header = Some(Header {
            pids: processes.iter().map(|p| p.pid()).collect(),
        });
        Ok(())
    }

    fn tick(&mut self, tick: &Tick) -> io::Result<()> {
        self.logs.push(Log::new(tick.clone()));
        Ok(())
    }
}

/// Format a recorded trace to a [`String`].
///
/// * `header` - the header returned by the [`Recorder`].
/// * `logs` - the logs returned by the [`Recorder`].
///
/// An empty trace formats to an empty string.
pub fn format_logs(header: &Header, logs: &[Log]) -> String {
    let mut s = String::new();
    if logs.is_empty() {
        return s;
    }

    fmt::write(&mut s, format_args!("{}\n", header)).unwrap();
    for log in logs {
        fmt::write(&mut s, format_args!("{}\n", log)).unwrap();
    }
    s
}

/// Format the statistics of a finished run.
pub fn format_stats(stats: &Stats) -> String {
    let mut s = String::new();
    writeln!(s).unwrap();
    writeln!(s, "Stats: Total Time {}", stats.total).unwrap();
    writeln!(
        s,
        "Stats: CPU Busy {} ({:.2}%)",
        stats.cpu_busy,
        stats.cpu_percent()
    )
    .unwrap();
    writeln!(
        s,
        "Stats: IO Busy  {} ({:.2}%)",
        stats.io_busy,
        stats.io_percent()
    )
    .unwrap();
    writeln!(s).unwrap();
    s
}

/// Format the exercise shown instead of a trace: every process with its
/// instructions, followed by the policies in effect.
pub fn format_listing(processes: &[&dyn Process], config: &Config) -> String {
    let mut s = String::new();
    writeln!(
        s,
        "Produce a trace of what would happen when you run these processes:"
    )
    .unwrap();
    for process in processes {
        writeln!(s, "Process {}", process.pid()).unwrap();
        for instruction in process.code() {
            writeln!(s, "  {}", instruction).unwrap();
        }
        writeln!(s).unwrap();
    }

    writeln!(s, "Important behaviors:").unwrap();
    let switch = match config.switch {
        SwitchBehavior::OnIo => "the current process is FINISHED or ISSUES AN IO",
        SwitchBehavior::OnEnd => "the current process is FINISHED",
    };
    writeln!(s, "  System will switch when {}", switch).unwrap();

    let io_done = match config.io_done {
        IoDoneBehavior::RunImmediate => "run IMMEDIATELY",
        IoDoneBehavior::RunLater => "run LATER (when it is its turn)",
    };
    writeln!(s, "  After IOs, the process issuing the IO will {}", io_done).unwrap();
    writeln!(s).unwrap();
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scheduler::{round_robin, Column, Instruction, ProcessState};

    #[test]
    fn header_lists_every_pid() {
        let header = Header {
            pids: vec![Pid::new(0), Pid::new(1)],
        };
        assert_eq!(
            header.to_string(),
            "Time        PID: 0        PID: 1           CPU           IOs"
        );
    }

    #[test]
    fn row_marks_completed_io_and_busy_cpu() {
        let log = Log::new(Tick {
            clock: 6,
            io_done: true,
            columns: vec![
                Column::State(ProcessState::Ready),
                Column::Run(Instruction::Compute),
            ],
            executed: Some(Instruction::Compute),
            ios_in_flight: 0,
        });
        assert_eq!(
            log.to_string(),
            "  6*         READY       RUN:cpu             1              "
        );
    }

    #[test]
    fn idle_row_shows_ios_in_flight() {
        let log = Log::new(Tick {
            clock: 12,
            io_done: false,
            columns: vec![Column::State(ProcessState::Blocked)],
            executed: None,
            ios_in_flight: 1,
        });
        assert_eq!(
            log.to_string(),
            " 12        BLOCKED                           1"
        );
    }

    #[test]
    fn streamed_row_matches_recorded_log() {
        let tick = Tick {
            clock: 3,
            io_done: false,
            columns: vec![
                Column::Run(Instruction::Io),
                Column::State(ProcessState::Done),
            ],
            executed: Some(Instruction::Io),
            ios_in_flight: 2,
        };

        let mut processor = Processor { out: Vec::<u8>::new() };
        processor.tick(&tick).unwrap();

        let streamed = String::from_utf8(processor.out).unwrap();
        assert_eq!(streamed, format!("{}\n", Log::new(tick)));
        assert_eq!(
            streamed,
            "  3         RUN:io          DONE             1             2\n"
        );
    }

    #[test]
    fn stats_show_percentages() {
        let stats = Stats {
            cpu_busy: 8,
            io_busy: 2,
            total: 8,
        };
        assert_eq!(
            format_stats(&stats),
            "\nStats: Total Time 8\nStats: CPU Busy 8 (100.00%)\nStats: IO Busy  2 (25.00%)\n\n"
        );
    }

    #[test]
    fn listing_shows_code_and_policies() {
        let mut scheduler = round_robin(Config::default());
        scheduler.load_program("c1,i").unwrap();

        let listing = format_listing(&scheduler.list(), scheduler.config());
        assert_eq!(
            listing,
            "Produce a trace of what would happen when you run these processes:\n\
             Process 0\n  cpu\n  io\n  io_done\n\n\
             Important behaviors:\n  \
             System will switch when the current process is FINISHED or ISSUES AN IO\n  \
             After IOs, the process issuing the IO will run LATER (when it is its turn)\n\n"
        );
    }

    #[test]
    fn streamed_trace_matches_recorded_trace() {
        let load = || {
            let mut scheduler = round_robin(Config::default().with_io_length(1));
            scheduler.load_program("c1,i,c1").unwrap();
            scheduler.load_program("c2").unwrap();
            scheduler
        };

        let mut streamed = Vec::new();
        let stats = Processor::run(&mut load(), &mut streamed).unwrap();

        let (header, logs, recorded) = Recorder::run(&mut load()).unwrap();
        assert_eq!(stats, recorded);
        assert_eq!(String::from_utf8(streamed).unwrap(), format_logs(&header, &logs));
    }

    #[test]
    fn empty_scheduler_prints_nothing() {
        let mut streamed = Vec::<u8>::new();
        let stats = Processor::run(&mut round_robin(Config::default()), &mut streamed).unwrap();
        assert!(streamed.is_empty());
        assert_eq!(stats, Stats::default());
    }
}
