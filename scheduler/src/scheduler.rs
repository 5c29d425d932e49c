use std::fmt::{self, Display};
use std::io;
use std::str::FromStr;

use crate::SchedulerError;

/// The PID of a process
///
/// PIDs are dense indices into the process table, starting from 0
/// in load order.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Pid(usize);

impl Pid {
    pub fn new(pid: usize) -> Pid {
        Pid(pid)
    }

    /// The position of the process in the process table.
    pub fn index(self) -> usize {
        self.0
    }
}

impl PartialEq<usize> for Pid {
    fn eq(&self, other: &usize) -> bool {
        self.0 == *other
    }
}

impl Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single step of a process's code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Use the CPU for one tick.
    Compute,

    /// Issue an I/O and block until it completes.
    ///
    /// Always directly followed by an [`Instruction::IoDone`].
    Io,

    /// Consume the completion of the preceding I/O.
    IoDone,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Compute => write!(f, "cpu"),
            Instruction::Io => write!(f, "io"),
            Instruction::IoDone => write!(f, "io_done"),
        }
    }
}

/// The state of a process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProcessState {
    /// The process is ready to be scheduled.
    Ready,

    /// The process currently owns the CPU.
    Running,

    /// The process is waiting for an I/O to complete.
    Blocked,

    /// The process has executed all of its code.
    Done,
}

impl Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running => write!(f, "RUNNING"),
            ProcessState::Blocked => write!(f, "BLOCKED"),
            ProcessState::Done => write!(f, "DONE"),
        }
    }
}

/// When the scheduler reconsiders which process runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SwitchBehavior {
    /// Switch when the current process finishes or issues an I/O.
    #[default]
    OnIo,

    /// Switch only when the current process finishes.
    OnEnd,
}

impl SwitchBehavior {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SwitchBehavior::OnIo => "SWITCH_ON_IO",
            SwitchBehavior::OnEnd => "SWITCH_ON_END",
        }
    }
}

impl FromStr for SwitchBehavior {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SWITCH_ON_IO" => Ok(SwitchBehavior::OnIo),
            "SWITCH_ON_END" => Ok(SwitchBehavior::OnEnd),
            other => Err(SchedulerError::UnknownSwitchBehavior(other.to_string())),
        }
    }
}

impl Display for SwitchBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a process whose I/O has just completed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IoDoneBehavior {
    /// The process becomes ready and waits for its turn.
    #[default]
    RunLater,

    /// The process preempts the current runner.
    RunImmediate,
}

impl IoDoneBehavior {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoDoneBehavior::RunLater => "IO_RUN_LATER",
            IoDoneBehavior::RunImmediate => "IO_RUN_IMMEDIATE",
        }
    }
}

impl FromStr for IoDoneBehavior {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IO_RUN_LATER" => Ok(IoDoneBehavior::RunLater),
            "IO_RUN_IMMEDIATE" => Ok(IoDoneBehavior::RunImmediate),
            other => Err(SchedulerError::UnknownIoDoneBehavior(other.to_string())),
        }
    }
}

impl Display for IoDoneBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a process column shows for one tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Column {
    /// The process did not execute; show its state.
    State(ProcessState),

    /// The process executed this instruction.
    Run(Instruction),
}

impl Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Column::State(state) => write!(f, "{}", state),
            Column::Run(instruction) => write!(f, "RUN:{}", instruction),
        }
    }
}

/// Everything that happened during one tick of the simulation.
///
/// This is handed to the [`Observer`] once per tick, after the
/// instruction for the tick has executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The tick number, starting from 1.
    pub clock: usize,

    /// At least one I/O completed at the start of this tick.
    pub io_done: bool,

    /// One column per process, ordered by PID.
    pub columns: Vec<Column>,

    /// The instruction executed this tick, if the CPU was busy.
    pub executed: Option<Instruction>,

    /// The number of I/Os still outstanding after this tick.
    pub ios_in_flight: usize,
}

/// Aggregate counters of a finished run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    /// Ticks in which an instruction executed.
    pub cpu_busy: usize,

    /// Ticks in which at least one I/O was in flight.
    pub io_busy: usize,

    /// Ticks elapsed until every process was done.
    pub total: usize,
}

impl Stats {
    pub fn cpu_percent(&self) -> f64 {
        percent(self.cpu_busy, self.total)
    }

    pub fn io_percent(&self) -> f64 {
        percent(self.io_busy, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Receives the trace of a run as it is produced.
pub trait Observer {
    /// Called once, before the first tick, with the full process table.
    fn start(&mut self, processes: &[&dyn Process]) -> io::Result<()>;

    /// Called once per tick.
    fn tick(&mut self, tick: &Tick) -> io::Result<()>;
}

/// The trait that any scheduler has to implement.
pub trait Scheduler {
    /// Returns the list of processes, ordered by PID.
    fn list(&self) -> Vec<&dyn Process>;

    /// Drives every process to completion, reporting each tick to `observer`.
    fn run(&mut self, observer: &mut dyn Observer) -> Result<Stats, SchedulerError>;
}

/// The trait that the Process Control Block (PCB) has to implement.
///
/// The PCB can be implemented with any data structure as long as
/// it implements this trait.
pub trait Process {
    /// Return the PID of the process.
    fn pid(&self) -> Pid;

    /// Return the state of the process.
    fn state(&self) -> ProcessState;

    /// Returns the instructions the process still has to execute.
    fn code(&self) -> &[Instruction];
}
