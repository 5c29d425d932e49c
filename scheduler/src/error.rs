use std::io;

use thiserror::Error;

use crate::{Pid, ProcessState};

/// Errors reported by the loader and the scheduler.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SchedulerError {
    /// The process switch behavior is not one of the known values
    #[error("invalid process switch behavior: {0} (should be SWITCH_ON_IO or SWITCH_ON_END)")]
    UnknownSwitchBehavior(String),

    /// The I/O done behavior is not one of the known values
    #[error("invalid I/O done behavior: {0} (should be IO_RUN_LATER or IO_RUN_IMMEDIATE)")]
    UnknownIoDoneBehavior(String),

    #[error("I/O length must be non-negative, got {0}")]
    NegativeIoLength(i64),

    /// An explicit program token does not start with `c` or `i`
    #[error("bad opcode {0} (should be 'c' or 'i')")]
    BadOpcode(String),

    /// A `c` token whose count is not a number
    #[error("invalid compute instructions: {0}")]
    InvalidCompute(String),

    /// A generative description that is not of the form `X:Y`
    #[error(
        "bad description ({0}): must be number <x:y> where X is the number of instructions \
         and Y is the percent chance that an instruction is CPU not IO"
    )]
    BadDescription(String),

    #[error("invalid number of instructions: {0}")]
    InvalidInstructionCount(String),

    #[error("invalid CPU chance: {0} (should be a percentage between 0 and 100)")]
    InvalidCpuChance(String),

    /// A state transition was requested from the wrong state
    #[error("process {pid}: expected state {expected}, but got {found}")]
    UnexpectedState {
        pid: Pid,
        expected: ProcessState,
        found: ProcessState,
    },

    #[error("process with PID {0} does not exist")]
    NoSuchProcess(Pid),

    #[error("no current process set")]
    NoCurrentProcess,

    /// Processes are still active, but nothing runs and no I/O is pending
    #[error("simulation stalled at tick {0}: no process can make progress")]
    Stalled(usize),

    #[error("failed to emit trace")]
    Trace(#[from] io::Error),
}
