//! A scheduler simulation library.
//!
//! This library provides the types and the engine needed to simulate
//! a uniprocessor scheduler running synthetic processes. Each process is
//! a sequence of compute and I/O instructions; the scheduler runs them
//! tick by tick and reports what every process did to an [`Observer`].
//!

mod config;
mod error;
pub mod loader;
mod scheduler;
mod schedulers;

pub use crate::config::{Config, DEFAULT_IO_LENGTH};
pub use crate::error::SchedulerError;
pub use crate::loader::{Program, MAX_INSTRUCTIONS};
pub use crate::scheduler::{
    Column, Instruction, IoDoneBehavior, Observer, Pid, Process, ProcessState, Scheduler, Stats,
    SwitchBehavior, Tick,
};
pub use crate::schedulers::{RoundRobin, Transition};

/// Returns a round robin scheduler with the given policies.
///
/// * `config` - when to switch between processes, what to do after an
///              I/O completes, how long an I/O takes and the seed used
///              for generated programs.
pub fn round_robin(config: Config) -> RoundRobin {
    RoundRobin::new(config)
}
