use crate::{IoDoneBehavior, SchedulerError, SwitchBehavior};

/// The default duration of an I/O, in ticks.
pub const DEFAULT_IO_LENGTH: usize = 5;

/// Policy knobs of a simulation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// When to switch between processes.
    pub switch: SwitchBehavior,

    /// What to do with a process whose I/O has completed.
    pub io_done: IoDoneBehavior,

    /// How long an I/O takes.
    pub io_length: usize,

    /// Seed for the generative program dialect.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            switch: SwitchBehavior::default(),
            io_done: IoDoneBehavior::default(),
            io_length: DEFAULT_IO_LENGTH,
            seed: 0,
        }
    }
}

impl Config {
    /// Builds a validated configuration.
    ///
    /// * `io_length` - taken signed so that a negative value coming from
    ///                 the command line is reported instead of wrapped.
    pub fn new(
        switch: SwitchBehavior,
        io_done: IoDoneBehavior,
        io_length: i64,
        seed: u64,
    ) -> Result<Config, SchedulerError> {
        let io_length =
            usize::try_from(io_length).map_err(|_| SchedulerError::NegativeIoLength(io_length))?;

        Ok(Config {
            switch,
            io_done,
            io_length,
            seed,
        })
    }

    pub fn with_switch(mut self, switch: SwitchBehavior) -> Self {
        self.switch = switch;
        self
    }

    pub fn with_io_done(mut self, io_done: IoDoneBehavior) -> Self {
        self.io_done = io_done;
        self
    }

    pub fn with_io_length(mut self, io_length: usize) -> Self {
        self.io_length = io_length;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
