use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::loader::{self, Program};
use crate::ProcessState::{Blocked, Done, Ready, Running};
use crate::{
    Column, Config, Instruction, IoDoneBehavior, Observer, Pid, Process, ProcessState, Scheduler,
    SchedulerError, Stats, SwitchBehavior, Tick,
};

#[derive(Clone, PartialEq)]
struct PCB {
    pid: Pid,
    state: ProcessState,
    code: Vec<Instruction>,
    pc: usize,
}

impl PCB {
    fn new(pid: Pid, code: Vec<Instruction>) -> Self {
        PCB {
            pid,
            state: Ready,
            code,
            pc: 0,
        }
    }

    fn fetch(&mut self) -> Option<Instruction> {
        let instruction = self.code.get(self.pc).copied()?;
        self.pc += 1;
        Some(instruction)
    }

    fn finished(&self) -> bool {
        self.pc >= self.code.len()
    }
}

impl Process for PCB {
    fn pid(&self) -> Pid {
        self.pid
    }

    fn state(&self) -> ProcessState {
        self.state
    }

    fn code(&self) -> &[Instruction] {
        &self.code[self.pc..]
    }
}

/// A state change of one process, as recorded by the scheduler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The tick during which the change happened, 0 before the first tick.
    pub clock: usize,
    pub pid: Pid,
    pub from: ProcessState,
    pub to: ProcessState,
}

/// A uniprocessor scheduler that picks the next ready process in PID order.
///
/// When it switches, and what a process does once its I/O completes, is
/// decided by the [`Config`] it was built with.
pub struct RoundRobin {
    processes: Vec<PCB>,
    current: Option<Pid>,
    io_finish_times: Vec<Vec<usize>>,
    config: Config,
    rng: StdRng,
    clock: usize,
    transitions: Vec<Transition>,
}

impl RoundRobin {
    pub fn new(config: Config) -> Self {
        RoundRobin {
            processes: Vec::new(),
            current: None,
            io_finish_times: Vec::new(),
            config,
            rng: StdRng::seed_from_u64(config.seed),
            clock: 0,
            transitions: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The process that currently owns (or last owned) the CPU.
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    /// Every state change made so far, in order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Loads an explicit program like `c7,i,c5,i` into a new process.
    pub fn load_program(&mut self, program: &str) -> Result<Pid, SchedulerError> {
        let code = loader::parse_program(program)?;
        Ok(self.add(code))
    }

    /// Loads a generated program like `10:80` into a new process.
    pub fn load(&mut self, description: &str) -> Result<Pid, SchedulerError> {
        let code = loader::generate(description, &mut self.rng)?;
        Ok(self.add(code))
    }

    /// Loads a batch of programs.
    ///
    /// Either every program is loaded, or none is and the error of the
    /// first malformed one is returned.
    pub fn load_all<'a, I>(&mut self, programs: I) -> Result<Vec<Pid>, SchedulerError>
    where
        I: IntoIterator<Item = Program<'a>>,
    {
        let mut rng = self.rng.clone();
        let codes = programs
            .into_iter()
            .map(|program| program.instructions(&mut rng))
            .collect::<Result<Vec<_>, _>>()?;

        self.rng = rng;
        Ok(codes.into_iter().map(|code| self.add(code)).collect())
    }

    fn add(&mut self, code: Vec<Instruction>) -> Pid {
        let pid = Pid::new(self.processes.len());
        debug!(%pid, instructions = code.len(), "loaded process");
        self.processes.push(PCB::new(pid, code));
        self.io_finish_times.push(Vec::new());
        pid
    }

    fn process(&self, pid: Pid) -> Result<&PCB, SchedulerError> {
        self.processes
            .get(pid.index())
            .ok_or(SchedulerError::NoSuchProcess(pid))
    }

    fn process_mut(&mut self, pid: Pid) -> Result<&mut PCB, SchedulerError> {
        self.processes
            .get_mut(pid.index())
            .ok_or(SchedulerError::NoSuchProcess(pid))
    }

    fn current_pid(&self) -> Result<Pid, SchedulerError> {
        self.current.ok_or(SchedulerError::NoCurrentProcess)
    }

    fn transition(
        &mut self,
        pid: Pid,
        expected: ProcessState,
        next: ProcessState,
    ) -> Result<(), SchedulerError> {
        let process = self.process_mut(pid)?;
        if process.state != expected {
            return Err(SchedulerError::UnexpectedState {
                pid,
                expected,
                found: process.state,
            });
        }
        process.state = next;

        debug!(clock = self.clock, %pid, from = %expected, to = %next, "transition");
        self.transitions.push(Transition {
            clock: self.clock,
            pid,
            from: expected,
            to: next,
        });
        Ok(())
    }

    fn move_to_ready(&mut self, expected: ProcessState, pid: Pid) -> Result<(), SchedulerError> {
        self.transition(pid, expected, Ready)
    }

    fn move_to_wait(&mut self, expected: ProcessState) -> Result<(), SchedulerError> {
        let pid = self.current_pid()?;
        self.transition(pid, expected, Blocked)
    }

    fn move_to_running(&mut self, expected: ProcessState) -> Result<(), SchedulerError> {
        let pid = self.current_pid()?;
        self.transition(pid, expected, Running)
    }

    fn move_to_done(&mut self, expected: ProcessState) -> Result<(), SchedulerError> {
        let pid = self.current_pid()?;
        self.transition(pid, expected, Done)
    }

    /// Selects the next process to run.
    ///
    /// With a `pid`, that process is selected unconditionally. Otherwise
    /// the processes after the current one are scanned in PID order,
    /// wrapping around, and the first ready one is selected. If none is
    /// ready the current process stays as it is.
    fn next_proc(&mut self, pid: Option<Pid>) -> Result<(), SchedulerError> {
        if let Some(pid) = pid {
            self.current = Some(pid);
            return self.move_to_running(Ready);
        }

        let count = self.processes.len();
        let start = self.current.map_or(0, |pid| pid.index() + 1);
        let next = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&index| self.processes[index].state == Ready);

        match next {
            Some(index) => {
                self.current = Some(Pid::new(index));
                self.move_to_running(Ready)
            }
            None => {
                debug!(clock = self.clock, "no ready process to switch to");
                Ok(())
            }
        }
    }

    /// Finishes the current process if it has run out of code.
    fn check_if_done(&mut self) -> Result<(), SchedulerError> {
        let pid = self.current_pid()?;
        let process = self.process(pid)?;

        if process.finished() && process.state == Running {
            self.move_to_done(Running)?;
            return self.next_proc(None);
        }

        Ok(())
    }

    fn num_active(&self) -> usize {
        self.processes.iter().filter(|p| p.state != Done).count()
    }

    fn num_runnable(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| matches!(p.state, Ready | Running))
            .count()
    }

    fn any_running(&self) -> bool {
        self.processes.iter().any(|p| p.state == Running)
    }

    fn ios_in_flight(&self, clock: usize) -> usize {
        self.io_finish_times
            .iter()
            .flatten()
            .filter(|&&finish| finish > clock)
            .count()
    }

    /// Wakes up every process whose I/O finishes at `clock`.
    ///
    /// Returns whether any I/O completed.
    fn complete_ios(&mut self, clock: usize) -> Result<bool, SchedulerError> {
        let mut io_done = false;

        for index in 0..self.processes.len() {
            let finish_times = &mut self.io_finish_times[index];
            let completed = finish_times.iter().filter(|&&finish| finish == clock).count();
            finish_times.retain(|&finish| finish != clock);

            let pid = Pid::new(index);
            for _ in 0..completed {
                io_done = true;
                self.move_to_ready(Blocked, pid)?;

                match self.config.io_done {
                    IoDoneBehavior::RunImmediate => {
                        if let Some(current) = self.current {
                            if current != pid && self.process(current)?.state == Running {
                                self.move_to_ready(Running, current)?;
                            }
                        }
                        self.next_proc(Some(pid))?;
                    }
                    IoDoneBehavior::RunLater => {
                        // never preempts; an idle CPU goes to the unblocked process
                        let idle = !self.any_running();
                        if idle
                            && (self.config.switch == SwitchBehavior::OnEnd
                                || self.num_runnable() == 1)
                        {
                            self.next_proc(Some(pid))?;
                        }
                    }
                }

                self.check_if_done()?;
            }
        }

        Ok(io_done)
    }

    /// Executes one instruction of the current process, if it is running.
    fn execute(&mut self) -> Result<Option<Instruction>, SchedulerError> {
        let pid = self.current_pid()?;
        let process = self.process_mut(pid)?;
        if process.state != Running {
            return Ok(None);
        }
        Ok(process.fetch())
    }

    fn columns(&self, executed: Option<Instruction>) -> Vec<Column> {
        self.processes
            .iter()
            .map(|process| match executed {
                Some(instruction) if Some(process.pid) == self.current => {
                    Column::Run(instruction)
                }
                _ => Column::State(process.state),
            })
            .collect()
    }
}

impl Scheduler for RoundRobin {
    fn list(&self) -> Vec<&dyn Process> {
        self.processes.iter().map(|p| p as &dyn Process).collect()
    }

    fn run(&mut self, observer: &mut dyn Observer) -> Result<Stats, SchedulerError> {
        let mut stats = Stats::default();
        if self.processes.is_empty() {
            return Ok(stats);
        }

        info!(
            processes = self.processes.len(),
            switch = %self.config.switch,
            io_done = %self.config.io_done,
            io_length = self.config.io_length,
            "starting simulation"
        );

        self.clock = 0;
        self.io_finish_times.iter_mut().for_each(Vec::clear);

        self.current = Some(Pid::new(0));
        self.move_to_running(Ready)?;

        observer.start(&self.list())?;

        while self.num_active() > 0 {
            if !self.any_running() && self.ios_in_flight(self.clock) == 0 {
                return Err(SchedulerError::Stalled(self.clock));
            }

            self.clock += 1;
            let clock = self.clock;

            let io_done = self.complete_ios(clock)?;

            let executed = self.execute()?;
            if executed.is_some() {
                stats.cpu_busy += 1;
            }

            let ios_in_flight = self.ios_in_flight(clock);
            if ios_in_flight > 0 {
                stats.io_busy += 1;
            }

            let tick = Tick {
                clock,
                io_done,
                columns: self.columns(executed),
                executed,
                ios_in_flight,
            };
            trace!(clock, io_done, ?executed, ios_in_flight, "tick");
            observer.tick(&tick)?;

            if executed == Some(Instruction::Io) {
                self.move_to_wait(Running)?;
                let pid = self.current_pid()?;
                self.io_finish_times[pid.index()].push(clock + self.config.io_length + 1);
                if self.config.switch == SwitchBehavior::OnIo {
                    self.next_proc(None)?;
                }
            }

            self.check_if_done()?;
        }

        stats.total = self.clock;
        info!(
            total = stats.total,
            cpu_busy = stats.cpu_busy,
            io_busy = stats.io_busy,
            "simulation finished"
        );
        Ok(stats)
    }
}
