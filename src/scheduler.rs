use crate::process::{Level, Process, ALL_LEVELS};
use crate::queue::Queue;

/// All scheduling state: the four-level ready ladder, the holding queues
/// around it, the single execution slot, and the simulated clock. The slot
/// owns the running record outright: dispatch detaches it from the head of
/// its level queue, and preemption reattaches it at the front so the record
/// keeps its turn.
pub struct Scheduler {
    not_arrived: Queue<Process>,
    blocked: Queue<Process>,
    levels: [Queue<Process>; 4],
    terminated: Queue<Process>,
    running: Option<Process>,
    clock: usize,
    null_usage: usize,
}

impl Scheduler {
    pub fn new(processes: Vec<Process>) -> Scheduler {
        let mut not_arrived = Queue::new();
        for proc in processes {
            not_arrived.add(proc);
        }
        Scheduler {
            not_arrived,
            blocked: Queue::new(),
            levels: [Queue::new(), Queue::new(), Queue::new(), Queue::new()],
            terminated: Queue::new(),
            running: None,
            clock: 0,
            null_usage: 0,
        }
    }

    /// The clock driver: one admission/dispatch/IO cycle per tick until no
    /// process remains anywhere in the system. Emptiness is re-checked after
    /// each cycle because the last process can finish mid-tick.
    pub fn run(&mut self) {
        while self.processes_exist() {
            self.step();
            q_trace!("{}", self.queue_snapshot());
            if !self.processes_exist() {
                break;
            }
            self.clock += 1;
        }
        println!("\nScheduler shutdown at time {}.", self.clock);
    }

    pub fn clock(&self) -> usize {
        self.clock
    }

    pub fn null_usage(&self) -> usize {
        self.null_usage
    }

    pub fn terminated(&self) -> impl Iterator<Item = &Process> + '_ {
        self.terminated.iter()
    }

    /// One full clock cycle, in the fixed step order.
    fn step(&mut self) {
        self.admit_arrivals();
        self.dispatch();
        self.complete_io();
    }

    fn processes_exist(&self) -> bool {
        !self.not_arrived.is_empty()
            || !self.blocked.is_empty()
            || self.running.is_some()
            || self.levels.iter().any(|q| !q.is_empty())
    }

    fn highest_ready_level(&self) -> Option<Level> {
        ALL_LEVELS
            .iter()
            .copied()
            .find(|level| !self.levels[level.index()].is_empty())
    }

    fn take_highest_ready(&mut self) -> Option<Process> {
        let level = self.highest_ready_level()?;
        self.levels[level.index()].pop_front()
    }

    /// Move every process whose arrival time matches the clock from the
    /// not-arrived queue into Level 1, in input order.
    fn admit_arrivals(&mut self) {
        self.not_arrived.rewind();
        while !self.not_arrived.end_of_queue() {
            let due = self
                .not_arrived
                .current()
                .map_or(false, |proc| proc.arrival_time == self.clock);
            if !due {
                self.not_arrived.next_element();
                continue;
            }
            if let Some(mut proc) = self.not_arrived.delete_current() {
                proc.enter_level(Level::One);
                println!(
                    "CREATE: Process {} entered the ready queue at time {}.",
                    proc.pid, self.clock
                );
                self.levels[Level::One.index()].add(proc);
            }
        }
    }

    /// One tick of the execution slot: run the null process when nothing is
    /// ready, start a process when the slot is free, otherwise charge the
    /// running process one tick and apply the burst/quantum exhaustion
    /// rules. Afterwards refill an emptied slot, or hand it over when a
    /// strictly higher level has become ready.
    fn dispatch(&mut self) {
        let mut proc = match self.running.take() {
            Some(proc) => proc,
            None => {
                match self.take_highest_ready() {
                    Some(proc) => self.start_running(proc),
                    None => self.null_usage += 1,
                }
                return;
            }
        };

        proc.burst_remaining = proc.burst_remaining.saturating_sub(1);
        proc.quantum_remaining -= 1;
        proc.cpu_usage += 1;

        if proc.burst_remaining == 0 {
            if proc.io_remaining > 0 {
                proc.score_finished_burst();
                println!(
                    "I/O: Process {} blocked for I/O at time {}.",
                    proc.pid, self.clock
                );
                self.blocked.add(proc);
            } else {
                println!(
                    "FINISHED: Process {} finished at time {}.",
                    proc.pid, self.clock
                );
                self.terminated.add(proc);
            }
        } else if proc.quantum_remaining == 0 {
            proc.bad += 1;
            proc.good = 0;
            if proc.bad_limit == Some(proc.bad) {
                self.demote(proc);
            } else {
                proc.quantum_remaining = proc.quantum;
                self.queued_trace(&proc);
                self.levels[proc.level.index()].add(proc);
            }
        } else {
            self.running = Some(proc);
        }

        match self.running.take() {
            None => {
                if let Some(next) = self.take_highest_ready() {
                    self.start_running(next);
                }
            }
            Some(proc) => match self.highest_ready_level() {
                Some(level) if level < proc.level => {
                    self.queued_trace(&proc);
                    self.levels[proc.level.index()].push_front(proc);
                    match self.take_highest_ready() {
                        Some(next) => self.start_running(next),
                        None => panic!("process is lost: level {} emptied mid-tick", level.number()),
                    }
                }
                _ => self.running = Some(proc),
            },
        }
    }

    /// Give every blocked process one tick of I/O progress and re-admit the
    /// ones whose I/O completed, advancing their repeat/phase bookkeeping.
    fn complete_io(&mut self) {
        self.blocked.rewind();
        while !self.blocked.end_of_queue() {
            let io_done = match self.blocked.current_mut() {
                Some(curr) => {
                    curr.io_remaining -= 1;
                    curr.io_remaining == 0
                }
                None => break,
            };
            if !io_done {
                self.blocked.next_element();
                continue;
            }
            if let Some(mut proc) = self.blocked.delete_current() {
                proc.finish_io_cycle();
                self.readmit(proc);
            }
        }
    }

    /// Re-admission after I/O: promotion is evaluated before demotion, and a
    /// process that earns neither rejoins the rear of the level it left.
    fn readmit(&mut self, mut proc: Process) {
        if proc.good_limit == Some(proc.good) {
            match proc.level.promoted() {
                Some(dest) => proc.enter_level(dest),
                None => panic!("process {} is lost: promoted past the top level", proc.pid),
            }
        } else if proc.bad_limit == Some(proc.bad) {
            match proc.level.demoted() {
                Some(dest) => proc.enter_level(dest),
                None => panic!("process {} is lost: demoted past the bottom level", proc.pid),
            }
        }
        self.queued_trace(&proc);
        self.levels[proc.level.index()].add(proc);
    }

    /// Quantum-driven demotion: drop one level, adopt the destination
    /// parameters, and requeue at the rear.
    fn demote(&mut self, mut proc: Process) {
        match proc.level.demoted() {
            Some(dest) => {
                proc.enter_level(dest);
                self.queued_trace(&proc);
                self.levels[dest.index()].add(proc);
            }
            None => panic!("process {} is lost: demoted past the bottom level", proc.pid),
        }
    }

    fn start_running(&mut self, proc: Process) {
        println!(
            "RUN: Process {} started execution from level {} at time {}; wants to execute for {} ticks.",
            proc.pid,
            proc.level.number(),
            self.clock,
            proc.burst_remaining
        );
        self.running = Some(proc);
    }

    fn queued_trace(&self, proc: &Process) {
        println!(
            "QUEUED: Process {} queued at level {} at time {}.",
            proc.pid,
            proc.level.number(),
            self.clock
        );
    }

    fn queue_snapshot(&self) -> String {
        fn pids(queue: &Queue<Process>) -> String {
            queue
                .iter()
                .map(|proc| proc.pid.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        }
        let running = self
            .running
            .as_ref()
            .map_or_else(|| String::from("-"), |proc| proc.pid.to_string());
        format!(
            "t={:<5} running [{}] L1 [{}] L2 [{}] L3 [{}] L4 [{}] blocked [{}]",
            self.clock,
            running,
            pids(&self.levels[0]),
            pids(&self.levels[1]),
            pids(&self.levels[2]),
            pids(&self.levels[3]),
            pids(&self.blocked),
        )
    }

    #[cfg(test)]
    fn record_count(&self) -> usize {
        self.not_arrived.len()
            + self.blocked.len()
            + self.terminated.len()
            + self.levels.iter().map(|q| q.len()).sum::<usize>()
            + usize::from(self.running.is_some())
    }
}
