use std::collections::VecDeque;

/// The four ready-queue tiers. `One` is the highest priority; the derived
/// ordering makes a higher-priority level compare as the smaller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    One,
    Two,
    Three,
    Four,
}

pub const ALL_LEVELS: [Level; 4] = [Level::One, Level::Two, Level::Three, Level::Four];

/// Scheduling parameters attached to a level: the quantum granted per
/// dispatch and the bad/good streak limits that trigger demotion and
/// promotion. `None` marks a limit that can never be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    pub quantum: usize,
    pub bad_limit: Option<usize>,
    pub good_limit: Option<usize>,
}

impl Level {
    pub fn params(self) -> LevelParams {
        match self {
            Level::One => LevelParams {
                quantum: 10,
                bad_limit: Some(1),
                good_limit: None,
            },
            Level::Two => LevelParams {
                quantum: 30,
                bad_limit: Some(2),
                good_limit: Some(1),
            },
            Level::Three => LevelParams {
                quantum: 100,
                bad_limit: Some(2),
                good_limit: Some(2),
            },
            Level::Four => LevelParams {
                quantum: 200,
                bad_limit: None,
                good_limit: Some(2),
            },
        }
    }

    pub fn number(self) -> usize {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
            Level::Four => 4,
        }
    }

    pub fn index(self) -> usize {
        self.number() - 1
    }

    /// The next level down the ladder, or `None` from the bottom.
    pub fn demoted(self) -> Option<Level> {
        match self {
            Level::One => Some(Level::Two),
            Level::Two => Some(Level::Three),
            Level::Three => Some(Level::Four),
            Level::Four => None,
        }
    }

    /// The next level up the ladder, or `None` from the top.
    pub fn promoted(self) -> Option<Level> {
        match self {
            Level::One => None,
            Level::Two => Some(Level::One),
            Level::Three => Some(Level::Two),
            Level::Four => Some(Level::Three),
        }
    }
}

/// One burst/IO/repeat behavior description. Consecutive input records that
/// share a pid queue up as later phases of the same process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub burst: usize,
    pub io: usize,
    pub repeat: usize,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub pid: usize,
    pub arrival_time: usize,

    // Current phase and its live countdowns.
    pub burst: usize,
    pub io: usize,
    pub repeat: usize,
    pub burst_remaining: usize,
    pub io_remaining: usize,

    pub level: Level,
    pub quantum: usize,
    pub quantum_remaining: usize,
    pub cpu_usage: usize,

    // Behavior streaks and the level-specific limits that end them.
    pub good: usize,
    pub bad: usize,
    pub good_limit: Option<usize>,
    pub bad_limit: Option<usize>,

    pub next_phases: VecDeque<Phase>,
}

impl Process {
    pub fn new(arrival_time: usize, pid: usize, phase: Phase) -> Process {
        let mut proc = Process {
            pid,
            arrival_time,
            burst: phase.burst,
            io: phase.io,
            repeat: phase.repeat,
            burst_remaining: phase.burst,
            io_remaining: phase.io,
            level: Level::One,
            quantum: 0,
            quantum_remaining: 0,
            cpu_usage: 0,
            good: 0,
            bad: 0,
            good_limit: None,
            bad_limit: None,
            next_phases: VecDeque::new(),
        };
        proc.enter_level(Level::One);
        proc
    }

    /// Move the record onto `level`: adopt the level's parameters, grant a
    /// fresh quantum, and clear both behavior streaks.
    pub fn enter_level(&mut self, level: Level) {
        let params = level.params();
        self.level = level;
        self.quantum = params.quantum;
        self.quantum_remaining = params.quantum;
        self.bad_limit = params.bad_limit;
        self.good_limit = params.good_limit;
        self.bad = 0;
        self.good = 0;
    }

    /// Account one finished CPU burst against the behavior streaks: an
    /// exhausted quantum is a bad mark; a clean burst extends the good streak
    /// only while no bad marks are outstanding, and otherwise forgives them.
    /// Re-arms the quantum for the next dispatch.
    pub fn score_finished_burst(&mut self) {
        if self.quantum_remaining == 0 {
            self.bad += 1;
        } else if self.bad == 0 {
            self.good += 1;
        } else {
            self.bad = 0;
        }
        self.quantum_remaining = self.quantum;
    }

    /// One I/O cycle just completed: consume a repeat, then either re-arm
    /// the current phase, splice in the next queued phase, or leave a final
    /// CPU burst to run out before termination.
    pub fn finish_io_cycle(&mut self) {
        self.repeat = self.repeat.saturating_sub(1);
        if self.repeat == 0 {
            if let Some(phase) = self.next_phases.pop_front() {
                self.burst = phase.burst;
                self.burst_remaining = phase.burst;
                self.io = phase.io;
                self.io_remaining = phase.io;
                self.repeat = phase.repeat;
            } else {
                self.burst_remaining = self.burst;
            }
        } else {
            self.burst_remaining = self.burst;
            self.io_remaining = self.io;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parameter_table() {
        assert_eq!(
            Level::One.params(),
            LevelParams {
                quantum: 10,
                bad_limit: Some(1),
                good_limit: None
            }
        );
        assert_eq!(
            Level::Two.params(),
            LevelParams {
                quantum: 30,
                bad_limit: Some(2),
                good_limit: Some(1)
            }
        );
        assert_eq!(
            Level::Three.params(),
            LevelParams {
                quantum: 100,
                bad_limit: Some(2),
                good_limit: Some(2)
            }
        );
        assert_eq!(
            Level::Four.params(),
            LevelParams {
                quantum: 200,
                bad_limit: None,
                good_limit: Some(2)
            }
        );
    }

    #[test]
    fn ladder_neighbors() {
        assert_eq!(Level::One.demoted(), Some(Level::Two));
        assert_eq!(Level::Four.demoted(), None);
        assert_eq!(Level::One.promoted(), None);
        assert_eq!(Level::Four.promoted(), Some(Level::Three));
    }

    #[test]
    fn higher_priority_compares_smaller() {
        assert!(Level::One < Level::Two);
        assert!(Level::Three < Level::Four);
    }

    #[test]
    fn enter_level_adopts_parameters_and_clears_streaks() {
        let mut proc = Process::new(
            0,
            1,
            Phase {
                burst: 50,
                io: 2,
                repeat: 1,
            },
        );
        proc.bad = 1;
        proc.good = 1;
        proc.enter_level(Level::Two);
        assert_eq!(proc.level, Level::Two);
        assert_eq!(proc.quantum, 30);
        assert_eq!(proc.quantum_remaining, 30);
        assert_eq!(proc.bad_limit, Some(2));
        assert_eq!(proc.good_limit, Some(1));
        assert_eq!(proc.bad, 0);
        assert_eq!(proc.good, 0);
    }

    #[test]
    fn score_finished_burst_follows_streak_rules() {
        let mut proc = Process::new(
            0,
            1,
            Phase {
                burst: 10,
                io: 5,
                repeat: 3,
            },
        );
        proc.quantum_remaining = 0;
        proc.score_finished_burst();
        assert_eq!((proc.bad, proc.good), (1, 0));
        assert_eq!(proc.quantum_remaining, proc.quantum);

        // A clean burst with a bad mark outstanding forgives it.
        proc.quantum_remaining = 4;
        proc.score_finished_burst();
        assert_eq!((proc.bad, proc.good), (0, 0));

        // A clean burst with no bad marks extends the good streak.
        proc.quantum_remaining = 4;
        proc.score_finished_burst();
        assert_eq!((proc.bad, proc.good), (0, 1));
    }

    #[test]
    fn finish_io_cycle_rearms_splices_and_drains() {
        let mut proc = Process::new(
            0,
            1,
            Phase {
                burst: 5,
                io: 2,
                repeat: 2,
            },
        );
        proc.burst_remaining = 0;
        proc.io_remaining = 0;

        // repeat 2 -> 1: re-arm the current phase.
        proc.finish_io_cycle();
        assert_eq!(
            (proc.repeat, proc.burst_remaining, proc.io_remaining),
            (1, 5, 2)
        );

        // repeat 1 -> 0 with a queued phase: splice it in.
        proc.next_phases.push_back(Phase {
            burst: 9,
            io: 4,
            repeat: 3,
        });
        proc.burst_remaining = 0;
        proc.io_remaining = 0;
        proc.finish_io_cycle();
        assert_eq!((proc.burst, proc.io, proc.repeat), (9, 4, 3));
        assert_eq!((proc.burst_remaining, proc.io_remaining), (9, 4));
        assert!(proc.next_phases.is_empty());

        // repeat -> 0 with no successor: one last burst, no more I/O.
        proc.repeat = 1;
        proc.burst_remaining = 0;
        proc.io_remaining = 0;
        proc.finish_io_cycle();
        assert_eq!(
            (proc.repeat, proc.burst_remaining, proc.io_remaining),
            (0, 9, 0)
        );
    }
}
