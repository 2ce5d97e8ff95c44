use crate::error::SimError;
use crate::process::{Poll, Process, Spawner};
use crate::time::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// One entry in the event heap: a process frozen at a wake-up time.
///
/// `seq` breaks ties between events scheduled at the same time in FIFO
/// insertion order, per the ordering guarantee in the concurrency model
/// ("events at equal times execute in insertion order").
#[derive(Debug)]
struct ScheduledEvent {
    time: SimTime,
    seq: u64,
    process: Box<dyn Process>,
}

impl ScheduledEvent {
    fn key(&self) -> (SimTime, u64) {
        (self.time, self.seq)
    }
}

// `BinaryHeap` is a max-heap; flip the comparison so the earliest (time,
// seq) pair sorts highest and comes out of `pop()` first.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}

/// The single-threaded cooperative discrete-event scheduler.
///
/// There is exactly one virtual clock, advanced only by [`Scheduler::step`].
/// Processes are resumable state machines (see [`Process`]); the scheduler
/// itself knows nothing about what a process represents, mirroring the
/// teacher's separation between `rustasim-engine` (scheduling) and
/// `rustasim-models` (the domain).
#[derive(Debug, Default)]
pub struct Scheduler {
    now: SimTime,
    next_seq: u64,
    queue: BinaryHeap<ScheduledEvent>,
}

impl Scheduler {
    /// Builds an empty scheduler at `t = 0`.
    pub fn new() -> Scheduler {
        Scheduler {
            now: SimTime::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// The current virtual time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Registers `process` to begin running at `time`.
    ///
    /// `time` may be in the past relative to `now()` only at setup, before
    /// the first `step()`; once the clock has advanced this would violate
    /// the monotonic-time guarantee, so callers should prefer
    /// [`Spawner::spawn_at`]/`spawn_after` from inside `advance` for
    /// anything scheduled mid-run.
    pub fn spawn_at(&mut self, time: SimTime, process: Box<dyn Process>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent { time, seq, process });
    }

    /// Registers `process` to begin running immediately (at `now()`).
    pub fn spawn(&mut self, process: Box<dyn Process>) {
        let now = self.now;
        self.spawn_at(now, process);
    }

    /// The time of the next pending event, without executing it.
    pub fn peek(&self) -> Result<SimTime, SimError> {
        self.queue
            .peek()
            .map(|scheduled| scheduled.time)
            .ok_or(SimError::NoEvents)
    }

    /// Whether any event remains pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advances the clock to the earliest pending event and executes it.
    ///
    /// Fails with [`SimError::NoEvents`] if the queue is empty; this is the
    /// expected, clean end-of-simulation signal, not a bug.
    pub fn step(&mut self) -> Result<(), SimError> {
        let mut scheduled = self.queue.pop().ok_or(SimError::NoEvents)?;
        self.now = scheduled.time;

        let mut spawner = Spawner::new();
        let poll = scheduled.process.advance(self.now, &mut spawner);

        for (time, process) in spawner.pending {
            self.spawn_at(time, process);
        }

        match poll {
            Poll::Continue(time) => {
                debug_assert!(
                    time >= self.now,
                    "a process may not reschedule itself in the past"
                );
                self.spawn_at(time, scheduled.process);
            }
            Poll::Done => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Recorder {
        tag: &'static str,
        fires: Rc<RefCell<Vec<&'static str>>>,
        remaining: u32,
        period: f64,
    }

    impl Process for Recorder {
        fn advance(&mut self, now: SimTime, _spawner: &mut Spawner) -> Poll {
            self.fires.borrow_mut().push(self.tag);
            self.remaining -= 1;
            if self.remaining == 0 {
                Poll::Done
            } else {
                Poll::Continue(now + self.period)
            }
        }
    }

    #[test]
    fn steps_in_time_order() {
        let fires = Rc::new(RefCell::new(Vec::new()));
        let mut sched = Scheduler::new();
        sched.spawn_at(
            SimTime::from_secs(2.0),
            Box::new(Recorder {
                tag: "late",
                fires: fires.clone(),
                remaining: 1,
                period: 1.0,
            }),
        );
        sched.spawn_at(
            SimTime::from_secs(1.0),
            Box::new(Recorder {
                tag: "early",
                fires: fires.clone(),
                remaining: 1,
                period: 1.0,
            }),
        );

        sched.step().unwrap();
        sched.step().unwrap();

        assert_eq!(*fires.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn ties_break_fifo() {
        let fires = Rc::new(RefCell::new(Vec::new()));
        let mut sched = Scheduler::new();
        sched.spawn_at(
            SimTime::ZERO,
            Box::new(Recorder {
                tag: "first",
                fires: fires.clone(),
                remaining: 1,
                period: 1.0,
            }),
        );
        sched.spawn_at(
            SimTime::ZERO,
            Box::new(Recorder {
                tag: "second",
                fires: fires.clone(),
                remaining: 1,
                period: 1.0,
            }),
        );

        sched.step().unwrap();
        sched.step().unwrap();

        assert_eq!(*fires.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn reschedules_continue_and_drops_done() {
        let fires = Rc::new(RefCell::new(Vec::new()));
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Recorder {
            tag: "loop",
            fires: fires.clone(),
            remaining: 3,
            period: 0.5,
        }));

        while sched.step().is_ok() {}

        assert_eq!(*fires.borrow(), vec!["loop", "loop", "loop"]);
        assert_eq!(sched.now(), SimTime::from_secs(1.0));
    }

    #[test]
    fn step_on_empty_queue_is_no_events() {
        let mut sched = Scheduler::new();
        assert!(matches!(sched.step(), Err(SimError::NoEvents)));
        assert!(matches!(sched.peek(), Err(SimError::NoEvents)));
    }

    #[derive(Debug)]
    struct Spawns {
        done: bool,
    }

    impl Process for Spawns {
        fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
            if !self.done {
                self.done = true;
                spawner.spawn_after(now, 0.25, Box::new(Leaf));
                Poll::Continue(now + 1.0)
            } else {
                Poll::Done
            }
        }
    }

    #[derive(Debug)]
    struct Leaf;

    impl Process for Leaf {
        fn advance(&mut self, _now: SimTime, _spawner: &mut Spawner) -> Poll {
            Poll::Done
        }
    }

    #[test]
    fn processes_can_spawn_other_processes() {
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Spawns { done: false }));

        // first step runs Spawns, which enqueues Leaf at t=0.25
        sched.step().unwrap();
        assert_eq!(sched.peek().unwrap(), SimTime::from_secs(0.25));

        // second step runs the spawned Leaf
        sched.step().unwrap();
        assert_eq!(sched.now(), SimTime::from_secs(0.25));

        // third step runs Spawns again, now at t=1.0, and it's Done
        sched.step().unwrap();
        assert_eq!(sched.now(), SimTime::from_secs(1.0));
        assert!(sched.is_empty());
    }
}
