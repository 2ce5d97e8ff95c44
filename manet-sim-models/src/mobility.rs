use crate::context::SimContext;
use manet_sim_engine::{Poll, Process, SimTime, Spawner};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SUBSTEP_SECS: f64 = 0.1;

/// Random-waypoint-with-bounce. Alternates between moving in 0.1 s
/// sub-steps for `pause_time` seconds and sitting idle for `pause_time`
/// seconds, picking a fresh direction at the start of every move window.
///
/// Grounded on `manet_models.py::Node.move`'s outer/inner `while` loop;
/// exits as soon as the stop flag is observed, same as the original's
/// `while not get_stop()`.
#[derive(Debug)]
pub struct Mobility {
    ctx: SimContext,
    node_id: usize,
    phase: Phase,
    rng: StdRng,
}

#[derive(Debug)]
enum Phase {
    Moving { elapsed: f64 },
    Idle,
}

impl Mobility {
    pub fn new(ctx: SimContext, node_id: usize, seed: u64) -> Mobility {
        let mut rng = StdRng::seed_from_u64(seed);
        ctx.nodes.borrow_mut()[node_id].pick_new_direction(&mut rng);
        Mobility {
            ctx,
            node_id,
            phase: Phase::Moving { elapsed: 0.0 },
            rng,
        }
    }
}

impl Process for Mobility {
    fn advance(&mut self, now: SimTime, _spawner: &mut Spawner) -> Poll {
        if self.ctx.stop.is_stopped() {
            return Poll::Done;
        }

        match &mut self.phase {
            Phase::Moving { elapsed } => {
                let pause_time = {
                    let mut nodes = self.ctx.nodes.borrow_mut();
                    nodes[self.node_id].step_substep(SUBSTEP_SECS, self.ctx.area);
                    nodes[self.node_id].pause_time
                };
                crate::neighbors::refresh_one(&mut self.ctx.nodes.borrow_mut(), self.node_id);

                *elapsed += SUBSTEP_SECS;
                if *elapsed >= pause_time {
                    self.phase = Phase::Idle;
                    Poll::Continue(now + pause_time)
                } else {
                    Poll::Continue(now + SUBSTEP_SECS)
                }
            }
            Phase::Idle => {
                self.ctx.nodes.borrow_mut()[self.node_id].pick_new_direction(&mut self.rng);
                self.phase = Phase::Moving { elapsed: 0.0 };
                // no delay between picking a waypoint and the first step
                // towards it, matching the source's un-yielded transition
                Poll::Continue(now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::metrics::Metrics;
    use crate::node::NodeBuilder;
    use crate::protocols::{Protocol, ProtocolKind};
    use manet_sim_engine::{Scheduler, StopFlag};
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ctx_with_one_node(pause_time: f64) -> SimContext {
        let mut rng = StdRng::seed_from_u64(42);
        let node = NodeBuilder::new(0)
            .position((50.0, 50.0))
            .pause_time(pause_time)
            .build(&mut rng);
        SimContext {
            nodes: Rc::new(RefCell::new(vec![node])),
            routing: Rc::new(RefCell::new(Protocol::new(ProtocolKind::Aodv, 1))),
            metrics: Rc::new(RefCell::new(Metrics::default())),
            stop: StopFlag::new(),
            area: (100.0, 100.0),
            log: slog::Logger::root(slog::Discard, slog::o!()),
        }
    }

    #[test]
    fn alternates_moving_and_idle_windows() {
        let ctx = ctx_with_one_node(0.3);
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Mobility::new(ctx.clone(), 0, 1)));

        // 3 sub-steps of the move window, then the idle window, then one
        // more sub-step of the next move window.
        for _ in 0..5 {
            sched.step().unwrap();
        }

        assert!(sched.now() > SimTime::from_secs(0.3));
    }

    #[test]
    fn stop_flag_ends_the_process() {
        let ctx = ctx_with_one_node(1.0);
        ctx.stop.request_stop();
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Mobility::new(ctx, 0, 2)));
        sched.step().unwrap();
        assert!(sched.is_empty());
    }

    #[test]
    fn energy_decreases_only_while_moving() {
        let ctx = ctx_with_one_node(0.2);
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(Mobility::new(ctx.clone(), 0, 3)));

        sched.step().unwrap(); // sub-step 1
        sched.step().unwrap(); // sub-step 2, enters Idle
        let energy_after_move = ctx.nodes.borrow()[0].energy_used;
        assert!(energy_after_move > 0.0);

        sched.step().unwrap(); // idle -> pick new direction, no energy debit
        assert_eq!(ctx.nodes.borrow()[0].energy_used, energy_after_move);
    }
}
