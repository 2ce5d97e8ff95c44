use crate::context::SimContext;
use crate::packet::Packet;
use manet_sim_engine::{Poll, Process, SimTime, Spawner};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Generates traffic at a fixed rate: sample two distinct nodes
/// uniformly, create a packet, submit it, sleep `1/rate` seconds.
///
/// Grounded on `simulator.py::MANETSimulator.generate_traffic`.
#[derive(Debug)]
pub struct TrafficGenerator {
    ctx: SimContext,
    rate_per_sec: f64,
    horizon: SimTime,
    rng: StdRng,
}

impl TrafficGenerator {
    pub fn new(ctx: SimContext, rate_per_sec: f64, horizon: SimTime, seed: u64) -> TrafficGenerator {
        TrafficGenerator {
            ctx,
            rate_per_sec,
            horizon,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Process for TrafficGenerator {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        if self.ctx.stop.is_stopped() || now >= self.horizon {
            return Poll::Done;
        }

        let num_nodes = self.ctx.nodes.borrow().len();
        if num_nodes >= 2 {
            let picked = index::sample(&mut self.rng, num_nodes, 2);
            let src = picked.index(0);
            let dst = picked.index(1);

            let packet = Packet::new(src, dst, now);
            self.ctx.metrics.borrow_mut().record_sent();
            self.ctx.routing.borrow_mut().submit(&self.ctx, packet, now, spawner);
        }

        Poll::Continue(now + 1.0 / self.rate_per_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::node::NodeBuilder;
    use crate::protocols::{Protocol, ProtocolKind};
    use manet_sim_engine::{Scheduler, StopFlag};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dense_ctx() -> SimContext {
        let mut rng = StdRng::seed_from_u64(0);
        let mut nodes: Vec<_> = (0..5)
            .map(|id| NodeBuilder::new(id).position((50.0, 50.0)).tx_range(1000.0).build(&mut rng))
            .collect();
        crate::neighbors::refresh_all(&mut nodes);

        SimContext {
            nodes: Rc::new(RefCell::new(nodes)),
            routing: Rc::new(RefCell::new(Protocol::new(ProtocolKind::Aodv, 5))),
            metrics: Rc::new(RefCell::new(Metrics::default())),
            stop: StopFlag::new(),
            area: (100.0, 100.0),
            log: slog::Logger::root(slog::Discard, slog::o!()),
        }
    }

    #[test]
    fn stops_at_the_horizon() {
        let ctx = dense_ctx();
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(TrafficGenerator::new(
            ctx.clone(),
            10.0,
            SimTime::from_secs(1.0),
            7,
        )));

        while sched.step().is_ok() {}

        assert!(sched.now() <= SimTime::from_secs(1.0 + 1e-9));
        assert!(ctx.metrics.borrow().total.packets_sent > 0);
    }

    #[test]
    fn stop_flag_ends_generation_immediately() {
        let ctx = dense_ctx();
        ctx.stop.request_stop();
        let mut sched = Scheduler::new();
        sched.spawn(Box::new(TrafficGenerator::new(
            ctx.clone(),
            10.0,
            SimTime::from_secs(10.0),
            7,
        )));
        sched.step().unwrap();
        assert!(sched.is_empty());
        assert_eq!(ctx.metrics.borrow().total.packets_sent, 0);
    }
}
