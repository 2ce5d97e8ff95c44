use crate::context::SimContext;
use crate::metrics::Metrics;
use crate::mobility::Mobility;
use crate::neighbors;
use crate::node::NodeBuilder;
use crate::protocols::{Protocol, ProtocolKind};
use manet_sim_engine::{Scheduler, StopFlag};
use rand::Rng;
use std::cell::RefCell;
use std::rc::Rc;

/// Assembles a [`SimContext`] for a fresh run: places `num_nodes` nodes
/// uniformly at random in the arena, computes the initial neighbor sets,
/// and constructs the chosen protocol's state.
///
/// Mirrors the teacher's `RouterBuilder`/`ServerBuilder` pattern, scaled
/// up to build the whole shared simulation context rather than one node.
#[derive(Debug, Clone)]
pub struct WorldBuilder {
    num_nodes: usize,
    area: (f64, f64),
    protocol: ProtocolKind,
    node_speed: f64,
    pause_time: f64,
    tx_range: f64,
    log: Option<slog::Logger>,
}

impl WorldBuilder {
    pub fn new(num_nodes: usize, area: (f64, f64)) -> WorldBuilder {
        WorldBuilder {
            num_nodes,
            area,
            protocol: ProtocolKind::Aodv,
            node_speed: 5.0,
            pause_time: 2.0,
            tx_range: 100.0,
            log: None,
        }
    }

    pub fn protocol(mut self, protocol: ProtocolKind) -> WorldBuilder {
        self.protocol = protocol;
        self
    }

    pub fn node_speed(mut self, speed: f64) -> WorldBuilder {
        self.node_speed = speed;
        self
    }

    pub fn pause_time(mut self, pause_time: f64) -> WorldBuilder {
        self.pause_time = pause_time;
        self
    }

    pub fn tx_range(mut self, tx_range: f64) -> WorldBuilder {
        self.tx_range = tx_range;
        self
    }

    pub fn logger(mut self, log: slog::Logger) -> WorldBuilder {
        self.log = Some(log);
        self
    }

    pub fn build(self, rng: &mut impl Rng) -> SimContext {
        let mut nodes = Vec::with_capacity(self.num_nodes);
        for id in 0..self.num_nodes {
            let position = (
                rng.gen_range(0.0..=self.area.0),
                rng.gen_range(0.0..=self.area.1),
            );
            nodes.push(
                NodeBuilder::new(id)
                    .position(position)
                    .speed(self.node_speed)
                    .pause_time(self.pause_time)
                    .tx_range(self.tx_range)
                    .build(rng),
            );
        }
        neighbors::refresh_all(&mut nodes);

        SimContext {
            nodes: Rc::new(RefCell::new(nodes)),
            routing: Rc::new(RefCell::new(Protocol::new(self.protocol, self.num_nodes))),
            metrics: Rc::new(RefCell::new(Metrics::default())),
            stop: StopFlag::new(),
            area: self.area,
            log: self.log.unwrap_or_else(|| slog::Logger::root(slog::Discard, slog::o!())),
        }
    }
}

/// Spawns every node's mobility process plus the active protocol's
/// periodic maintenance processes (neighbor refresh, proactive
/// advertisement, MPR selection). The traffic generator is a separate
/// concern the run controller spawns itself, since its rate and horizon
/// come from run configuration rather than the world.
pub fn spawn_all(ctx: &SimContext, scheduler: &mut Scheduler, seed: u64) {
    for node_id in 0..ctx.nodes.borrow().len() {
        scheduler.spawn(Box::new(Mobility::new(ctx.clone(), node_id, seed.wrapping_add(node_id as u64))));
    }
    for process in ctx.routing.borrow().periodic_processes(ctx) {
        scheduler.spawn(process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn build_places_every_node_inside_the_arena() {
        let mut rng = StdRng::seed_from_u64(3);
        let ctx = WorldBuilder::new(20, (200.0, 200.0)).build(&mut rng);
        for node in ctx.nodes.borrow().iter() {
            assert!((0.0..=200.0).contains(&node.position.0));
            assert!((0.0..=200.0).contains(&node.position.1));
        }
    }

    #[test]
    fn spawn_all_registers_one_mobility_process_per_node() {
        let mut rng = StdRng::seed_from_u64(4);
        let ctx = WorldBuilder::new(5, (100.0, 100.0)).build(&mut rng);
        let mut sched = Scheduler::new();
        spawn_all(&ctx, &mut sched, 99);
        assert!(!sched.is_empty());
    }
}
