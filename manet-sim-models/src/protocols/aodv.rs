use crate::context::SimContext;
use crate::packet::Packet;
use crate::protocols::Protocol;
use crate::queue;
use manet_sim_engine::{Poll, Process, SimTime, Spawner};
use std::collections::HashMap;

/// RREQ/RREP propagation delay per hop. Not specified exactly by name;
/// picked to match the 0.01s the source uses for the RREP unicast-back
/// leg, reused here for RREQ forwarding too.
const HOP_DELAY_SECS: f64 = 0.01;
/// Seen-RREQ cache eviction window (§9: "implementations SHOULD bound
/// the cache with a time window, e.g. 10s").
const SEEN_WINDOW_SECS: f64 = 10.0;

#[derive(Debug, Clone)]
struct Rreq {
    src: usize,
    dst: usize,
    rreq_id: u64,
    src_seq: u64,
    #[allow(dead_code)]
    dst_seq: u64,
    hop_count: u32,
    ttl: u32,
    last_hop: usize,
}

/// Reactive route discovery. State: own sequence number, own RREQ
/// counter, a time-windowed dedup cache, reverse routes recorded while
/// an RREQ propagates, and packets buffered pending discovery.
///
/// Grounded on `protocols.py::AODV`.
#[derive(Debug, Default)]
pub struct Aodv {
    seq_num: u64,
    rreq_id: u64,
    seen: HashMap<(usize, usize, u64), SimTime>,
    reverse_route: HashMap<(usize, usize), usize>,
    pending: HashMap<(usize, usize), Vec<Packet>>,
    overhead: u64,
}

impl Aodv {
    pub fn new() -> Aodv {
        Aodv::default()
    }

    pub fn overhead(&self) -> u64 {
        self.overhead
    }

    pub fn try_send(&mut self, ctx: &SimContext, packet: Packet, now: SimTime, spawner: &mut Spawner) {
        let src = packet.src;
        let dst = packet.dst;
        let has_route = ctx.nodes.borrow()[src].routing_table.contains_key(&dst);
        if has_route {
            queue::enqueue(ctx, src, packet, now, spawner);
        } else {
            self.pending.entry((src, dst)).or_default().push(packet);
            self.initiate_discovery(ctx, src, dst, now, spawner);
        }
    }

    /// Called when `node_id` finds its routing-table entry for
    /// `packet.dst` points at a next hop that's no longer a neighbor.
    /// Evicts that stale entry so `node_id` stops offering it, then drops
    /// the packet — mirrors `protocols.py::BaseRouting._handle_packets`,
    /// which never resubmits a packet broken mid-route. Only when
    /// `node_id` is the packet's own originator does dropping the stale
    /// entry matter for *this* call: re-running `try_send` now correctly
    /// sees no route and starts a fresh discovery, instead of looping
    /// back into the same dead entry the source still held.
    pub fn handle_no_route(&mut self, ctx: &SimContext, node_id: usize, packet: Packet, now: SimTime, spawner: &mut Spawner) {
        ctx.nodes.borrow_mut()[node_id].routing_table.remove(&packet.dst);
        if node_id == packet.src {
            self.try_send(ctx, packet, now, spawner);
        }
    }

    fn initiate_discovery(
        &mut self,
        ctx: &SimContext,
        src: usize,
        dst: usize,
        now: SimTime,
        spawner: &mut Spawner,
    ) {
        self.rreq_id += 1;
        self.seq_num += 1;
        self.overhead += 1;

        let rreq = Rreq {
            src,
            dst,
            rreq_id: self.rreq_id,
            src_seq: self.seq_num,
            dst_seq: 0,
            hop_count: 0,
            ttl: 10,
            last_hop: src,
        };

        let neighbors = ctx.nodes.borrow()[src].neighbors.clone();
        for neighbor in neighbors {
            spawner.spawn_after(
                now,
                HOP_DELAY_SECS,
                Box::new(RreqDeliver {
                    ctx: ctx.clone(),
                    target: neighbor,
                    rreq: rreq.clone(),
                }),
            );
        }
    }

    fn evict_stale(&mut self, now: SimTime) {
        self.seen
            .retain(|_, seen_at| now.as_secs() - seen_at.as_secs() <= SEEN_WINDOW_SECS);
    }

    fn handle_rreq(&mut self, ctx: &SimContext, node_id: usize, mut rreq: Rreq, now: SimTime, spawner: &mut Spawner) {
        self.evict_stale(now);
        let key = (node_id, rreq.src, rreq.rreq_id);
        if self.seen.contains_key(&key) {
            return;
        }
        self.seen.insert(key, now);

        rreq.hop_count += 1;
        rreq.ttl = rreq.ttl.saturating_sub(1);

        if node_id != rreq.src {
            self.reverse_route.insert((node_id, rreq.src), rreq.last_hop);
        }

        if node_id == rreq.dst {
            self.send_rrep(ctx, node_id, rreq, now, spawner);
            return;
        }

        if rreq.ttl > 0 {
            let neighbors = ctx.nodes.borrow()[node_id].neighbors.clone();
            for neighbor in neighbors {
                if neighbor == rreq.last_hop {
                    continue;
                }
                let mut forwarded = rreq.clone();
                forwarded.last_hop = node_id;
                spawner.spawn_after(
                    now,
                    HOP_DELAY_SECS,
                    Box::new(RreqDeliver {
                        ctx: ctx.clone(),
                        target: neighbor,
                        rreq: forwarded,
                    }),
                );
            }
        }
    }

    fn send_rrep(&mut self, ctx: &SimContext, dst_node: usize, rreq: Rreq, now: SimTime, spawner: &mut Spawner) {
        let mut path = vec![dst_node];
        let mut current = dst_node;
        while current != rreq.src {
            let prev = match self.reverse_route.get(&(current, rreq.src)) {
                Some(&p) => p,
                None => return, // no reverse route recorded; discovery failed silently
            };
            path.push(prev);
            current = prev;
        }
        path.reverse();

        {
            let mut nodes = ctx.nodes.borrow_mut();
            for window in path.windows(2) {
                let (a, b) = (window[0], window[1]);
                nodes[a].routing_table.insert(rreq.dst, b);
            }
        }
        self.overhead += path.len().saturating_sub(1) as u64;

        let unicast_delay = path.len().saturating_sub(1) as f64 * HOP_DELAY_SECS;
        spawner.spawn_after(
            now,
            unicast_delay,
            Box::new(RrepArrival {
                ctx: ctx.clone(),
                src: rreq.src,
                dst: rreq.dst,
            }),
        );
    }

    fn take_pending(&mut self, src: usize, dst: usize) -> Vec<Packet> {
        self.pending.remove(&(src, dst)).unwrap_or_default()
    }
}

#[derive(Debug)]
struct RreqDeliver {
    ctx: SimContext,
    target: usize,
    rreq: Rreq,
}

impl Process for RreqDeliver {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        if self.ctx.stop.is_stopped() {
            return Poll::Done;
        }
        let target = self.target;
        let rreq = self.rreq.clone();
        let mut routing = self.ctx.routing.borrow_mut();
        if let Protocol::Aodv(state) = &mut *routing {
            state.handle_rreq(&self.ctx, target, rreq, now, spawner);
        }
        Poll::Done
    }
}

#[derive(Debug)]
struct RrepArrival {
    ctx: SimContext,
    src: usize,
    dst: usize,
}

impl Process for RrepArrival {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        let pkts = {
            let mut routing = self.ctx.routing.borrow_mut();
            if let Protocol::Aodv(state) = &mut *routing {
                state.take_pending(self.src, self.dst)
            } else {
                Vec::new()
            }
        };
        for pkt in pkts {
            self.ctx.routing.borrow_mut().submit(&self.ctx, pkt, now, spawner);
        }
        Poll::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::node::NodeBuilder;
    use crate::protocols::ProtocolKind;
    use manet_sim_engine::{Scheduler, StopFlag};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn chain_ctx() -> SimContext {
        let mut rng = StdRng::seed_from_u64(0);
        let mut nodes = vec![
            NodeBuilder::new(0).build(&mut rng),
            NodeBuilder::new(1).build(&mut rng),
            NodeBuilder::new(2).build(&mut rng),
        ];
        nodes[0].neighbors = vec![1];
        nodes[1].neighbors = vec![0, 2];
        nodes[2].neighbors = vec![1];

        SimContext {
            nodes: Rc::new(RefCell::new(nodes)),
            routing: Rc::new(RefCell::new(Protocol::new(ProtocolKind::Aodv, 3))),
            metrics: Rc::new(RefCell::new(Metrics::default())),
            stop: StopFlag::new(),
            area: (100.0, 100.0),
            log: slog::Logger::root(slog::Discard, slog::o!()),
        }
    }

    #[test]
    fn route_discovery_end_to_end_via_scheduler() {
        let ctx = chain_ctx();
        let mut sched = Scheduler::new();

        struct Kickoff {
            ctx: SimContext,
        }
        impl Process for Kickoff {
            fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
                let pkt = Packet::new(0, 2, now);
                self.ctx.routing.borrow_mut().submit(&self.ctx, pkt, now, spawner);
                Poll::Done
            }
        }
        sched.spawn(Box::new(Kickoff { ctx: ctx.clone() }));

        for _ in 0..20 {
            if sched.step().is_err() {
                break;
            }
        }

        assert_eq!(ctx.nodes.borrow()[0].routing_table.get(&2), Some(&1));
        assert_eq!(ctx.metrics.borrow().total.packets_received, 1);
    }
}
