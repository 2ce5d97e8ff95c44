use crate::context::SimContext;
use crate::packet::Packet;
use crate::protocols::Protocol;
use crate::queue;
use manet_sim_engine::{Poll, Process, SimTime, Spawner};
use std::collections::HashMap;

const HOP_DELAY_SECS: f64 = 0.01;
const SEEN_WINDOW_SECS: f64 = 10.0;

#[derive(Debug, Clone)]
struct DsrRreq {
    src: usize,
    dst: usize,
    rreq_id: u64,
    path_taken: Vec<usize>,
}

/// Source routing with a route cache keyed by (src, dst) -> full id-path.
///
/// `protocols.py`'s `DSR` stub only consults a pre-populated cache; the
/// RREQ-flood discovery this type performs follows §4.7 of the design
/// this imitates, adapted from [`super::aodv::Aodv`]'s discovery shape:
/// accumulate the visited path in the request itself rather than
/// recording per-node reverse-route table entries, since the destination
/// needs the complete path, not just the next hop back.
#[derive(Debug, Default)]
pub struct Dsr {
    cache: HashMap<(usize, usize), Vec<usize>>,
    seen: HashMap<(usize, usize, u64), SimTime>,
    rreq_id: u64,
    pending: HashMap<(usize, usize), Vec<Packet>>,
    overhead: u64,
}

impl Dsr {
    pub fn new() -> Dsr {
        Dsr::default()
    }

    pub fn overhead(&self) -> u64 {
        self.overhead
    }

    pub fn cached_path(&self, src: usize, dst: usize) -> Option<&Vec<usize>> {
        self.cache.get(&(src, dst))
    }

    pub fn try_send(&mut self, ctx: &SimContext, packet: Packet, now: SimTime, spawner: &mut Spawner) {
        let src = packet.src;
        let dst = packet.dst;

        if let Some(path) = self.cache.get(&(src, dst)) {
            if let Some(idx) = path.iter().position(|&n| n == src) {
                if idx + 1 < path.len() {
                    let mut routed = packet;
                    routed.source_route = Some(path.clone());
                    queue::enqueue(ctx, src, routed, now, spawner);
                    return;
                }
            }
        }

        self.pending.entry((src, dst)).or_default().push(packet);
        self.initiate_discovery(ctx, src, dst, now, spawner);
    }

    /// Called when `node_id` finds the cached source route for
    /// `(packet.src, packet.dst)` points at a hop that's no longer a
    /// neighbor. Evicts that stale cache entry so it stops being handed
    /// out, then drops the packet — mirrors
    /// `protocols.py::BaseRouting._handle_packets`, which never resubmits
    /// a packet broken mid-route. Only when `node_id` is the packet's own
    /// originator does evicting the entry matter for *this* call:
    /// re-running `try_send` now correctly misses the cache and starts a
    /// fresh discovery, instead of looping back into the same dead path
    /// the source's cache entry still named.
    pub fn handle_no_route(&mut self, ctx: &SimContext, node_id: usize, packet: Packet, now: SimTime, spawner: &mut Spawner) {
        self.cache.remove(&(packet.src, packet.dst));
        if node_id == packet.src {
            self.try_send(ctx, packet, now, spawner);
        }
    }

    fn initiate_discovery(&mut self, ctx: &SimContext, src: usize, dst: usize, now: SimTime, spawner: &mut Spawner) {
        self.rreq_id += 1;
        self.overhead += 1;

        let rreq = DsrRreq {
            src,
            dst,
            rreq_id: self.rreq_id,
            path_taken: vec![src],
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

    fn handle_rreq(&mut self, ctx: &SimContext, node_id: usize, mut rreq: DsrRreq, now: SimTime, spawner: &mut Spawner) {
        self.evict_stale(now);
        let key = (node_id, rreq.src, rreq.rreq_id);
        if self.seen.contains_key(&key) {
            return;
        }
        self.seen.insert(key, now);

        rreq.path_taken.push(node_id);

        if node_id == rreq.dst {
            self.send_rrep(ctx, rreq, now, spawner);
            return;
        }

        let neighbors = ctx.nodes.borrow()[node_id].neighbors.clone();
        for neighbor in neighbors {
            if rreq.path_taken.contains(&neighbor) {
                continue;
            }
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

    fn send_rrep(&mut self, ctx: &SimContext, rreq: DsrRreq, now: SimTime, spawner: &mut Spawner) {
        let path = rreq.path_taken;
        let mut reverse = path.clone();
        reverse.reverse();

        self.cache.insert((rreq.src, rreq.dst), path.clone());
        self.cache.insert((rreq.dst, rreq.src), reverse);
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
    rreq: DsrRreq,
}

impl Process for RreqDeliver {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        if self.ctx.stop.is_stopped() {
            return Poll::Done;
        }
        let target = self.target;
        let rreq = self.rreq.clone();
        let mut routing = self.ctx.routing.borrow_mut();
        if let Protocol::Dsr(state) = &mut *routing {
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
            if let Protocol::Dsr(state) = &mut *routing {
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
