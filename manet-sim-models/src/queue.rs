use crate::context::SimContext;
use crate::packet::Packet;
use manet_sim_engine::{Poll, Process, SimTime, Spawner};

const LINK_RATE_BYTES_PER_SEC: f64 = 2.0 * 1024.0;
const FORWARD_ENERGY_JOULES: f64 = 0.1;
const NO_ROUTE_YIELD_SECS: f64 = 0.001;

/// Enqueues `packet` at `node_id` and, if no handler is currently
/// draining that node's queue, spawns one.
///
/// Grounded on `protocols.py::BaseRouting.send_packet`'s
/// `packet_handler.processed` check, generalized into an explicit
/// `handler_active` flag since there's no coroutine object to query.
pub fn enqueue(ctx: &SimContext, node_id: usize, packet: Packet, now: SimTime, spawner: &mut Spawner) {
    let needs_handler = {
        let mut nodes = ctx.nodes.borrow_mut();
        nodes[node_id].queue.push_back(packet);
        let already_active = nodes[node_id].handler_active;
        if !already_active {
            nodes[node_id].handler_active = true;
        }
        !already_active
    };

    if needs_handler {
        spawner.spawn_at(
            now,
            Box::new(Handler {
                ctx: ctx.clone(),
                node_id,
            }),
        );
    }
}

/// Drains one node's queue one packet at a time, serializing every
/// forwarding decision at that node. Grounded on
/// `protocols.py::BaseRouting._handle_packets`.
#[derive(Debug)]
struct Handler {
    ctx: SimContext,
    node_id: usize,
}

impl Process for Handler {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        if self.ctx.stop.is_stopped() {
            self.ctx.nodes.borrow_mut()[self.node_id].handler_active = false;
            return Poll::Done;
        }

        let packet = {
            let mut nodes = self.ctx.nodes.borrow_mut();
            match nodes[self.node_id].queue.pop_front() {
                Some(p) => p,
                None => {
                    nodes[self.node_id].handler_active = false;
                    return Poll::Done;
                }
            }
        };

        if packet.dst == self.node_id {
            let mut packet = packet;
            packet.delivered_at = Some(now);
            let delay = now.as_secs() - packet.created_at.as_secs();
            self.ctx.metrics.borrow_mut().record_delivered(delay);
            return Poll::Continue(now);
        }

        let next_hop = self.next_hop_for(&packet);
        let is_reachable = next_hop
            .map(|h| self.ctx.nodes.borrow()[self.node_id].neighbors.contains(&h))
            .unwrap_or(false);

        match (next_hop, is_reachable) {
            (Some(next_hop), true) => {
                let mut packet = packet;
                packet.hops.push((self.node_id, now));
                packet.last_hop = self.node_id;
                let delay = packet.size_bytes as f64 / LINK_RATE_BYTES_PER_SEC;

                spawner.spawn_after(
                    now,
                    delay,
                    Box::new(ForwardDeliver {
                        ctx: self.ctx.clone(),
                        node_id: self.node_id,
                        next_hop,
                        packet,
                    }),
                );
                Poll::Continue(now + delay)
            }
            _ => {
                self.ctx
                    .routing
                    .borrow_mut()
                    .on_no_route(&self.ctx, self.node_id, packet, now, spawner);
                Poll::Continue(now + NO_ROUTE_YIELD_SECS)
            }
        }
    }
}

impl Handler {
    fn next_hop_for(&self, packet: &Packet) -> Option<usize> {
        if let Some(route) = &packet.source_route {
            let idx = route.iter().position(|&n| n == self.node_id)?;
            route.get(idx + 1).copied()
        } else {
            self.ctx.nodes.borrow()[self.node_id]
                .routing_table
                .get(&packet.dst)
                .copied()
        }
    }
}

/// The in-flight half of a forward: fires once the transmission delay
/// has elapsed, debits the sender's energy, and enqueues at the next
/// hop. Split out of [`Handler`] so the handler itself can resume
/// draining the queue at the same resumed time without re-running the
/// send.
#[derive(Debug)]
struct ForwardDeliver {
    ctx: SimContext,
    node_id: usize,
    next_hop: usize,
    packet: Packet,
}

impl Process for ForwardDeliver {
    fn advance(&mut self, now: SimTime, spawner: &mut Spawner) -> Poll {
        self.ctx.nodes.borrow_mut()[self.node_id].consume_energy(FORWARD_ENERGY_JOULES);
        enqueue(&self.ctx, self.next_hop, self.packet.clone(), now, spawner);
        Poll::Done
    }
}
