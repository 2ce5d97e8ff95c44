use crate::node::Node;
use std::collections::HashMap;

/// One destination's entry in a node's distance-vector table.
#[derive(Debug, Clone, Copy)]
pub struct DvEntry {
    pub next_hop: Option<usize>,
    pub metric: u32,
    pub seq: u64,
}

/// The metric-only relaxing distance-vector table shared by DSDV and
/// OLSR's simplified core (§9: "OLSR ... updated by the same
/// distance-vector mechanics as DSDV").
///
/// Grounded on `protocols.py::DSDV._periodic_update`. Sequence-number
/// ordering is a recognized refinement the minimal core omits; routes
/// here relax purely on strictly-lower metric, which can momentarily
/// accept a stale route after a link break (flagged, not fixed, per the
/// spec's own Open Questions).
#[derive(Debug)]
pub struct DvTable {
    tables: Vec<HashMap<usize, DvEntry>>,
    seq_num: Vec<u64>,
}

impl DvTable {
    pub fn new(num_nodes: usize) -> DvTable {
        let mut tables = Vec::with_capacity(num_nodes);
        for id in 0..num_nodes {
            let mut table = HashMap::with_capacity(num_nodes);
            for other in 0..num_nodes {
                let entry = if other == id {
                    DvEntry {
                        next_hop: Some(id),
                        metric: 0,
                        seq: 0,
                    }
                } else {
                    DvEntry {
                        next_hop: None,
                        metric: u32::MAX,
                        seq: 0,
                    }
                };
                table.insert(other, entry);
            }
            tables.push(table);
        }
        DvTable {
            tables,
            seq_num: vec![0; num_nodes],
        }
    }

    /// One advertisement round: bumps every node's own sequence number by
    /// 2, then offers every table entry to every current neighbor,
    /// relaxing on strictly-better metric. Returns the overhead incurred.
    pub fn advertise(&mut self, nodes: &[Node]) -> u64 {
        let mut overhead = 0u64;

        for node in nodes {
            self.seq_num[node.id] += 2;
            if let Some(self_entry) = self.tables[node.id].get_mut(&node.id) {
                self_entry.seq = self.seq_num[node.id];
            }
        }

        for node in nodes {
            // Snapshot this node's table once; later neighbors in this same
            // pass can still observe updates an earlier neighbor's offer
            // installed into *their* table, matching the source's
            // mid-tick mutation rather than a simultaneous-round model.
            let entries: Vec<(usize, DvEntry)> =
                self.tables[node.id].iter().map(|(&d, &e)| (d, e)).collect();

            for &neighbor_id in &node.neighbors {
                overhead += entries.len() as u64;
                for &(dest, entry) in &entries {
                    let Some(_) = entry.next_hop else {
                        continue;
                    };
                    let new_metric = entry.metric.saturating_add(1);
                    let neighbor_table = &mut self.tables[neighbor_id];
                    let accept = match neighbor_table.get(&dest) {
                        Some(cur) => new_metric < cur.metric,
                        None => true,
                    };
                    if accept {
                        neighbor_table.insert(
                            dest,
                            DvEntry {
                                next_hop: Some(node.id),
                                metric: new_metric,
                                seq: entry.seq,
                            },
                        );
                    }
                }
            }
        }

        overhead
    }

    /// Writes every known next-hop into each node's generic routing table.
    pub fn sync_into(&self, nodes: &mut [Node]) {
        for node in nodes.iter_mut() {
            for (&dest, entry) in &self.tables[node.id] {
                if let Some(next_hop) = entry.next_hop {
                    node.routing_table.insert(dest, next_hop);
                }
            }
        }
    }
}
