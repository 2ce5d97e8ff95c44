use crate::node::Node;

/// Recomputes `nodes[id].neighbors` from every other node's current
/// position, O(N) in the number of nodes.
///
/// Symmetric only when every node shares the same `tx_range`; with
/// per-node ranges, `a` can hear `b` without `b` hearing `a`.
pub fn refresh_one(nodes: &mut [Node], id: usize) {
    let (pos, range) = {
        let n = &nodes[id];
        (n.position, n.tx_range)
    };

    let mut neighbor_ids = Vec::new();
    for other in nodes.iter() {
        if other.id == id {
            continue;
        }
        let dx = other.position.0 - pos.0;
        let dy = other.position.1 - pos.1;
        if (dx * dx + dy * dy).sqrt() <= range {
            neighbor_ids.push(other.id);
        }
    }

    nodes[id].neighbors = neighbor_ids;
}

/// Recomputes every node's neighbor set, O(N^2) total.
///
/// Acceptable at the node counts this simulator targets (a few hundred);
/// see the design note on recomputing rather than maintaining an
/// incremental spatial index.
pub fn refresh_all(nodes: &mut [Node]) {
    for id in 0..nodes.len() {
        refresh_one(nodes, id);
    }
}
