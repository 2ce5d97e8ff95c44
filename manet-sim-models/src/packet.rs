use manet_sim_engine::SimTime;

/// A single data packet in flight between two nodes.
///
/// Grounded on `manet_models.py::Packet`. `source_route`, when present,
/// tells the shared queue handler (see [`crate::queue`]) to forward by
/// walking this embedded path instead of consulting the receiving node's
/// `routing_table` - this is how DSR's per-(src,dst) cached path reaches
/// intermediate forwarders without a table-based dispatch.
#[derive(Debug, Clone)]
pub struct Packet {
    pub src: usize,
    pub dst: usize,
    pub created_at: SimTime,
    pub size_bytes: u64,
    /// `(forwarder id, time)` pairs in the order the packet was relayed.
    pub hops: Vec<(usize, SimTime)>,
    pub last_hop: usize,
    pub delivered_at: Option<SimTime>,
    pub source_route: Option<Vec<usize>>,
}

/// Default packet size, matching the fixed-size payload used throughout
/// the original simulator's traffic generator.
pub const DEFAULT_PACKET_SIZE_BYTES: u64 = 512;

impl Packet {
    pub fn new(src: usize, dst: usize, created_at: SimTime) -> Packet {
        Packet {
            src,
            dst,
            created_at,
            size_bytes: DEFAULT_PACKET_SIZE_BYTES,
            hops: Vec::new(),
            last_hop: src,
            delivered_at: None,
            source_route: None,
        }
    }
}
