use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub energy: f64,
}

/// One point on the emitted stream (§4.10, §6).
///
/// `Periodic` records are emitted on a 1.0s cadence; exactly one `Final`
/// record closes the stream, whether the run reached its horizon or was
/// cut short by a stop request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmissionRecord {
    Periodic {
        run_id: u64,
        sim_time_secs: f64,
        pdr: f64,
        avg_delay_secs: f64,
        throughput_kbps: f64,
        total_energy_joules: f64,
        overhead: u64,
        nodes: Vec<NodeSnapshot>,
        edges: Vec<(usize, usize)>,
        area: (f64, f64),
    },
    Final {
        run_id: u64,
        protocol: String,
        horizon_secs: f64,
        pdr: f64,
        avg_delay_secs: f64,
        total_energy_joules: f64,
        overhead: u64,
        wall_clock_unix_secs: u64,
    },
}

impl EmissionRecord {
    pub fn is_final(&self) -> bool {
        matches!(self, EmissionRecord::Final { .. })
    }
}
