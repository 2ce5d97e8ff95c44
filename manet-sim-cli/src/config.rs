use manet_sim_engine::SimError;
use manet_sim_models::ProtocolKind;
use serde::Deserialize;

/// The recognized configuration record (§6 External Interfaces).
///
/// `seed` is an addition beyond the distilled record: without it, two
/// runs of the same scenario pick different RNG streams and can't be
/// reproduced for debugging or for the test suite.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub num_nodes: usize,
    pub area_size: f64,
    pub protocol: ProtocolKind,
    pub sim_time: f64,
    pub traffic_load: f64,
    pub node_speed: f64,
    pub tx_range: f64,
    pub pause_time: f64,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> RunConfig {
        RunConfig {
            num_nodes: 50,
            area_size: 1000.0,
            protocol: ProtocolKind::Aodv,
            sim_time: 60.0,
            traffic_load: 10.0,
            node_speed: 5.0,
            tx_range: 100.0,
            pause_time: 2.0,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Rejects any parameter the core can't run with, before a single
    /// process is spawned (§7: "`InvalidConfig` ... reported
    /// synchronously to the caller before any process is spawned").
    pub fn validate(&self) -> Result<(), SimError> {
        let reason = if self.num_nodes < 2 {
            Some("num_nodes must be at least 2".to_string())
        } else if self.area_size <= 0.0 {
            Some("area_size must be positive".to_string())
        } else if self.sim_time <= 0.0 {
            Some("sim_time must be positive".to_string())
        } else if self.traffic_load <= 0.0 {
            Some("traffic_load must be positive".to_string())
        } else if self.node_speed < 0.0 {
            // zero is a valid, and tested, stationary-node configuration
            // (spec scenario S1); only a negative speed is nonsensical.
            Some("node_speed must not be negative".to_string())
        } else if self.tx_range <= 0.0 {
            Some("tx_range must be positive".to_string())
        } else if self.pause_time <= 0.0 {
            Some("pause_time must be positive".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SimError::InvalidConfig { reason }),
            None => Ok(()),
        }
    }

    pub fn area(&self) -> (f64, f64) {
        (self.area_size, self.area_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_too_few_nodes() {
        let config = RunConfig {
            num_nodes: 1,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_non_positive_tx_range() {
        let config = RunConfig {
            tx_range: 0.0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig { .. })));
    }
}
