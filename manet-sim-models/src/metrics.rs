/// Raw counters accumulated between two points in time.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsSnapshot {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub total_delay_secs: f64,
}

impl MetricsSnapshot {
    pub fn pdr(&self) -> f64 {
        if self.packets_sent == 0 {
            0.0
        } else {
            self.packets_received as f64 / self.packets_sent as f64
        }
    }

    pub fn avg_delay_secs(&self) -> f64 {
        if self.packets_received == 0 {
            0.0
        } else {
            self.total_delay_secs / self.packets_received as f64
        }
    }
}

/// Cumulative and since-last-emission packet counters.
///
/// Mutated directly by [`crate::queue::Handler`] (on delivery) and
/// [`crate::traffic::TrafficGenerator`] (on injection); read out by the
/// run controller at every emission tick, which then calls
/// [`Metrics::reset_interval`].
#[derive(Debug, Default)]
pub struct Metrics {
    pub total: MetricsSnapshot,
    pub interval: MetricsSnapshot,
}

impl Metrics {
    pub fn record_sent(&mut self) {
        self.total.packets_sent += 1;
        self.interval.packets_sent += 1;
    }

    pub fn record_delivered(&mut self, delay_secs: f64) {
        self.total.packets_received += 1;
        self.total.total_delay_secs += delay_secs;
        self.interval.packets_received += 1;
        self.interval.total_delay_secs += delay_secs;
    }

    pub fn reset_interval(&mut self) {
        self.interval = MetricsSnapshot::default();
    }
}
