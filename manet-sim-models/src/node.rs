use crate::packet::Packet;
use rand::Rng;
use rand_distr::{Distribution, UnitCircle};
use std::collections::{HashMap, VecDeque};

/// A single mobile node.
///
/// Position is mutated only by the owning [`crate::mobility::Mobility`]
/// process; `routing_table` only by the active routing protocol; `energy`
/// only by movement and transmission (§3 of the invariants this type
/// upholds). `neighbors` is recomputed wholesale by
/// [`crate::neighbors`], never patched incrementally.
#[derive(Debug, Clone)]
pub struct Node {
    /// Stable id in `[0, N)`.
    pub id: usize,
    pub position: (f64, f64),
    pub direction: (f64, f64),
    pub speed: f64,
    pub pause_time: f64,
    pub tx_range: f64,
    pub energy: f64,
    pub energy_used: f64,
    pub neighbors: Vec<usize>,
    /// destination id -> next-hop id, kept in sync by the active protocol.
    pub routing_table: HashMap<usize, usize>,
    pub queue: VecDeque<Packet>,
    pub handler_active: bool,
}

const INITIAL_ENERGY: f64 = 100.0;

impl Node {
    /// Euclidean distance to `other`, in metres.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = self.position.0 - other.position.0;
        let dy = self.position.1 - other.position.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Debits `amount` joules, clamping residual energy at zero.
    ///
    /// `energy_used` is monotonically non-decreasing; `energy` is always
    /// `max(0, 100 - energy_used)`.
    pub fn consume_energy(&mut self, amount: f64) {
        self.energy_used += amount;
        self.energy = (INITIAL_ENERGY - self.energy_used).max(0.0);
    }

    /// Moves the node by `direction * speed * dt`, reflecting off the
    /// arena boundary on each axis independently (negating that axis's
    /// direction component and clamping the position into range).
    ///
    /// Grounded on `manet_models.py::Node.move`'s inner stepping loop.
    pub fn step_substep(&mut self, dt: f64, area: (f64, f64)) {
        self.position.0 += self.direction.0 * self.speed * dt;
        self.position.1 += self.direction.1 * self.speed * dt;

        if self.position.0 < 0.0 {
            self.position.0 = 0.0;
            self.direction.0 = self.direction.0.abs();
        } else if self.position.0 > area.0 {
            self.position.0 = area.0;
            self.direction.0 = -self.direction.0.abs();
        }

        if self.position.1 < 0.0 {
            self.position.1 = 0.0;
            self.direction.1 = self.direction.1.abs();
        } else if self.position.1 > area.1 {
            self.position.1 = area.1;
            self.direction.1 = -self.direction.1.abs();
        }

        self.consume_energy(0.01 * self.speed);
    }

    /// Samples a new unit direction uniformly on the unit circle.
    pub fn pick_new_direction(&mut self, rng: &mut impl Rng) {
        let [x, y]: [f64; 2] = UnitCircle.sample(rng);
        self.direction = (x, y);
    }
}

/// Assembles a [`Node`] with sensible defaults, mirroring the teacher's
/// `RouterBuilder`/`ServerBuilder` builder-then-`build()` pattern.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    id: usize,
    position: (f64, f64),
    speed: f64,
    pause_time: f64,
    tx_range: f64,
}

impl NodeBuilder {
    pub fn new(id: usize) -> NodeBuilder {
        NodeBuilder {
            id,
            position: (0.0, 0.0),
            speed: 5.0,
            pause_time: 2.0,
            tx_range: 100.0,
        }
    }

    pub fn position(mut self, position: (f64, f64)) -> NodeBuilder {
        self.position = position;
        self
    }

    pub fn speed(mut self, speed: f64) -> NodeBuilder {
        self.speed = speed;
        self
    }

    pub fn pause_time(mut self, pause_time: f64) -> NodeBuilder {
        self.pause_time = pause_time;
        self
    }

    pub fn tx_range(mut self, tx_range: f64) -> NodeBuilder {
        self.tx_range = tx_range;
        self
    }

    pub fn build(self, rng: &mut impl Rng) -> Node {
        let [x, y]: [f64; 2] = UnitCircle.sample(rng);
        Node {
            id: self.id,
            position: self.position,
            direction: (x, y),
            speed: self.speed,
            pause_time: self.pause_time,
            tx_range: self.tx_range,
            energy: INITIAL_ENERGY,
            energy_used: 0.0,
            neighbors: Vec::new(),
            routing_table: HashMap::new(),
            queue: VecDeque::new(),
            handler_active: false,
        }
    }
}
