use crate::metrics::Metrics;
use crate::node::Node;
use crate::protocols::Protocol;
use manet_sim_engine::StopFlag;
use std::cell::RefCell;
use std::rc::Rc;

/// Cheaply-cloneable handle to the shared simulation state.
///
/// Every [`manet_sim_engine::Process`] in this crate (mobility, handlers,
/// protocol timers, traffic generation) holds one of these rather than
/// owning the node table itself - mirrors the teacher's `Router`/`Server`
/// holding an index into a shared topology rather than the topology
/// itself.
#[derive(Debug, Clone)]
pub struct SimContext {
    pub nodes: Rc<RefCell<Vec<Node>>>,
    pub routing: Rc<RefCell<Protocol>>,
    pub metrics: Rc<RefCell<Metrics>>,
    pub stop: StopFlag,
    pub area: (f64, f64),
    pub log: slog::Logger,
}
