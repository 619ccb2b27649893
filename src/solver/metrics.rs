use serde::{Deserialize, Serialize};

/// Counters accumulated by the fixpoint loop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixpointMetrics {
    /// Pop/learn iterations performed (each one costs a unit of gas).
    pub iterations: u64,
    /// Conclusion patches discarded by the subsumption filter at pop time.
    pub patches_subsumed: u64,
    /// Facts that entered the database.
    pub facts_inserted: u64,
    /// Facts evicted by a dominating insertion.
    pub facts_evicted: u64,
    /// Learned conclusions rejected because the database already
    /// dominated them.
    pub facts_subsumed: u64,
    /// Partial rules registered (seeded rules plus residuals).
    pub rules_registered: u64,
    /// Gas left when the loop stopped; non-zero means the queue drained
    /// and a true fixpoint was reached.
    pub gas_remaining: u64,
}
