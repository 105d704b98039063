use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking adjacency operations performed through a [`super::Graph`].
///
/// Implementations collect counts of element creation, adjacency scans,
/// representation upgrades and the soft failures met while materializing
/// traversal results.
pub trait GraphMetrics: Send + Sync {
    /// Records the creation of a vertex document.
    fn vertex_created(&self);

    /// Records the creation of an edge.
    ///
    /// # Parameters
    /// * `lightweight` - Whether the edge was stored without a backing record.
    fn edge_created(&self, lightweight: bool);

    /// Records the start of an adjacency scan.
    ///
    /// # Parameters
    /// * `direction` - "out", "in" or "both".
    fn adjacency_scan(&self, direction: &'static str);

    /// Records a single reference being upgraded to a collection.
    fn link_upgraded(&self);

    /// Records a reference that no longer resolves to a document.
    fn stale_reference(&self);

    /// Records an edge whose opposite endpoint could not be read, even after reload.
    fn endpoint_unavailable(&self);
}

/// A no-op implementation of [`GraphMetrics`] that discards everything.
#[derive(Default)]
pub struct NoopMetrics;

impl GraphMetrics for NoopMetrics {
    fn vertex_created(&self) {}
    fn edge_created(&self, _lightweight: bool) {}
    fn adjacency_scan(&self, _direction: &'static str) {}
    fn link_upgraded(&self) {}
    fn stale_reference(&self) {}
    fn endpoint_unavailable(&self) {}
}

/// A thread-safe counter-based implementation of [`GraphMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of vertices created.
    pub vertices_created: AtomicU64,

    /// Number of record-backed edges created.
    pub edges_created: AtomicU64,

    /// Number of lightweight edges created.
    pub lightweight_edges_created: AtomicU64,

    /// Number of outgoing adjacency scans.
    pub adjacency_scans_out: AtomicU64,

    /// Number of incoming adjacency scans.
    pub adjacency_scans_in: AtomicU64,

    /// Number of bidirectional adjacency scans.
    pub adjacency_scans_both: AtomicU64,

    /// Number of single-link upgrades.
    pub links_upgraded: AtomicU64,

    /// Number of stale references skipped.
    pub stale_references: AtomicU64,

    /// Number of unavailable edge endpoints.
    pub endpoints_unavailable: AtomicU64,
}

impl CounterMetrics {
    /// Reads a counter.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

impl GraphMetrics for CounterMetrics {
    fn vertex_created(&self) {
        self.vertices_created.fetch_add(1, Ordering::Relaxed);
    }

    fn edge_created(&self, lightweight: bool) {
        if lightweight {
            self.lightweight_edges_created
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.edges_created.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn adjacency_scan(&self, direction: &'static str) {
        match direction {
            "out" => {
                self.adjacency_scans_out.fetch_add(1, Ordering::Relaxed);
            }
            "in" => {
                self.adjacency_scans_in.fetch_add(1, Ordering::Relaxed);
            }
            "both" => {
                self.adjacency_scans_both.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn link_upgraded(&self) {
        self.links_upgraded.fetch_add(1, Ordering::Relaxed);
    }

    fn stale_reference(&self) {
        self.stale_references.fetch_add(1, Ordering::Relaxed);
    }

    fn endpoint_unavailable(&self) {
        self.endpoints_unavailable.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation, [`NoopMetrics`], in an [`Arc`].
pub fn default_metrics() -> Arc<dyn GraphMetrics> {
    Arc::new(NoopMetrics)
}
