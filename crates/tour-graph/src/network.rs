//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing arcs.
//! Given a `NodeId n`, its outgoing arcs occupy the index range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All arc arrays (`arc_from`, `arc_to`, `arc_edge`, `arc_dir`,
//! `arc_length_m`) are sorted by source node and indexed by `ArcId`.
//! Iteration over a node's outgoing arcs is a contiguous memory scan — ideal
//! for the search's inner loop.
//!
//! # Edge identity
//!
//! A two-way road is stored as two arcs sharing one `EdgeId` with opposite
//! [`Direction`] tags.  The `EdgeId` is what paths report and what
//! visited-edge tracking keys on; the arc is purely the traversal unit.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! to snap projected via-point coordinates to routable graph nodes.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use tour_core::{ArcId, EdgeId, GeoPoint, NodeId};

use crate::cost::{Direction, EdgeRef};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries at via-point scale (a few hundred metres).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    // ── CSR arc adjacency ─────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing arcs of node `n` are at ArcIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Arc data (indexed by ArcId = position in sorted order) ────────────
    /// Source node of each arc.  Redundant with CSR but required for
    /// efficient path reconstruction (trace predecessor arcs back to source).
    pub arc_from: Vec<NodeId>,

    /// Destination node of each arc.
    pub arc_to: Vec<NodeId>,

    /// Undirected segment identity of each arc.  Both arcs of a two-way road
    /// share one `EdgeId`.
    pub arc_edge: Vec<EdgeId>,

    /// Traversal direction of each arc relative to its segment's canonical
    /// direction.
    pub arc_dir: Vec<Direction>,

    /// Physical length of each arc in metres.
    pub arc_length_m: Vec<f64>,

    /// Number of distinct `EdgeId`s handed out by the builder.
    pub edge_count: u32,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or arcs.
    ///
    /// Any search against an empty network returns
    /// [`GraphError::NoPath`](crate::GraphError::NoPath); any snap returns
    /// `None`.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn arc_count(&self) -> usize {
        self.arc_to.len()
    }

    /// Number of undirected road segments.
    pub fn edge_count(&self) -> usize {
        self.edge_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Position of `node`, or `None` if the id is out of range.
    pub fn position(&self, node: NodeId) -> Option<GeoPoint> {
        self.node_pos.get(node.index()).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `ArcId`s of all outgoing arcs from `node`.
    ///
    /// This is a contiguous index range — no heap allocation.
    #[inline]
    pub fn out_arcs(&self, node: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| ArcId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing arcs).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// The cost-function view of `arc`.
    #[inline]
    pub fn edge_ref(&self, arc: ArcId) -> EdgeRef {
        EdgeRef {
            edge: self.arc_edge[arc.index()],
            from: self.arc_from[arc.index()],
            to: self.arc_to[arc.index()],
            length_m: self.arc_length_m[arc.index()],
        }
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest routable node to `pos`.
    ///
    /// Returns `None` only if the network has no nodes.  Equidistant
    /// candidates resolve by the R-tree's deterministic traversal order.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Return up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and road segments in any order.  `build()`
/// sorts arcs by source node, constructs the CSR arrays, and bulk-loads the
/// R-tree.
///
/// # Example
///
/// ```
/// use tour_core::GeoPoint;
/// use tour_graph::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(48.137, 11.575));
/// let c = b.add_node(GeoPoint::new(48.140, 11.575));
/// b.add_road(a, c, 340.0);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// assert_eq!(net.arc_count(), 2); // two-way
/// ```
pub struct RoadNetworkBuilder {
    nodes: Vec<GeoPoint>,
    raw_arcs: Vec<RawArc>,
    next_edge: u32,
}

struct RawArc {
    from: NodeId,
    to: NodeId,
    edge: EdgeId,
    dir: Direction,
    length_m: f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            raw_arcs: Vec::new(),
            next_edge: 0,
        }
    }

    /// Pre-allocate for the expected number of nodes and segments to reduce
    /// reallocations when bulk-loading.
    pub fn with_capacity(nodes: usize, segments: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            raw_arcs: Vec::with_capacity(segments * 2),
            next_edge: 0,
        }
    }

    /// Add a road node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **two-way** road segment between `a` and `b`, `length_m` metres
    /// long.  Returns the segment's `EdgeId`; the `a → b` arc is the
    /// segment's canonical (`Forward`) direction.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) -> EdgeId {
        let edge = self.next_edge_id();
        self.raw_arcs.push(RawArc {
            from: a,
            to: b,
            edge,
            dir: Direction::Forward,
            length_m,
        });
        self.raw_arcs.push(RawArc {
            from: b,
            to: a,
            edge,
            dir: Direction::Reverse,
            length_m,
        });
        edge
    }

    /// Add a **one-way** segment traversable only from `from` to `to`.
    pub fn add_one_way(&mut self, from: NodeId, to: NodeId, length_m: f64) -> EdgeId {
        let edge = self.next_edge_id();
        self.raw_arcs.push(RawArc {
            from,
            to,
            edge,
            dir: Direction::Forward,
            length_m,
        });
        edge
    }

    /// Look up the position of a node added earlier (used to compute segment
    /// lengths from node coordinates).
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.next_edge as usize
    }

    fn next_edge_id(&mut self) -> EdgeId {
        let edge = EdgeId(self.next_edge);
        self.next_edge += 1;
        edge
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Time complexity: O(A log A) for the arc sort + O(N log N) for R-tree
    /// bulk load, where N = nodes, A = arcs.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();
        let arc_count = self.raw_arcs.len();

        // Sort arcs by source node for CSR construction.
        let mut raw = self.raw_arcs;
        raw.sort_by_key(|a| a.from.0); // stable: arcs keep insertion order within a node

        let arc_from: Vec<NodeId> = raw.iter().map(|a| a.from).collect();
        let arc_to: Vec<NodeId> = raw.iter().map(|a| a.to).collect();
        let arc_edge: Vec<EdgeId> = raw.iter().map(|a| a.edge).collect();
        let arc_dir: Vec<Direction> = raw.iter().map(|a| a.dir).collect();
        let arc_length_m: Vec<f64> = raw.iter().map(|a| a.length_m).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for a in &raw {
            node_out_start[a.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, arc_count);

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: [pos.lat, pos.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            arc_from,
            arc_to,
            arc_edge,
            arc_dir,
            arc_length_m,
            edge_count: self.next_edge,
            spatial_idx,
        }
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
