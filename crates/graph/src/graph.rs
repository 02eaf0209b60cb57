//! Compressed-sparse-row contact graph.

use crate::GraphError;
use sirsim_types::NodeIndex;
use std::ops::Range;

/// Immutable undirected simple graph in CSR form.
///
/// Each undirected edge `{u, v}` is stored as two directed arcs, `u → v` in
/// `u`'s arc range and `v → u` in `v`'s. Arcs of a node keep the order in
/// which their edges were supplied, so neighbour iteration (and therefore the
/// draw order of a simulation) is a deterministic function of the input.
///
/// Invariant: `degree(u) == arcs(u).len()` for every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGraph {
    /// `row_ptr[u]..row_ptr[u + 1]` is the arc range of node `u`.
    row_ptr: Vec<usize>,
    /// Head (target) node of each arc.
    col_idx: Vec<NodeIndex>,
    /// Index of the opposite arc of the same edge.
    rev: Vec<usize>,
    /// Source node of each arc.
    src: Vec<NodeIndex>,
}

impl Default for ContactGraph {
    fn default() -> Self {
        Self::empty()
    }
}

impl ContactGraph {
    /// The graph with no nodes.
    pub fn empty() -> Self {
        Self {
            row_ptr: vec![0],
            col_idx: Vec::new(),
            rev: Vec::new(),
            src: Vec::new(),
        }
    }

    /// Build a graph on `n` nodes from undirected edges.
    ///
    /// Fails with [`GraphError::InvalidEdge`] if an endpoint is outside
    /// `[0, n)`, [`GraphError::SelfLoop`] for `u == v` and
    /// [`GraphError::DuplicateEdge`] if an edge is listed twice (in either
    /// orientation). `n == 0` with no edges yields the empty graph.
    pub fn from_edges(n: usize, edges: &[(NodeIndex, NodeIndex)]) -> Result<Self, GraphError> {
        if n > NodeIndex::MAX as usize {
            return Err(GraphError::InvalidParameter(format!(
                "node count {n} exceeds the supported maximum {}",
                NodeIndex::MAX
            )));
        }

        let mut degree = vec![0usize; n];
        for &(u, v) in edges {
            if u as usize >= n || v as usize >= n {
                return Err(GraphError::InvalidEdge {
                    u: u.into(),
                    v: v.into(),
                    n,
                });
            }
            if u == v {
                return Err(GraphError::SelfLoop { node: u });
            }
            degree[u as usize] += 1;
            degree[v as usize] += 1;
        }

        let mut row_ptr = Vec::with_capacity(n + 1);
        row_ptr.push(0);
        for d in &degree {
            let last = row_ptr[row_ptr.len() - 1];
            row_ptr.push(last + d);
        }

        let arc_count = row_ptr[n];
        let mut col_idx = vec![0; arc_count];
        let mut rev = vec![0; arc_count];
        let mut src = vec![0; arc_count];
        let mut cursor = row_ptr[..n].to_vec();

        for &(u, v) in edges {
            let uv = cursor[u as usize];
            cursor[u as usize] += 1;
            let vu = cursor[v as usize];
            cursor[v as usize] += 1;

            col_idx[uv] = v;
            src[uv] = u;
            col_idx[vu] = u;
            src[vu] = v;
            rev[uv] = vu;
            rev[vu] = uv;
        }

        let graph = Self {
            row_ptr,
            col_idx,
            rev,
            src,
        };
        graph.check_simple()?;
        Ok(graph)
    }

    /// Build a graph from two parallel endpoint lists.
    pub fn from_endpoint_lists(
        n: usize,
        sources: &[NodeIndex],
        targets: &[NodeIndex],
    ) -> Result<Self, GraphError> {
        if sources.len() != targets.len() {
            return Err(GraphError::LengthMismatch {
                what: "edge endpoint lists",
                expected: sources.len(),
                actual: targets.len(),
            });
        }
        let edges: Vec<(NodeIndex, NodeIndex)> = sources
            .iter()
            .copied()
            .zip(targets.iter().copied())
            .collect();
        Self::from_edges(n, &edges)
    }

    /// Reject repeated undirected edges without reordering any arc range.
    fn check_simple(&self) -> Result<(), GraphError> {
        let mut scratch: Vec<NodeIndex> = Vec::new();
        for u in 0..self.node_count() {
            let neighbors = self.neighbors(u as NodeIndex);
            if neighbors.len() < 2 {
                continue;
            }
            scratch.clear();
            scratch.extend_from_slice(neighbors);
            scratch.sort_unstable();
            if let Some(pair) = scratch.windows(2).find(|w| w[0] == w[1]) {
                let (a, b) = (u as NodeIndex, pair[0]);
                return Err(GraphError::DuplicateEdge {
                    u: a.min(b),
                    v: a.max(b),
                });
            }
        }
        Ok(())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.row_ptr.len() - 1
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.col_idx.len() / 2
    }

    /// Number of directed arcs (twice the edge count).
    pub fn arc_count(&self) -> usize {
        self.col_idx.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Degree of `u`. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `u` is not a node of this graph.
    pub fn degree(&self, u: NodeIndex) -> usize {
        let u = u as usize;
        self.row_ptr[u + 1] - self.row_ptr[u]
    }

    /// Half-open range of `u`'s outgoing arcs.
    pub fn arcs(&self, u: NodeIndex) -> Range<usize> {
        let u = u as usize;
        self.row_ptr[u]..self.row_ptr[u + 1]
    }

    /// Neighbours of `u`, in arc order. Iterating is O(degree).
    pub fn neighbors(&self, u: NodeIndex) -> &[NodeIndex] {
        &self.col_idx[self.arcs(u)]
    }

    /// Head (target) of an arc.
    pub fn head(&self, arc: usize) -> NodeIndex {
        self.col_idx[arc]
    }

    /// Source of an arc.
    pub fn source(&self, arc: usize) -> NodeIndex {
        self.src[arc]
    }

    /// The opposite arc of the same undirected edge.
    pub fn reverse(&self, arc: usize) -> usize {
        self.rev[arc]
    }

    /// Iterate every undirected edge once, as `(u, v)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.src
            .iter()
            .zip(self.col_idx.iter())
            .filter(|(u, v)| u < v)
            .map(|(&u, &v)| (u, v))
    }

    /// Largest degree, or 0 for the empty graph.
    pub fn max_degree(&self) -> usize {
        self.row_ptr
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }

    /// Mean degree `2m / n`, or 0 for the empty graph.
    pub fn mean_degree(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.arc_count() as f64 / self.node_count() as f64
        }
    }
}
