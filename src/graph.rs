//! Shortest paths over small, fixed graphs.
//!
//! A [`Graph`] is built once from its [`Node`]s and an [`EdgeCosts`] table and never changes
//! afterwards. Distances are derived on demand, either from a single source or for every pair of
//! nodes at once.

use anyhow::{bail, Result};
use nalgebra::DMatrix;
use petgraph::{algo::dijkstra, graph::DiGraph, graph::NodeIndex};

/// Cost of a node that can't be reached.
pub const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: usize,
    pub adjacent: Vec<usize>,
}

impl Node {
    pub fn new(id: usize, adjacent: Vec<usize>) -> Self {
        Self { id, adjacent }
    }
}

/// Cost of moving along an adjacency.
#[derive(Debug, Clone)]
pub enum EdgeCosts {
    /// Every adjacency costs the same; `0` and [`UNREACHABLE`] leave the graph without edges.
    Uniform(u32),
    /// `matrix[(from, to)]`; `0` and [`UNREACHABLE`] mean there is no direct edge.
    Matrix(DMatrix<u32>),
}

impl EdgeCosts {
    /// Matrix with `weight` everywhere except on the diagonal.
    pub fn all_but_diagonal(n: usize, weight: u32) -> Self {
        EdgeCosts::Matrix(DMatrix::from_fn(n, n, |i, j| if i == j { 0 } else { weight }))
    }

    fn cost(&self, from: usize, to: usize) -> Option<u32> {
        let w = match self {
            EdgeCosts::Uniform(w) => *w,
            EdgeCosts::Matrix(m) => m[(from, to)],
        };
        match w {
            0 | UNREACHABLE => None,
            w => Some(w),
        }
    }
}

#[derive(Debug)]
pub struct Graph {
    nodes: Vec<Node>,
    inner: DiGraph<(), u32>,
}

impl Graph {
    /// Node ids have to be `0..nodes.len()` in order.
    pub fn new(nodes: Vec<Node>, costs: EdgeCosts) -> Result<Self> {
        let n = nodes.len();
        if let EdgeCosts::Matrix(m) = &costs {
            if m.nrows() != n || m.ncols() != n {
                bail!("edge cost matrix is {}x{} but there are {} nodes", m.nrows(), m.ncols(), n);
            }
        }

        let mut inner = DiGraph::with_capacity(n, nodes.iter().map(|node| node.adjacent.len()).sum());
        for _ in 0..n {
            inner.add_node(());
        }
        for (i, node) in nodes.iter().enumerate() {
            if node.id != i {
                bail!("node at position {} has id {}", i, node.id);
            }
            for &adj in &node.adjacent {
                if adj >= n {
                    bail!("node {} is adjacent to unknown node {}", i, adj);
                }
                if let Some(w) = costs.cost(i, adj) {
                    inner.add_edge(NodeIndex::new(i), NodeIndex::new(adj), w);
                }
            }
        }

        Ok(Self { nodes, inner })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Cost from `source` to every node, indexed by node id. Unreachable nodes are left at
    /// [`UNREACHABLE`], and so are nodes whose cost doesn't fit below it.
    ///
    /// Panics if `source` isn't a node of this graph.
    pub fn shortest_paths_from(&self, source: usize) -> Vec<u32> {
        assert!(source < self.len(), "source {} out of range", source);
        let mut costs = vec![UNREACHABLE; self.len()];
        // Summed in u64: a path has fewer than 2^32 edges of at most u32::MAX each.
        let found = dijkstra(&self.inner, NodeIndex::new(source), None, |e| {
            u64::from(*e.weight())
        });
        for (node, cost) in found {
            costs[node.index()] = u32::try_from(cost).unwrap_or(UNREACHABLE);
        }
        costs
    }

    pub fn find_all_shortest_paths(&self) -> Distances {
        let n = self.len();
        let mut matrix = DMatrix::from_element(n, n, UNREACHABLE);
        for source in 0..n {
            for (target, cost) in self.shortest_paths_from(source).into_iter().enumerate() {
                matrix[(source, target)] = cost;
            }
        }
        Distances { matrix }
    }
}

/// All-pairs distance table, `[from, to]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distances {
    matrix: DMatrix<u32>,
}

impl Distances {
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// `None` if `to` can't be reached from `from`.
    pub fn get(&self, from: usize, to: usize) -> Option<u32> {
        match self.matrix[(from, to)] {
            UNREACHABLE => None,
            d => Some(d),
        }
    }

    /// Like [`Distances::get`] but returns [`UNREACHABLE`] instead of `None`.
    pub fn raw(&self, from: usize, to: usize) -> u32 {
        self.matrix[(from, to)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn undirected(n: usize, edges: &[(usize, usize)]) -> Vec<Node> {
        let mut nodes: Vec<_> = (0..n).map(|i| Node::new(i, Vec::new())).collect();
        for &(a, b) in edges {
            nodes[a].adjacent.push(b);
            nodes[b].adjacent.push(a);
        }
        nodes
    }

    #[test]
    fn test_cycle() -> Result<()> {
        let graph = Graph::new(
            undirected(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]),
            EdgeCosts::Uniform(1),
        )?;
        assert_eq!(graph.node(1).map(|n| n.adjacent.as_slice()), Some(&[0, 2][..]));
        assert_eq!(graph.node(4), None);

        let dist = graph.find_all_shortest_paths();
        assert_eq!(dist.get(0, 2), Some(2));
        assert_eq!(dist.get(0, 1), Some(1));
        assert_eq!(dist.get(0, 3), Some(1));
        assert_eq!(dist.get(0, 0), Some(0));
        Ok(())
    }

    #[test]
    fn test_disconnected() -> Result<()> {
        let graph = Graph::new(undirected(2, &[]), EdgeCosts::all_but_diagonal(2, 1))?;
        let dist = graph.find_all_shortest_paths();
        assert_eq!(dist.get(0, 1), None);
        assert_eq!(dist.raw(1, 0), UNREACHABLE);
        assert_eq!(dist.get(1, 1), Some(0));
        Ok(())
    }

    #[test]
    fn test_weighted_detour() -> Result<()> {
        // 0 -> 2 directly costs 10, via 1 only 3.
        #[rustfmt::skip]
        let matrix = DMatrix::from_row_slice(3, 3, &[
            0, 1, 10,
            1, 0, 2,
            10, 2, 0,
        ]);
        let graph = Graph::new(
            undirected(3, &[(0, 1), (1, 2), (0, 2)]),
            EdgeCosts::Matrix(matrix),
        )?;
        assert_eq!(graph.shortest_paths_from(0), vec![0, 1, 3]);
        Ok(())
    }

    #[test]
    fn test_matrix_sentinel_is_no_edge() -> Result<()> {
        let matrix = DMatrix::from_row_slice(2, 2, &[0, UNREACHABLE, UNREACHABLE, 0]);
        let graph = Graph::new(undirected(2, &[(0, 1)]), EdgeCosts::Matrix(matrix))?;
        assert_eq!(graph.shortest_paths_from(0), vec![0, UNREACHABLE]);
        Ok(())
    }

    #[test]
    fn test_uniform_sentinel_is_no_edge() -> Result<()> {
        for w in [0, UNREACHABLE] {
            let graph = Graph::new(undirected(2, &[(0, 1)]), EdgeCosts::Uniform(w))?;
            assert_eq!(graph.find_all_shortest_paths().get(0, 1), None);
        }
        Ok(())
    }

    #[test]
    fn test_large_weights() -> Result<()> {
        let path = |w: u32| -> Result<Vec<u32>> {
            #[rustfmt::skip]
            let matrix = DMatrix::from_row_slice(3, 3, &[
                0, w, 0,
                w, 0, w,
                0, w, 0,
            ]);
            let graph = Graph::new(undirected(3, &[(0, 1), (1, 2)]), EdgeCosts::Matrix(matrix))?;
            Ok(graph.shortest_paths_from(0))
        };

        let half = u32::MAX / 2;
        assert_eq!(path(half)?, vec![0, half, u32::MAX - 1]);
        // Too far to be told apart from the sentinel.
        assert_eq!(path(half + 1)?, vec![0, half + 1, UNREACHABLE]);
        Ok(())
    }

    #[test]
    fn test_directed() -> Result<()> {
        let nodes = vec![Node::new(0, vec![1]), Node::new(1, vec![])];
        let graph = Graph::new(nodes, EdgeCosts::Uniform(1))?;
        let dist = graph.find_all_shortest_paths();
        assert_eq!(dist.get(0, 1), Some(1));
        assert_eq!(dist.get(1, 0), None);
        Ok(())
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Graph::new(vec![Node::new(1, vec![])], EdgeCosts::Uniform(1)).is_err());
        assert!(Graph::new(vec![Node::new(0, vec![3])], EdgeCosts::Uniform(1)).is_err());
        assert!(Graph::new(undirected(3, &[]), EdgeCosts::all_but_diagonal(2, 1)).is_err());
    }

    #[test]
    fn test_empty() -> Result<()> {
        let graph = Graph::new(Vec::new(), EdgeCosts::Uniform(1))?;
        assert!(graph.is_empty());
        assert!(graph.find_all_shortest_paths().is_empty());
        Ok(())
    }

    /// Random undirected graph with symmetric weights in `1..=9`.
    fn weighted_graph() -> impl Strategy<Value = (Vec<Node>, DMatrix<u32>)> {
        (1usize..10).prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec((0..n, 0..n), 0..n * 2),
                prop::collection::vec(1u32..10, n * n),
            )
                .prop_map(|(n, edges, weights)| {
                    let edges: Vec<_> = edges.into_iter().filter(|(a, b)| a != b).collect();
                    let matrix = DMatrix::from_fn(n, n, |i, j| {
                        if i == j {
                            0
                        } else {
                            weights[i.min(j) * n + i.max(j)]
                        }
                    });
                    (undirected(n, &edges), matrix)
                })
        })
    }

    proptest! {
        #[test]
        fn self_distance_is_zero((nodes, matrix) in weighted_graph()) {
            let graph = Graph::new(nodes, EdgeCosts::Matrix(matrix)).unwrap();
            let dist = graph.find_all_shortest_paths();
            for i in 0..dist.len() {
                prop_assert_eq!(dist.get(i, i), Some(0));
            }
        }

        #[test]
        fn symmetric_costs_give_symmetric_distances((nodes, matrix) in weighted_graph()) {
            let graph = Graph::new(nodes, EdgeCosts::Matrix(matrix)).unwrap();
            let dist = graph.find_all_shortest_paths();
            for a in 0..dist.len() {
                for b in 0..dist.len() {
                    prop_assert_eq!(dist.raw(a, b), dist.raw(b, a));
                }
            }
        }

        #[test]
        fn triangle_inequality((nodes, matrix) in weighted_graph()) {
            let graph = Graph::new(nodes, EdgeCosts::Matrix(matrix)).unwrap();
            let dist = graph.find_all_shortest_paths();
            let n = dist.len();
            for a in 0..n {
                for b in 0..n {
                    for c in 0..n {
                        if let (Some(ab), Some(bc)) = (dist.get(a, b), dist.get(b, c)) {
                            let ac = dist.get(a, c);
                            prop_assert!(ac.is_some_and(|ac| ac <= ab + bc));
                        }
                    }
                }
            }
        }
    }
}
