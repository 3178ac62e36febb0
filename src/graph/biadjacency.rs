use rayon::prelude::*;

use crate::graph::csr::{Csr, CsrLayout};
use crate::graph::Target;
use crate::index::Idx;
use crate::input::edgelist::{EdgeList, Edges};
use crate::input::Direction;

/// A bipartite graph: two disjoint vertex sets (`side 0` and `side 1`) where
/// every edge connects one side to the other. Node ids on each side are
/// independent -- `side_0` node `3` and `side_1` node `3` are unrelated
/// vertices, each indexing into their own CSR.
///
/// Internally this is a pair of [`Csr`]s, one per direction, following the
/// same out/in split [`crate::graph::csr::DirectedCsrGraph`] uses for a
/// unipartite directed graph.
pub struct BipartiteCsrGraph<NI: Idx, EV = ()> {
    node_count_0: NI,
    node_count_1: NI,
    csr_0: Csr<NI, NI, EV>,
    csr_1: Csr<NI, NI, EV>,
}

impl<NI: Idx, EV> BipartiteCsrGraph<NI, EV> {
    /// Number of vertices on side 0.
    pub fn node_count_0(&self) -> NI {
        self.node_count_0
    }

    /// Number of vertices on side 1.
    pub fn node_count_1(&self) -> NI {
        self.node_count_1
    }

    /// Number of edges connecting side 0 to side 1.
    pub fn edge_count(&self) -> NI {
        self.csr_0.edge_count()
    }

    /// Degree of a side-0 vertex.
    pub fn degree_0(&self, node: NI) -> NI {
        self.csr_0.degree(node)
    }

    /// Degree of a side-1 vertex.
    pub fn degree_1(&self, node: NI) -> NI {
        self.csr_1.degree(node)
    }

    /// Side-1 neighbors (with edge values) of a side-0 vertex.
    pub fn neighbors_with_values_0(&self, node: NI) -> &[Target<NI, EV>] {
        self.csr_0.targets_with_values(node)
    }

    /// Side-0 neighbors (with edge values) of a side-1 vertex.
    pub fn neighbors_with_values_1(&self, node: NI) -> &[Target<NI, EV>] {
        self.csr_1.targets_with_values(node)
    }
}

impl<NI: Idx> BipartiteCsrGraph<NI, ()> {
    /// Side-1 neighbors of a side-0 vertex.
    pub fn neighbors_0(&self, node: NI) -> &[NI] {
        self.csr_0.targets(node)
    }

    /// Side-0 neighbors of a side-1 vertex.
    pub fn neighbors_1(&self, node: NI) -> &[NI] {
        self.csr_1.targets(node)
    }
}

/// Builds a bipartite graph from a single edge list whose first column
/// indexes side 0 and second column indexes side 1. `node_count_0` /
/// `node_count_1` are given explicitly rather than derived from the
/// max id seen, since an edge list alone cannot tell which side an
/// otherwise-unconnected trailing vertex belongs to.
impl<NI, EV, E> From<(E, NI, NI, CsrLayout)> for BipartiteCsrGraph<NI, EV>
where
    NI: Idx,
    EV: Copy + Send + Sync,
    E: Edges<NI = NI, EV = EV>,
{
    fn from((edges, node_count_0, node_count_1, layout): (E, NI, NI, CsrLayout)) -> Self {
        let csr_0 = Csr::from((&edges, node_count_0, Direction::Outgoing, layout));

        let swapped = edges.edges().map(|(s, t, v)| (t, s, v)).collect::<Vec<_>>();
        let swapped = EdgeList::new(swapped);
        let csr_1 = Csr::from((&swapped, node_count_1, Direction::Outgoing, layout));

        Self {
            node_count_0,
            node_count_1,
            csr_0,
            csr_1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::edgelist::EdgeList;

    #[test]
    fn builds_both_sides() {
        // side 0 has 3 vertices, side 1 has 2
        let edges = EdgeList::<usize, ()>::new(vec![(0, 0, ()), (0, 1, ()), (1, 0, ()), (2, 1, ())]);
        let graph = BipartiteCsrGraph::from((edges, 3, 2, CsrLayout::Sorted));

        assert_eq!(graph.node_count_0(), 3);
        assert_eq!(graph.node_count_1(), 2);
        assert_eq!(graph.edge_count(), 4);

        assert_eq!(graph.degree_0(0), 2);
        assert_eq!(graph.neighbors_0(0), &[0, 1]);
        assert_eq!(graph.degree_1(0), 2);
        assert_eq!(graph.neighbors_1(0), &[0, 1]);
        assert_eq!(graph.neighbors_1(1), &[0, 2]);
    }

    #[test]
    fn isolated_vertex_has_zero_degree() {
        let edges = EdgeList::<usize, ()>::new(vec![(0, 0, ())]);
        let graph = BipartiteCsrGraph::from((edges, 2, 1, CsrLayout::Unsorted));

        assert_eq!(graph.degree_0(1), 0);
        assert_eq!(graph.neighbors_0(1), &[] as &[usize]);
    }
}
