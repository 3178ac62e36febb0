pub use crate::builder::GraphBuilder;

pub use crate::graph::biadjacency::BipartiteCsrGraph;
pub use crate::graph::csr::CsrLayout;
pub use crate::graph::csr::DirectedCsrGraph;
pub use crate::graph::csr::UndirectedCsrGraph;
pub use crate::graph::Target;

pub use crate::builder_ops::{
    degrees, lexical_sort_by, perm_by_degree, relabel, remove_self_loops, sort_by,
    swap_to_triangular, uniq, SortOrder, Succession,
};

pub use crate::ranges::{
    BackEdgeRange, CyclicNeighborRange, DagRange, DepthFirstEdgeRange, DepthFirstRange,
    EdgeRange, FilteredBfsRange, NeighborRange, PlainRange, ReversePathRange, VertexRange,
};

pub use crate::graph_ops::DegreePartitionOp;
pub use crate::graph_ops::DeserializeGraphOp;
pub use crate::graph_ops::ForEachNodeParallelByPartitionOp;
pub use crate::graph_ops::ForEachNodeParallelOp;
pub use crate::graph_ops::InDegreePartitionOp;
pub use crate::graph_ops::OutDegreePartitionOp;
pub use crate::graph_ops::RelabelByDegreeOp;
pub use crate::graph_ops::SerializeGraphOp;
pub use crate::graph_ops::ToUndirectedOp;

pub use crate::index::Idx;
pub use atomic::Atomic;

pub use crate::input::*;

pub use crate::DirectedDegrees;
pub use crate::DirectedNeighbors;
pub use crate::DirectedNeighborsWithValues;
pub use crate::EdgeMutation;
pub use crate::Graph;
pub use crate::NodeValues;
pub use crate::UndirectedDegrees;
pub use crate::UndirectedNeighbors;
pub use crate::UndirectedNeighborsWithValues;

pub use crate::Error;
