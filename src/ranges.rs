//! Lazy views over a graph's vertex and edge sets.
//!
//! These are ordinary [`Iterator`]s (and, where it is cheap to do so,
//! [`rayon`] parallel iterators) rather than a bespoke cursor API: splitting
//! work across threads is rayon's job, not this module's.

use std::collections::VecDeque;

use bitvec::vec::BitVec;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use rayon::iter::plumbing::{Consumer, ProducerCallback, UnindexedConsumer};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::graph::Target;
use crate::index::Idx;
use crate::{DirectedDegrees, DirectedNeighbors, DirectedNeighborsWithValues, Graph};

/// A divisible view over the vertex ids `0..node_count` of a graph.
///
/// Implements [`rayon::iter::IndexedParallelIterator`] by delegating to
/// `Range<usize>`'s own producer, which already knows how to split itself
/// in half for work-stealing.
#[derive(Clone, Debug)]
pub struct VertexRange<NI> {
    range: std::ops::Range<usize>,
    _marker: std::marker::PhantomData<NI>,
}

impl<NI: Idx> VertexRange<NI> {
    pub fn new(node_count: NI) -> Self {
        Self {
            range: 0..node_count.index(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn size(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl<NI: Idx> Iterator for VertexRange<NI> {
    type Item = NI;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(NI::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<NI: Idx> ExactSizeIterator for VertexRange<NI> {
    fn len(&self) -> usize {
        self.range.len()
    }
}

impl<NI: Idx> DoubleEndedIterator for VertexRange<NI> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(NI::new)
    }
}

impl<NI: Idx> ParallelIterator for VertexRange<NI> {
    type Item = NI;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.range.into_par_iter().map(NI::new).drive_unindexed(consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.range.len())
    }
}

impl<NI: Idx> IndexedParallelIterator for VertexRange<NI> {
    fn len(&self) -> usize {
        self.range.len()
    }

    fn drive<C: Consumer<Self::Item>>(self, consumer: C) -> C::Result {
        self.range.into_par_iter().map(NI::new).drive(consumer)
    }

    fn with_producer<CB: ProducerCallback<Self::Item>>(self, callback: CB) -> CB::Output {
        self.range.into_par_iter().map(NI::new).with_producer(callback)
    }
}

/// A thin wrapper over [`VertexRange`] for callers that want the name to
/// read as "any contiguous id range", not specifically "the graph's
/// vertices" -- e.g. a sub-range of node ids picked for a partition.
pub type PlainRange<NI> = VertexRange<NI>;

/// Yields every stored outgoing edge `(u, v, value)` of a directed graph, in
/// source-node order.
pub struct EdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    node: NI,
    node_count: NI,
    row: Option<<G as DirectedNeighborsWithValues<NI, EV>>::NeighborsIterator<'g>>,
}

impl<'g, NI, EV, G> EdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    pub fn out_edges(g: &'g G) -> Self {
        Self {
            g,
            node: NI::zero(),
            node_count: g.node_count(),
            row: None,
        }
    }
}

impl<'g, NI, EV, G> Iterator for EdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    EV: Copy,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    type Item = (NI, NI, EV);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.row.as_mut() {
                if let Some(t) = row.next() {
                    return Some((self.node, t.target, t.value));
                }
                self.row = None;
                self.node += NI::new(1);
            }
            if self.node >= self.node_count {
                return None;
            }
            self.row = Some(self.g.out_neighbors_with_values(self.node));
        }
    }
}

/// Yields every stored edge `(u, v, value)` of an undirected graph. Since an
/// undirected edge is stored once per endpoint, each edge is yielded twice:
/// once as `(u, v, _)` and once as `(v, u, _)`.
pub struct UndirectedEdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    G: crate::UndirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    node: NI,
    node_count: NI,
    row: Option<<G as crate::UndirectedNeighborsWithValues<NI, EV>>::NeighborsIterator<'g>>,
}

impl<'g, NI, EV, G> UndirectedEdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    G: Graph<NI> + crate::UndirectedNeighborsWithValues<NI, EV>,
{
    pub fn new(g: &'g G) -> Self {
        Self {
            g,
            node: NI::zero(),
            node_count: g.node_count(),
            row: None,
        }
    }
}

impl<'g, NI, EV, G> Iterator for UndirectedEdgeRange<'g, NI, EV, G>
where
    NI: Idx,
    EV: Copy,
    G: Graph<NI> + crate::UndirectedNeighborsWithValues<NI, EV>,
{
    type Item = (NI, NI, EV);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.row.as_mut() {
                if let Some(t) = row.next() {
                    return Some((self.node, t.target, t.value));
                }
                self.row = None;
                self.node += NI::new(1);
            }
            if self.node >= self.node_count {
                return None;
            }
            self.row = Some(self.g.neighbors_with_values(self.node));
        }
    }
}

/// Yields `(node, row)` pairs for every vertex of a directed graph, where
/// `row` is that vertex's outgoing neighbor iterator.
pub struct NeighborRange<'g, NI, EV, G>
where
    NI: Idx,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    node: NI,
    node_count: NI,
}

impl<'g, NI, EV, G> NeighborRange<'g, NI, EV, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    pub fn new(g: &'g G) -> Self {
        Self {
            g,
            node: NI::zero(),
            node_count: g.node_count(),
        }
    }
}

impl<'g, NI, EV, G> Iterator for NeighborRange<'g, NI, EV, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    type Item = (NI, <G as DirectedNeighborsWithValues<NI, EV>>::NeighborsIterator<'g>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.node >= self.node_count {
            return None;
        }
        let node = self.node;
        self.node += NI::new(1);
        Some((node, self.g.out_neighbors_with_values(node)))
    }
}

/// A strided, recursively-splittable vertex range used to hand out work in a
/// round-robin (rather than block) pattern, which balances better when
/// later vertices tend to carry higher degree. `cutoff` bounds how far the
/// stride can double before `is_divisible` refuses further splitting.
#[derive(Clone, Debug)]
pub struct CyclicNeighborRange<NI> {
    begin: usize,
    end: usize,
    cycle: usize,
    stride: usize,
    cutoff: usize,
    _marker: std::marker::PhantomData<NI>,
}

impl<NI: Idx> CyclicNeighborRange<NI> {
    pub fn new(node_count: NI, cutoff: usize) -> Self {
        Self {
            begin: 0,
            end: node_count.index(),
            cycle: 0,
            stride: 1,
            cutoff: cutoff.next_power_of_two(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn is_divisible(&self) -> bool {
        self.stride <= self.cutoff && self.end > self.begin + self.stride
    }

    pub fn split(self) -> (Self, Self) {
        let Self {
            begin,
            end,
            cycle,
            stride,
            cutoff,
            ..
        } = self;
        let left = Self {
            begin,
            end,
            cycle,
            stride: stride * 2,
            cutoff,
            _marker: std::marker::PhantomData,
        };
        let right = Self {
            begin,
            end,
            cycle: cycle + stride,
            stride: stride * 2,
            cutoff,
            _marker: std::marker::PhantomData,
        };
        (left, right)
    }
}

impl<NI: Idx> Iterator for CyclicNeighborRange<NI> {
    type Item = NI;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.begin + self.cycle;
        if pos >= self.end {
            return None;
        }
        self.cycle += self.stride;
        Some(NI::new(pos))
    }
}

/// Pre-order depth-first traversal of vertex ids reachable from `source`,
/// via an explicit stack and a visited bitset (no recursion, so traversal
/// depth is bounded only by available memory).
pub struct DepthFirstRange<'g, NI: Idx, G> {
    g: &'g G,
    visited: BitVec,
    stack: Vec<NI>,
    started: bool,
}

impl<'g, NI, G> DepthFirstRange<'g, NI, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighbors<NI>,
{
    pub fn new(g: &'g G, source: NI) -> Self {
        let mut visited = BitVec::repeat(false, g.node_count().index());
        visited.set(source.index(), true);
        Self {
            g,
            visited,
            stack: vec![source],
            started: false,
        }
    }
}

impl<'g, NI, G> Iterator for DepthFirstRange<'g, NI, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighbors<NI>,
{
    type Item = NI;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return self.stack.last().copied();
        }
        loop {
            let node = *self.stack.last()?;
            let mut found = None;
            for &next in self.g.out_neighbors(node) {
                if !self.visited[next.index()] {
                    found = Some(next);
                    break;
                }
            }
            match found {
                Some(next) => {
                    self.visited.set(next.index(), true);
                    self.stack.push(next);
                    return Some(next);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Depth-first traversal yielding tree edges `(parent, child)` instead of
/// bare vertex ids.
pub struct DepthFirstEdgeRange<'g, NI: Idx, G> {
    g: &'g G,
    visited: BitVec,
    stack: Vec<NI>,
}

impl<'g, NI, G> DepthFirstEdgeRange<'g, NI, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighbors<NI>,
{
    pub fn new(g: &'g G, source: NI) -> Self {
        let mut visited = BitVec::repeat(false, g.node_count().index());
        visited.set(source.index(), true);
        Self {
            g,
            visited,
            stack: vec![source],
        }
    }
}

impl<'g, NI, G> Iterator for DepthFirstEdgeRange<'g, NI, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedNeighbors<NI>,
{
    type Item = (NI, NI);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = *self.stack.last()?;
            let mut found = None;
            for &next in self.g.out_neighbors(node) {
                if !self.visited[next.index()] {
                    found = Some(next);
                    break;
                }
            }
            match found {
                Some(next) => {
                    self.visited.set(next.index(), true);
                    self.stack.push(next);
                    return Some((node, next));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Breadth-first traversal from `source` toward `sink`, skipping any edge
/// for which `skip` returns `true`. Stops as soon as `sink` is discovered.
///
/// [`FilteredBfsRange::found`] and [`FilteredBfsRange::unreachable`] let a
/// caller distinguish "not finished yet" from "no path exists" without an
/// error variant -- there is nothing exceptional about an unreachable sink.
pub struct FilteredBfsRange<'g, NI, EV, G, F>
where
    NI: Idx,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    sink: NI,
    visited: BitVec,
    queue: VecDeque<NI>,
    skip: F,
    found: bool,
    exhausted: bool,
}

impl<'g, NI, EV, G, F> FilteredBfsRange<'g, NI, EV, G, F>
where
    NI: Idx,
    EV: Copy,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
    F: FnMut(NI, &Target<NI, EV>) -> bool,
{
    pub fn new(g: &'g G, source: NI, sink: NI, skip: F) -> Self {
        let mut visited = BitVec::repeat(false, g.node_count().index());
        visited.set(source.index(), true);
        let mut queue = VecDeque::new();
        queue.push_back(source);
        Self {
            g,
            sink,
            visited,
            queue,
            skip,
            found: source == sink,
            exhausted: false,
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn unreachable(&self) -> bool {
        self.exhausted && !self.found
    }
}

impl<'g, NI, EV, G, F> Iterator for FilteredBfsRange<'g, NI, EV, G, F>
where
    NI: Idx,
    EV: Copy,
    G: Graph<NI> + DirectedNeighborsWithValues<NI, EV>,
    F: FnMut(NI, &Target<NI, EV>) -> bool,
{
    type Item = NI;

    fn next(&mut self) -> Option<Self::Item> {
        if self.found {
            return None;
        }
        while let Some(node) = self.queue.pop_front() {
            for t in self.g.out_neighbors_with_values(node) {
                if (self.skip)(node, t) {
                    continue;
                }
                if !self.visited[t.target.index()] {
                    self.visited.set(t.target.index(), true);
                    if t.target == self.sink {
                        self.found = true;
                        return Some(t.target);
                    }
                    self.queue.push_back(t.target);
                }
            }
        }
        self.exhausted = true;
        None
    }
}

/// Looks up the reverse of a stored directed edge, synthesizing a surrogate
/// when the reverse edge isn't itself present in the graph.
///
/// Grounded in the common need (e.g. max-flow residual graphs) to walk a
/// directed graph as if every edge had a companion in the other direction,
/// without actually doubling the stored edge set.
pub struct BackEdgeRange<'g, NI, EV, G>
where
    NI: Idx + std::hash::Hash,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    surrogates: Mutex<FxHashMap<(NI, NI), Target<NI, EV>>>,
}

impl<'g, NI, EV, G> BackEdgeRange<'g, NI, EV, G>
where
    NI: Idx + std::hash::Hash,
    EV: Copy + Default,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    pub fn new(g: &'g G) -> Self {
        Self {
            g,
            surrogates: Mutex::new(FxHashMap::default()),
        }
    }

    /// Returns the edge `(v, u)` for a stored edge `(u, v)`: if `(v, u)` is
    /// itself present (found by scanning `u`'s incoming row for `v`), its
    /// stored value is returned; otherwise a zero-valued surrogate is
    /// created and cached for the lifetime of this range.
    pub fn get_back_edge(&self, u: NI, v: NI) -> Target<NI, EV> {
        for t in self.g.in_neighbors_with_values(u) {
            if t.target == v {
                return *t;
            }
        }
        let mut surrogates = self.surrogates.lock();
        *surrogates.entry((u, v)).or_insert_with(|| Target::new(v, EV::default()))
    }
}

/// Yields every edge `(u, v, ready)` of a DAG in topological (Kahn) order,
/// where `ready` indicates `v`'s in-degree reached zero as a result of this
/// edge -- i.e. `v` just became available for processing.
pub struct DagRange<'g, NI, EV, G>
where
    NI: Idx,
    G: DirectedNeighborsWithValues<NI, EV>,
{
    g: &'g G,
    indegree: Vec<NI>,
    queue: VecDeque<NI>,
    current: Option<(NI, <G as DirectedNeighborsWithValues<NI, EV>>::NeighborsIterator<'g>)>,
}

impl<'g, NI, EV, G> DagRange<'g, NI, EV, G>
where
    NI: Idx,
    G: Graph<NI> + DirectedDegrees<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    pub fn new(g: &'g G) -> Self {
        let node_count = g.node_count();
        let mut indegree = Vec::with_capacity(node_count.index());
        let mut queue = VecDeque::new();
        for n in NI::zero().range(node_count) {
            let d = g.in_degree(n);
            indegree.push(d);
            if d == NI::zero() {
                queue.push_back(n);
            }
        }
        Self {
            g,
            indegree,
            queue,
            current: None,
        }
    }
}

impl<'g, NI, EV, G> Iterator for DagRange<'g, NI, EV, G>
where
    NI: Idx,
    EV: Copy,
    G: Graph<NI> + DirectedDegrees<NI> + DirectedNeighborsWithValues<NI, EV>,
{
    type Item = (NI, NI, bool);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((u, row)) = self.current.as_mut() {
                if let Some(t) = row.next() {
                    let v = t.target;
                    self.indegree[v.index()] -= NI::new(1);
                    let ready = self.indegree[v.index()] == NI::zero();
                    if ready {
                        self.queue.push_back(v);
                    }
                    return Some((*u, v, ready));
                }
                self.current = None;
            }
            let u = self.queue.pop_front()?;
            self.current = Some((u, self.g.out_neighbors_with_values(u)));
        }
    }
}

/// Walks a predecessor array backward from `start` to `stop`, yielding
/// vertex ids in reverse-path order (start first, stop last). Stops early,
/// without yielding `stop`, if it encounters `null` first -- the caller's
/// signal that the path doesn't reach `stop`.
pub struct ReversePathRange<'p, NI: Idx> {
    pred: &'p [NI],
    current: Option<NI>,
    stop: NI,
    null: NI,
}

impl<'p, NI: Idx> ReversePathRange<'p, NI> {
    pub fn new(pred: &'p [NI], start: NI, stop: NI, null: NI) -> Self {
        Self {
            pred,
            current: Some(start),
            stop,
            null,
        }
    }
}

impl<'p, NI: Idx> Iterator for ReversePathRange<'p, NI> {
    type Item = NI;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.current?;
        if node == self.null {
            self.current = None;
            return None;
        }
        if node == self.stop {
            self.current = None;
            return Some(node);
        }
        self.current = Some(self.pred[node.index()]);
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::graph::csr::DirectedCsrGraph;

    #[test]
    fn vertex_range_collects_all_ids() {
        let range = VertexRange::<u32>::new(5);
        assert_eq!(range.collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn vertex_range_is_a_rayon_iterator() {
        let sum: u32 = VertexRange::<u32>::new(5).into_par_iter().sum();
        assert_eq!(sum, 10);
    }

    #[test]
    fn cyclic_neighbor_range_tiles_the_full_vertex_set() {
        fn leaves(range: CyclicNeighborRange<u32>, out: &mut Vec<u32>) {
            if range.is_divisible() {
                let (left, right) = range.split();
                leaves(left, out);
                leaves(right, out);
            } else {
                out.extend(range);
            }
        }

        let mut collected = Vec::new();
        leaves(CyclicNeighborRange::<u32>::new(7, 2), &mut collected);
        collected.sort_unstable();

        assert_eq!(collected, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn edge_range_yields_out_edges_in_source_order() {
        let graph: DirectedCsrGraph<usize> = GraphBuilder::new()
            .edges(vec![(0, 1), (0, 2), (1, 2)])
            .build();
        let edges = EdgeRange::out_edges(&graph)
            .map(|(u, v, _)| (u, v))
            .collect::<Vec<_>>();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn depth_first_range_visits_reachable_nodes_once() {
        let graph: DirectedCsrGraph<usize> = GraphBuilder::new()
            .edges(vec![(0, 1), (0, 2), (1, 3), (2, 3)])
            .build();
        let mut visited = DepthFirstRange::new(&graph, 0).collect::<Vec<_>>();
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2, 3]);
    }

    #[test]
    fn filtered_bfs_range_finds_sink() {
        let graph: DirectedCsrGraph<usize> = GraphBuilder::new()
            .edges_with_values(vec![(0, 1, ()), (1, 2, ()), (0, 2, ())])
            .build();
        let mut bfs = FilteredBfsRange::new(&graph, 0, 2, |_, _| false);
        let path = bfs.by_ref().collect::<Vec<_>>();
        assert!(bfs.found());
        assert!(path.contains(&2));
    }

    #[test]
    fn filtered_bfs_range_reports_unreachable() {
        let graph: DirectedCsrGraph<usize> = GraphBuilder::new()
            .edges_with_values(vec![(0, 1, ())])
            .build();
        let mut bfs = FilteredBfsRange::new(&graph, 0, 2, |_, _| false);
        let _ = bfs.by_ref().collect::<Vec<_>>();
        assert!(bfs.unreachable());
    }

    #[test]
    fn dag_range_emits_edges_with_readiness() {
        let graph: DirectedCsrGraph<usize> = GraphBuilder::new()
            .edges_with_values(vec![(0, 1, ()), (0, 2, ()), (1, 3, ()), (2, 3, ())])
            .build();
        let edges = DagRange::new(&graph).collect::<Vec<_>>();
        let ready_edges = edges.iter().filter(|(_, _, ready)| *ready).count();
        // node 3 only becomes ready once both of its incoming edges have fired
        assert_eq!(ready_edges, 3);
    }

    #[test]
    fn reverse_path_range_walks_predecessors() {
        let pred = vec![usize::MAX, 0, 1, 2];
        let path = ReversePathRange::new(&pred, 3, 0, usize::MAX).collect::<Vec<_>>();
        assert_eq!(path, vec![3, 2, 1, 0]);
    }

    #[test]
    fn reverse_path_range_stops_at_null() {
        let pred = vec![usize::MAX, usize::MAX, 1];
        let path = ReversePathRange::new(&pred, 2, 0, usize::MAX).collect::<Vec<_>>();
        assert_eq!(path, vec![2, 1]);
    }
}
