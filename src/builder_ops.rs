//! Pure transformations over an edge tuple slice, applied before the edges
//! are frozen into an [`crate::input::edgelist::EdgeList`] and handed to a
//! graph's `From` conversion.
//!
//! Every function here is a plain `&mut [_]` / `&mut Vec<_>` transformation:
//! none of them allocate a new graph, and none of them depend on `rayon` --
//! they run once, up front, while the edge set is still small enough that a
//! sequential pass is not the bottleneck.

use crate::index::Idx;
use crate::Error;

/// Which endpoint a triangularisation keeps in column `IDX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Succession {
    /// `IDX` holds the smaller of the two endpoints.
    Successor,
    /// `IDX` holds the larger of the two endpoints.
    Predecessor,
}

impl Succession {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "successor" => Ok(Succession::Successor),
            "predecessor" => Ok(Succession::Predecessor),
            other => Err(Error::BadOption {
                option: other.to_string(),
            }),
        }
    }
}

/// Ordering used by [`perm_by_degree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, Error> {
        match value {
            "ascending" => Ok(SortOrder::Ascending),
            "descending" => Ok(SortOrder::Descending),
            other => Err(Error::BadOption {
                option: other.to_string(),
            }),
        }
    }
}

/// Stable sort of `edges` by the `IDX`-th endpoint only.
pub fn sort_by<const IDX: usize, NI: Idx, EV>(edges: &mut [(NI, NI, EV)]) {
    match IDX {
        0 => edges.sort_by_key(|e| e.0),
        1 => edges.sort_by_key(|e| e.1),
        _ => panic!("IDX must be 0 or 1"),
    }
}

/// Stable sort of `edges` by `(col[IDX], col[1 - IDX])`.
pub fn lexical_sort_by<const IDX: usize, NI: Idx, EV>(edges: &mut [(NI, NI, EV)]) {
    match IDX {
        0 => edges.sort_by_key(|e| (e.0, e.1)),
        1 => edges.sort_by_key(|e| (e.1, e.0)),
        _ => panic!("IDX must be 0 or 1"),
    }
}

/// Swaps each edge's endpoints so that column `IDX` holds the smaller
/// (`Succession::Successor`) or larger (`Succession::Predecessor`) of the
/// two. A second call with the same succession is a no-op.
///
/// Intended for unipartite edge lists; mixing this with a bipartite edge
/// list collapses the side distinction and is a caller error.
pub fn swap_to_triangular<const IDX: usize, NI: Idx, EV>(
    edges: &mut [(NI, NI, EV)],
    succession: Succession,
) {
    assert!(IDX == 0 || IDX == 1, "IDX must be 0 or 1");
    let keep_idx_smaller = matches!(succession, Succession::Successor);
    for edge in edges.iter_mut() {
        let (idx_val, other_val) = if IDX == 0 {
            (edge.0, edge.1)
        } else {
            (edge.1, edge.0)
        };
        let needs_swap = if keep_idx_smaller {
            idx_val > other_val
        } else {
            idx_val < other_val
        };
        if needs_swap {
            std::mem::swap(&mut edge.0, &mut edge.1);
        }
    }
}

/// Removes adjacent duplicate `(col0, col1)` pairs, keeping the first
/// occurrence's properties. Callers must sort with [`lexical_sort_by`] first
/// -- `dedup_by` only removes duplicates that are already neighbors.
pub fn uniq<NI: Idx, EV>(edges: &mut Vec<(NI, NI, EV)>) {
    edges.dedup_by(|a, b| a.0 == b.0 && a.1 == b.1);
}

/// Drops every edge `(u, u)`.
pub fn remove_self_loops<NI: Idx, EV>(edges: &mut Vec<(NI, NI, EV)>) {
    edges.retain(|e| e.0 != e.1);
}

/// A length-`node_count` degree histogram grouped by column `IDX`. For
/// undirected input, both endpoints of each edge contribute to the
/// histogram; for directed input only the `IDX`-th endpoint does.
pub fn degrees<const IDX: usize, NI: Idx, EV>(
    edges: &[(NI, NI, EV)],
    node_count: NI,
    directed: bool,
) -> Vec<NI> {
    assert!(IDX == 0 || IDX == 1, "IDX must be 0 or 1");
    let mut degrees = vec![NI::zero(); node_count.index()];
    for edge in edges {
        let (grouping, other) = if IDX == 0 {
            (edge.0, edge.1)
        } else {
            (edge.1, edge.0)
        };
        degrees[grouping.index()] += NI::new(1);
        if !directed {
            degrees[other.index()] += NI::new(1);
        }
    }
    degrees
}

/// A permutation of vertex ids sorted by `degrees`, ties broken by the
/// original id (stable sort). `perm[i]` is the old vertex id that should be
/// relabeled to new id `i`.
pub fn perm_by_degree<NI: Idx>(degrees: &[NI], order: SortOrder) -> Vec<NI> {
    let mut perm = (0..degrees.len()).map(NI::new).collect::<Vec<_>>();
    match order {
        SortOrder::Ascending => perm.sort_by_key(|&id| degrees[id.index()]),
        SortOrder::Descending => perm.sort_by(|&a, &b| degrees[b.index()].cmp(&degrees[a.index()])),
    }
    perm
}

/// Rewrites the `IDX`-th endpoint of every edge through `perm`, where
/// `perm[i]` is the old vertex id that becomes new id `i`. Returns the
/// inverse permutation (old id -> new id) it used, so the relabel can be
/// undone.
pub fn relabel<const IDX: usize, NI: Idx, EV>(edges: &mut [(NI, NI, EV)], perm: &[NI]) -> Vec<NI> {
    assert!(IDX == 0 || IDX == 1, "IDX must be 0 or 1");
    let inverse = invert(perm);
    for edge in edges.iter_mut() {
        if IDX == 0 {
            edge.0 = inverse[edge.0.index()];
        } else {
            edge.1 = inverse[edge.1.index()];
        }
    }
    inverse
}

/// Rewrites both endpoints of every edge through `perm` (the unipartite
/// case, where source and target ids share one vertex set). Returns the
/// inverse permutation it used.
pub fn relabel_both<NI: Idx, EV>(edges: &mut [(NI, NI, EV)], perm: &[NI]) -> Vec<NI> {
    let inverse = invert(perm);
    for edge in edges.iter_mut() {
        edge.0 = inverse[edge.0.index()];
        edge.1 = inverse[edge.1.index()];
    }
    inverse
}

fn invert<NI: Idx>(perm: &[NI]) -> Vec<NI> {
    let mut inverse = vec![NI::zero(); perm.len()];
    for (new_id, &old_id) in perm.iter().enumerate() {
        inverse[old_id.index()] = NI::new(new_id);
    }
    inverse
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_source() {
        let mut edges = vec![(2_u32, 0, ()), (0, 1, ()), (1, 2, ())];
        sort_by::<0, _, _>(&mut edges);
        assert_eq!(edges, vec![(0, 1, ()), (1, 2, ()), (2, 0, ())]);
    }

    #[test]
    fn lexical_sort_by_target() {
        let mut edges = vec![(1_u32, 0, ()), (0, 0, ()), (0, 1, ())];
        lexical_sort_by::<1, _, _>(&mut edges);
        assert_eq!(edges, vec![(0, 0, ()), (1, 0, ()), (0, 1, ())]);
    }

    #[test]
    fn swap_to_triangular_successor() {
        let mut edges = vec![(3_u32, 1, ()), (1, 2, ())];
        swap_to_triangular::<0, _, _>(&mut edges, Succession::Successor);
        assert_eq!(edges, vec![(1, 3, ()), (1, 2, ())]);
    }

    #[test]
    fn swap_to_triangular_idempotent() {
        let mut edges = vec![(3_u32, 1, ()), (1, 2, ())];
        swap_to_triangular::<0, _, _>(&mut edges, Succession::Successor);
        let once = edges.clone();
        swap_to_triangular::<0, _, _>(&mut edges, Succession::Successor);
        assert_eq!(edges, once);
    }

    #[test]
    fn uniq_removes_adjacent_duplicates() {
        let mut edges = vec![(0_u32, 1, 'a'), (0, 1, 'b'), (0, 2, 'c')];
        lexical_sort_by::<0, _, _>(&mut edges);
        uniq(&mut edges);
        assert_eq!(edges, vec![(0, 1, 'a'), (0, 2, 'c')]);
    }

    #[test]
    fn remove_self_loops_drops_them() {
        let mut edges = vec![(0_u32, 0, ()), (0, 1, ()), (2, 2, ())];
        remove_self_loops(&mut edges);
        assert_eq!(edges, vec![(0, 1, ())]);
    }

    #[test]
    fn degrees_directed() {
        let edges = vec![(0_u32, 1, ()), (0, 2, ()), (1, 2, ())];
        let d = degrees::<0, _, _>(&edges, 3, true);
        assert_eq!(d, vec![2, 1, 0]);
    }

    #[test]
    fn degrees_undirected() {
        let edges = vec![(0_u32, 1, ()), (0, 2, ()), (1, 2, ())];
        let d = degrees::<0, _, _>(&edges, 3, false);
        assert_eq!(d, vec![2, 2, 2]);
    }

    #[test]
    fn perm_by_degree_descending() {
        let degrees = vec![1_u32, 3, 2];
        let perm = perm_by_degree(&degrees, SortOrder::Descending);
        assert_eq!(perm, vec![1, 2, 0]);
    }

    #[test]
    fn relabel_symmetry() {
        let mut edges = vec![(0_u32, 1, ()), (1, 2, ()), (2, 0, ())];
        let perm = vec![2_u32, 0, 1];
        let original = edges.clone();
        let inverse = relabel_both(&mut edges, &perm);
        let back = relabel_both(&mut edges, &inverse);
        let _ = back;
        assert_ne!(edges, original.clone());
        // relabeling by the inverse of the inverse (i.e. perm again) restores the original
        relabel_both(&mut edges, &perm);
        assert_eq!(edges, original);
    }
}
