use atomic::Atomic;
use byte_slice_cast::{AsByteSlice, AsMutByteSlice, ToByteSlice, ToMutByteSlice};
use log::info;
use std::{
    convert::TryFrom,
    fs::File,
    io::{Read, Write},
    marker::PhantomData,
    path::Path,
    sync::Arc,
};

use crate::index::Idx;

use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::atomic::Ordering::AcqRel;

use crate::{input::Direction, Error};

use super::{InputCapabilities, InputPath, ParseValue};

/// Reads a graph from a file that contains an edge per line.
///
/// An edge is represented by a source node id and a target node id. The two
/// node ids must be separated by a 1-byte character (e.g. whitespace or tab).
///
/// The node count of the resulting graph is the highest node id within the file
/// plus one. The edge count will be twice the number of lines in the file.
///
/// # Example
///
/// ```ignore
/// > cat my_graph.edgelist
/// 0 1
/// 0 2
/// 1 3
/// 2 0
/// ```
pub struct EdgeListInput<NI: Idx, EV = ()> {
    _idx: PhantomData<(NI, EV)>,
}

impl<NI: Idx, EV> Default for EdgeListInput<NI, EV> {
    fn default() -> Self {
        Self { _idx: PhantomData }
    }
}

impl<NI: Idx, EV> InputCapabilities<NI> for EdgeListInput<NI, EV> {
    type GraphInput = EdgeList<NI, EV>;
}

#[allow(clippy::len_without_is_empty)]
pub trait Edges {
    type NI: Idx;
    type EV;

    type EdgeIter<'a>: ParallelIterator<Item = (Self::NI, Self::NI, Self::EV)>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgeIter<'_>;

    fn max_node_id(&self) -> Self::NI {
        default_max_node_id(self)
    }

    fn degrees(&self, node_count: Self::NI, direction: Direction) -> Vec<Atomic<Self::NI>> {
        let mut degrees = Vec::with_capacity(node_count.index());
        degrees.resize_with(node_count.index(), || Atomic::new(Self::NI::zero()));

        if matches!(direction, Direction::Outgoing | Direction::Undirected) {
            self.edges().for_each(|(s, _, _)| {
                Self::NI::get_and_increment(&degrees[s.index()], AcqRel);
            });
        }

        if matches!(direction, Direction::Incoming | Direction::Undirected) {
            self.edges().for_each(|(_, t, _)| {
                Self::NI::get_and_increment(&degrees[t.index()], AcqRel);
            });
        }

        degrees
    }

    #[cfg(test)]
    fn len(&self) -> usize;
}

fn default_max_node_id<E: Edges + ?Sized>(edges: &E) -> E::NI {
    edges
        .edges()
        .into_par_iter()
        .map(|(s, t, _)| E::NI::max(s, t))
        .reduce(E::NI::zero, E::NI::max)
}

#[derive(Debug)]
pub struct EdgeList<NI: Idx, EV> {
    list: Box<[(NI, NI, EV)]>,
    max_node_id: Option<NI>,
}

impl<NI: Idx, EV: Sync> EdgeList<NI, EV> {
    pub fn new(edges: Vec<(NI, NI, EV)>) -> Self {
        Self {
            list: edges.into_boxed_slice(),
            max_node_id: None,
        }
    }

    pub fn with_max_node_id(edges: Vec<(NI, NI, EV)>, max_node_id: NI) -> Self {
        Self {
            list: edges.into_boxed_slice(),
            max_node_id: Some(max_node_id),
        }
    }
}

impl<NI: Idx, EV: Copy + Send + Sync> Edges for EdgeList<NI, EV> {
    type NI = NI;

    type EV = EV;

    type EdgeIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, (Self::NI, Self::NI, Self::EV)>>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgeIter<'_> {
        self.list.into_par_iter().copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.list.len()
    }

    fn max_node_id(&self) -> Self::NI {
        match self.max_node_id {
            Some(id) => id,
            None => default_max_node_id(self),
        }
    }
}

/// Magic bytes identifying the binary edge list format, null-padded to 27
/// bytes.
const MAGIC: &[u8; 27] = b"NW Graph index_edge_list\0\0\0";

impl<NI, EV> EdgeList<NI, EV>
where
    NI: Idx + ToByteSlice,
    EV: ToByteSlice + Copy,
{
    /// Writes this edge list as `magic bytes | directedness | NI type name |
    /// sources column | targets column | values column`, each column
    /// independently length-prefixed.
    pub fn serialize<W: Write>(&self, output: &mut W, directed: bool) -> Result<(), Error> {
        output.write_all(MAGIC)?;
        output.write_all(&[directed as u8])?;

        let type_name = std::any::type_name::<NI>().as_bytes();
        output.write_all([type_name.len()].as_byte_slice())?;
        output.write_all(type_name)?;

        let sources = self.list.iter().map(|e| e.0).collect::<Vec<_>>();
        let targets = self.list.iter().map(|e| e.1).collect::<Vec<_>>();
        let values = self.list.iter().map(|e| e.2).collect::<Vec<_>>();

        write_column(output, &sources)?;
        write_column(output, &targets)?;
        write_column(output, &values)?;

        Ok(())
    }
}

impl<NI, EV> EdgeList<NI, EV>
where
    NI: Idx + ToMutByteSlice,
    EV: ToMutByteSlice + Default + Copy,
{
    /// Reads an edge list written by [`EdgeList::serialize`], returning the
    /// edge list and the directedness byte that was written alongside it.
    pub fn deserialize<R: Read>(read: &mut R) -> Result<(Self, bool), Error> {
        let mut magic = [0_u8; MAGIC.len()];
        read.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(Error::CorruptFormat {
                reason: "missing or mismatched magic bytes".to_string(),
            });
        }

        let mut directed_byte = [0_u8; 1];
        read.read_exact(&mut directed_byte)?;
        let directed = directed_byte[0] != 0;

        let mut type_name_len = [0_usize; 1];
        read.read_exact(type_name_len.as_mut_byte_slice())?;
        let [type_name_len] = type_name_len;

        let mut type_name = vec![0_u8; type_name_len];
        read.read_exact(&mut type_name)?;
        let type_name = String::from_utf8(type_name).map_err(|_| Error::CorruptFormat {
            reason: "type name is not valid UTF-8".to_string(),
        })?;

        let expected_type_name = std::any::type_name::<NI>().to_string();
        if type_name != expected_type_name {
            return Err(Error::InvalidIdType {
                expected: expected_type_name,
                actual: type_name,
            });
        }

        let sources = read_column::<R, NI>(read)?;
        let targets = read_column::<R, NI>(read)?;
        let values = read_column::<R, EV>(read)?;

        if sources.len() != targets.len() || sources.len() != values.len() {
            return Err(Error::CorruptFormat {
                reason: "edge list columns have mismatched lengths".to_string(),
            });
        }

        let list = sources
            .into_iter()
            .zip(targets)
            .zip(values)
            .map(|((s, t), v)| (s, t, v))
            .collect::<Vec<_>>();

        Ok((EdgeList::new(list), directed))
    }

    /// Like [`EdgeList::deserialize`], but takes the caller's expected
    /// directedness instead of returning the stored one. A mismatch is not
    /// fatal -- the stored bytes decide what `fill` will actually do with
    /// this edge list -- so it is logged and loading continues.
    pub fn deserialize_expecting<R: Read>(
        read: &mut R,
        expected_directed: bool,
    ) -> Result<Self, Error> {
        let (edge_list, directed) = Self::deserialize(read)?;
        if directed != expected_directed {
            log::warn!(
                "edge list was serialized as {} but caller expected {}",
                if directed { "directed" } else { "undirected" },
                if expected_directed { "directed" } else { "undirected" },
            );
        }
        Ok(edge_list)
    }
}

fn write_column<W: Write, T: ToByteSlice>(output: &mut W, column: &[T]) -> Result<(), Error> {
    output.write_all([column.len()].as_byte_slice())?;
    output.write_all(column.as_byte_slice())?;
    Ok(())
}

fn read_column<R: Read, T: ToMutByteSlice + Default + Copy>(read: &mut R) -> Result<Vec<T>, Error> {
    let mut len = [0_usize; 1];
    read.read_exact(len.as_mut_byte_slice())?;
    let [len] = len;

    let mut column = vec![T::default(); len];
    read.read_exact(column.as_mut_byte_slice())?;
    Ok(column)
}

pub(crate) struct EdgeIterator<NI: Idx, I: IntoIterator<Item = (NI, NI)>>(pub I);

impl<NI, I> From<EdgeIterator<NI, I>> for EdgeList<NI, ()>
where
    NI: Idx,
    I: IntoIterator<Item = (NI, NI)>,
{
    fn from(iter: EdgeIterator<NI, I>) -> Self {
        EdgeList::new(iter.0.into_iter().map(|(s, t)| (s, t, ())).collect())
    }
}

pub(crate) struct EdgeWithValueIterator<NI: Idx, EV, I: IntoIterator<Item = (NI, NI, EV)>>(pub I);

impl<NI, EV, I> From<EdgeWithValueIterator<NI, EV, I>> for EdgeList<NI, EV>
where
    NI: Idx,
    EV: Sync,
    I: IntoIterator<Item = (NI, NI, EV)>,
{
    fn from(iter: EdgeWithValueIterator<NI, EV, I>) -> Self {
        EdgeList::new(iter.0.into_iter().map(|(s, t, v)| (s, t, v)).collect())
    }
}

impl<NI, P, EV> TryFrom<InputPath<P>> for EdgeList<NI, EV>
where
    P: AsRef<Path>,
    NI: Idx,
    EV: ParseValue + std::fmt::Debug + Send + Sync,
{
    type Error = Error;

    fn try_from(path: InputPath<P>) -> Result<Self, Self::Error> {
        let file = File::open(path.0.as_ref())?;
        let mmap = unsafe { memmap2::MmapOptions::new().populate().map(&file)? };
        EdgeList::try_from(mmap.as_ref())
    }
}

impl<NI, EV> TryFrom<&[u8]> for EdgeList<NI, EV>
where
    NI: Idx,
    EV: ParseValue + std::fmt::Debug + Send + Sync,
{
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let start = std::time::Instant::now();

        let page_size = page_size::get();
        let cpu_count = num_cpus::get_physical();
        let chunk_size =
            (usize::max(1, bytes.len() / cpu_count) + (page_size - 1)) & !(page_size - 1);

        info!(
            "page_size = {}, cpu_count = {}, chunk_size = {}",
            page_size, cpu_count, chunk_size
        );

        let all_edges = Arc::new(Mutex::new(Vec::new()));

        let new_line_bytes = new_line_bytes(bytes);

        std::thread::scope(|s| {
            for start in (0..bytes.len()).step_by(chunk_size) {
                let all_edges = Arc::clone(&all_edges);
                s.spawn(move || {
                    let mut end = usize::min(start + chunk_size, bytes.len());
                    while end <= bytes.len() && bytes[end - 1] != b'\n' {
                        end += 1;
                    }

                    let mut start = start;
                    if start != 0 {
                        while bytes[start - 1] != b'\n' {
                            start += 1;
                        }
                    }

                    let mut edges = Vec::new();
                    let mut chunk = &bytes[start..end];
                    while !chunk.is_empty() {
                        let (source, source_bytes) = NI::parse(chunk);
                        chunk = &chunk[source_bytes + 1..];

                        let (target, target_bytes) = NI::parse(chunk);
                        chunk = &chunk[target_bytes..];

                        let value = match chunk.strip_prefix(b" ") {
                            Some(value_chunk) => {
                                let (value, value_bytes) = EV::parse(value_chunk);
                                chunk = &value_chunk[value_bytes + new_line_bytes..];
                                value
                            }
                            None => {
                                chunk = &chunk[new_line_bytes..];
                                // if the input does not have a value, the default for EV is used
                                EV::parse(&[]).0
                            }
                        };

                        edges.push((source, target, value));
                    }

                    let mut all_edges = all_edges.lock();
                    all_edges.append(&mut edges);
                });
            }
        });

        let edges = Arc::try_unwrap(all_edges).unwrap().into_inner();

        let elapsed = start.elapsed().as_millis() as f64 / 1000_f64;

        info!(
            "Read {} edges in {:.2}s ({:.2} MB/s)",
            edges.len(),
            elapsed,
            ((bytes.len() as f64) / elapsed) / (1024.0 * 1024.0)
        );

        Ok(EdgeList::new(edges))
    }
}

// Returns the OS-dependent number of bytes for newline:
//
// `1` for Linux/macOS style (b'\n')
// '2' for Windows style (b'\r\n')
fn new_line_bytes(bytes: &[u8]) -> usize {
    1 + bytes
        .iter()
        .position(|b| *b == b'\n')
        .and_then(|idx| idx.checked_sub(1))
        .and_then(|idx| bytes.get(idx).copied())
        .map_or(0, |b| (b == b'\r') as usize)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::input::InputPath;

    use super::*;

    #[test]
    fn edge_list_from_linux_file() {
        let path = [env!("CARGO_MANIFEST_DIR"), "resources", "test.el"]
            .iter()
            .collect::<PathBuf>();

        let expected: Vec<(usize, usize, ())> = vec![
            (0, 1, ()),
            (0, 2, ()),
            (1, 2, ()),
            (1, 3, ()),
            (2, 4, ()),
            (3, 4, ()),
        ];

        let edge_list = EdgeList::<usize, ()>::try_from(InputPath(path.as_path())).unwrap();

        assert_eq!(4, edge_list.max_node_id());

        let edge_list = edge_list.list.into_vec();

        assert_eq!(expected, edge_list)
    }

    #[test]
    fn edge_list_with_values_from_file() {
        let path = [env!("CARGO_MANIFEST_DIR"), "resources", "test.wel"]
            .iter()
            .collect::<PathBuf>();

        let expected: Vec<(usize, usize, f32)> = vec![
            (0, 1, 0.1),
            (0, 2, 0.2),
            (1, 2, 0.3),
            (1, 3, 0.4),
            (2, 4, 0.5),
            (3, 4, 0.6),
        ];

        let edge_list = EdgeList::<usize, f32>::try_from(InputPath(path.as_path())).unwrap();

        assert_eq!(4, edge_list.max_node_id());

        let edge_list = edge_list.list.into_vec();

        assert_eq!(expected, edge_list)
    }

    #[test]
    fn edge_list_from_windows_file() {
        let path = [env!("CARGO_MANIFEST_DIR"), "resources", "windows.el"]
            .iter()
            .collect::<PathBuf>();

        println!("{path:?}");

        let edge_list = EdgeList::<usize, ()>::try_from(InputPath(path.as_path())).unwrap();

        assert_eq!(3, edge_list.max_node_id());
    }

    #[test]
    fn serialize_deserialize_roundtrip() {
        let edges = vec![(0_u32, 1, 1.5_f32), (1, 2, 2.5), (2, 0, 3.5)];
        let edge_list = EdgeList::new(edges.clone());

        let mut buffer = Vec::new();
        edge_list.serialize(&mut buffer, true).unwrap();

        let (deserialized, directed) =
            EdgeList::<u32, f32>::deserialize(&mut buffer.as_slice()).unwrap();

        assert!(directed);
        assert_eq!(deserialized.list.into_vec(), edges);
    }

    #[test]
    fn deserialize_rejects_bad_magic() {
        let mut buffer = vec![0_u8; 64];
        let err = EdgeList::<u32, f32>::deserialize(&mut buffer.as_slice());
        assert!(err.is_err());
    }

    #[test]
    fn deserialize_rejects_mismatched_id_type() {
        let edges = vec![(0_u32, 1, ())];
        let edge_list = EdgeList::new(edges);

        let mut buffer = Vec::new();
        edge_list.serialize(&mut buffer, false).unwrap();

        let result = EdgeList::<u64, ()>::deserialize(&mut buffer.as_slice());
        assert!(matches!(result, Err(Error::InvalidIdType { .. })));
    }

    #[test]
    fn deserialize_expecting_tolerates_directedness_mismatch() {
        let edges = vec![(0_u32, 1, ())];
        let edge_list = EdgeList::new(edges.clone());

        let mut buffer = Vec::new();
        edge_list.serialize(&mut buffer, true).unwrap();

        let deserialized =
            EdgeList::<u32, ()>::deserialize_expecting(&mut buffer.as_slice(), false).unwrap();

        assert_eq!(deserialized.list.into_vec(), edges);
    }
}
