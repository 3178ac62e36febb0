use std::convert::TryFrom;
use std::marker::PhantomData;
use std::path::Path;

use rayon::prelude::*;

use crate::index::Idx;
use crate::input::edgelist::Edges;
use crate::input::{InputCapabilities, InputPath, ParseValue};
use crate::Error;

/// Reads a graph from a coordinate-format Matrix Market file:
///
/// ```text
/// %%MatrixMarket matrix coordinate real general
/// % optional comment lines
/// 3 3 4
/// 1 1 1.0
/// 1 2 0.5
/// 2 3 0.25
/// 3 3 2.0
/// ```
///
/// Row and column indices are 1-based in the file and converted to 0-based
/// on read. A `pattern` value field means edges carry no weight; `EV`'s
/// [`ParseValue::parse`] is then called on an empty slice, matching how the
/// plain edge list format treats a missing weight column.
pub struct MatrixMarketInput<NI: Idx, EV = f32> {
    _phantom: PhantomData<(NI, EV)>,
}

impl<NI: Idx, EV> Default for MatrixMarketInput<NI, EV> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<NI: Idx, EV> InputCapabilities<NI> for MatrixMarketInput<NI, EV> {
    type GraphInput = MatrixMarketGraph<NI, EV>;
}

/// The parsed triples of a coordinate-format Matrix Market file.
///
/// A `symmetric` header is expanded into both `(row, col)` and `(col, row)`
/// triples at parse time (self-loops excepted) -- the matrix genuinely has
/// both entries, so this is closer to the source data than leaving
/// symmetrization to whichever graph direction the caller happens to build.
#[derive(Debug)]
pub struct MatrixMarketGraph<NI: Idx, EV> {
    triples: Vec<(NI, NI, EV)>,
    symmetric: bool,
}

impl<NI: Idx, EV> MatrixMarketGraph<NI, EV> {
    /// Whether the source header declared the matrix symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }
}

impl<NI, EV> MatrixMarketGraph<NI, EV>
where
    NI: Idx,
    EV: ParseValue + Copy,
{
    fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(bytes).map_err(|_| Error::CorruptFormat {
            reason: "input is not valid UTF-8".to_string(),
        })?;

        let mut lines = text.lines();

        let header = lines.next().ok_or_else(|| Error::CorruptFormat {
            reason: "missing Matrix Market header".to_string(),
        })?;
        let fields = header.split_whitespace().collect::<Vec<_>>();

        if fields.len() < 5 || fields[0] != "%%MatrixMarket" || fields[1] != "matrix" || fields[2] != "coordinate"
        {
            return Err(Error::CorruptFormat {
                reason: format!("unsupported Matrix Market header: {header}"),
            });
        }

        let pattern = match fields[3] {
            "real" | "integer" => false,
            "pattern" => true,
            other => {
                return Err(Error::CorruptFormat {
                    reason: format!("unsupported value field: {other}"),
                })
            }
        };

        let symmetric = match fields[4] {
            "general" => false,
            "symmetric" => true,
            other => {
                return Err(Error::CorruptFormat {
                    reason: format!("unsupported symmetry field: {other}"),
                })
            }
        };

        let mut lines = lines.filter(|line| !line.trim().is_empty() && !line.starts_with('%'));

        let dims = lines.next().ok_or_else(|| Error::CorruptFormat {
            reason: "missing Matrix Market dimensions line".to_string(),
        })?;
        let dims = dims.split_whitespace().collect::<Vec<_>>();
        if dims.len() != 3 {
            return Err(Error::CorruptFormat {
                reason: format!("malformed dimensions line: {dims:?}"),
            });
        }
        let nnz = dims[2].parse::<usize>().map_err(|_| Error::CorruptFormat {
            reason: format!("malformed nnz count: {}", dims[2]),
        })?;

        let mut triples = Vec::with_capacity(if symmetric { nnz * 2 } else { nnz });

        for line in lines {
            let mut fields = line.split_whitespace();

            let row = fields.next().ok_or_else(|| Error::CorruptFormat {
                reason: "missing row index".to_string(),
            })?;
            let col = fields.next().ok_or_else(|| Error::CorruptFormat {
                reason: "missing column index".to_string(),
            })?;

            let row = row.parse::<usize>().map_err(|_| Error::CorruptFormat {
                reason: format!("malformed row index: {row}"),
            })?;
            let col = col.parse::<usize>().map_err(|_| Error::CorruptFormat {
                reason: format!("malformed column index: {col}"),
            })?;

            let row = NI::new(row - 1);
            let col = NI::new(col - 1);

            let value = if pattern {
                EV::parse(&[]).0
            } else {
                let raw = fields.next().ok_or_else(|| Error::CorruptFormat {
                    reason: "missing value field".to_string(),
                })?;
                EV::parse(raw.as_bytes()).0
            };

            triples.push((row, col, value));
            if symmetric && row != col {
                triples.push((col, row, value));
            }
        }

        Ok(Self { triples, symmetric })
    }
}

impl<NI, P, EV> TryFrom<InputPath<P>> for MatrixMarketGraph<NI, EV>
where
    P: AsRef<Path>,
    NI: Idx,
    EV: ParseValue + Copy,
{
    type Error = Error;

    fn try_from(path: InputPath<P>) -> Result<Self, Self::Error> {
        let bytes = std::fs::read(path.0.as_ref())?;
        Self::parse(&bytes)
    }
}

impl<NI, EV> Edges for MatrixMarketGraph<NI, EV>
where
    NI: Idx,
    EV: Copy + Send + Sync,
{
    type NI = NI;
    type EV = EV;

    type EdgeIter<'a> = rayon::iter::Copied<rayon::slice::Iter<'a, (NI, NI, EV)>>
    where
        Self: 'a;

    fn edges(&self) -> Self::EdgeIter<'_> {
        self.triples.as_slice().into_par_iter().copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.triples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> MatrixMarketGraph<usize, f32> {
        MatrixMarketGraph::parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn parses_general_real_matrix() {
        let g = parse(
            "%%MatrixMarket matrix coordinate real general\n\
             3 3 3\n\
             1 1 1.0\n\
             1 2 0.5\n\
             2 3 0.25\n",
        );
        assert!(!g.is_symmetric());
        assert_eq!(g.triples, vec![(0, 0, 1.0), (0, 1, 0.5), (1, 2, 0.25)]);
    }

    #[test]
    fn expands_symmetric_matrix_except_diagonal() {
        let g = parse(
            "%%MatrixMarket matrix coordinate real symmetric\n\
             3 3 2\n\
             1 1 2.0\n\
             1 2 0.5\n",
        );
        assert!(g.is_symmetric());
        assert_eq!(g.triples, vec![(0, 0, 2.0), (0, 1, 0.5), (1, 0, 0.5)]);
    }

    #[test]
    fn parses_pattern_matrix_with_default_value() {
        let g = parse(
            "%%MatrixMarket matrix coordinate pattern general\n\
             2 2 1\n\
             1 2\n",
        );
        assert_eq!(g.triples, vec![(0, 1, 0.0)]);
    }

    #[test]
    fn skips_comment_lines() {
        let g = parse(
            "%%MatrixMarket matrix coordinate real general\n\
             % a comment\n\
             2 2 1\n\
             % another comment\n\
             1 2 3.0\n",
        );
        assert_eq!(g.triples, vec![(0, 1, 3.0)]);
    }

    #[test]
    fn rejects_unsupported_header() {
        let err = MatrixMarketGraph::<usize, f32>::parse(
            b"%%MatrixMarket matrix array real general\n1 1\n1.0\n",
        );
        assert!(err.is_err());
    }
}
