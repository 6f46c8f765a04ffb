use crate::topology::Topology;
use nalgebra::DMatrix;
use thiserror::Error;
use tracing::debug;

/// Path × link incidence matrix.
///
/// Entry `(p, l)` counts how many times the path with index `p`
/// crosses the link with index `l`. An out-and-back path crosses the
/// same undirected link twice so entries may be greater than `1`.
///
/// The matrix is always square: tomography needs as many independent
/// path measurements as there are unknown links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    matrix: DMatrix<u32>,
}

/// Error returned when the number of monitored paths does not match
/// the number of links they cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "incidence matrix must be square: {paths} monitored paths for {links} links, the path design must be fixed"
)]
pub struct DimensionMismatch {
    pub paths: usize,
    pub links: usize,
}

impl IncidenceMatrix {
    pub fn build(topology: &Topology) -> Result<Self, DimensionMismatch> {
        let paths = topology.path_count();
        let links = topology.link_count();
        if paths != links {
            return Err(DimensionMismatch { paths, links });
        }

        let mut matrix = DMatrix::<u32>::zeros(paths, links);
        for (row, (_, path)) in topology.paths().enumerate() {
            for link in path.links() {
                // every link of every path was registered by the topology
                let Some(column) = topology.link_index(link) else {
                    continue;
                };
                matrix[(row, column)] += 1;
            }
        }

        debug!(dimension = paths, "incidence matrix built");

        Ok(Self { matrix })
    }

    /// number of rows (and columns) of the matrix.
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// number of times path `path` traverses link `link`.
    pub fn count(&self, path: usize, link: usize) -> u32 {
        self.matrix[(path, link)]
    }

    pub fn as_matrix(&self) -> &DMatrix<u32> {
        &self.matrix
    }

    pub fn to_f64(&self) -> DMatrix<f64> {
        self.matrix.map(f64::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain() {
        let topology = Topology::parse("0 -> 1 2 3\n1 -> 2 3").unwrap();
        let matrix = IncidenceMatrix::build(&topology).unwrap();

        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.count(0, 0), 1);
        assert_eq!(matrix.count(0, 1), 1);
        assert_eq!(matrix.count(1, 0), 0);
        assert_eq!(matrix.count(1, 1), 1);
    }

    #[test]
    fn out_and_back_counts_twice() {
        let topology = Topology::parse("7 -> 1 2 1\n8 -> 1 2 3 2 1").unwrap();
        let matrix = IncidenceMatrix::build(&topology).unwrap();

        assert_eq!(matrix.count(0, 0), 2);
        assert_eq!(matrix.count(0, 1), 0);
        assert_eq!(matrix.count(1, 0), 2);
        assert_eq!(matrix.count(1, 1), 2);
    }

    #[test]
    fn more_paths_than_links() {
        let topology = Topology::parse("1 -> 1 2 3\n2 -> 2 3\n3 -> 1 2").unwrap();

        assert_eq!(
            IncidenceMatrix::build(&topology).unwrap_err(),
            DimensionMismatch { paths: 3, links: 2 }
        );
    }

    #[test]
    fn more_links_than_paths() {
        let topology = Topology::parse("1 -> 1 2 3 4").unwrap();

        assert_eq!(
            IncidenceMatrix::build(&topology).unwrap_err(),
            DimensionMismatch { paths: 1, links: 3 }
        );
    }
}
