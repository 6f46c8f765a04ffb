use crate::incidence::IncidenceMatrix;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use tracing::debug;

/// Largest deviation from the identity tolerated for `A·A⁻¹`.
const IDENTITY_TOLERANCE: f64 = 1e-6;

/// Maps per-path observations onto per-link values.
///
/// Holds the inverse of the [`IncidenceMatrix`], computed once when the
/// solver is created and only ever read afterward. Every time window
/// of the estimators goes through [`Solver::apply`].
#[derive(Debug, Clone)]
pub struct Solver {
    inverse: DMatrix<f64>,
}

/// The incidence matrix has no (usable) inverse: some links cannot be
/// told apart from the monitored paths.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "the {dimension}x{dimension} incidence matrix is singular (identity residual {residual}), the monitored paths do not identify every link"
)]
pub struct SingularMatrixError {
    pub dimension: usize,
    pub residual: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expecting one value per monitored path ({expected}), got {got}")]
pub struct VectorLengthMismatch {
    pub expected: usize,
    pub got: usize,
}

impl Solver {
    pub fn new(incidence: &IncidenceMatrix) -> Result<Self, SingularMatrixError> {
        let dimension = incidence.dimension();
        let matrix = incidence.to_f64();

        let Some(inverse) = matrix.clone().try_inverse() else {
            return Err(SingularMatrixError {
                dimension,
                residual: f64::INFINITY,
            });
        };

        if !inverse.iter().all(|value| value.is_finite()) {
            return Err(SingularMatrixError {
                dimension,
                residual: f64::INFINITY,
            });
        }

        let residual = (&matrix * &inverse - DMatrix::<f64>::identity(dimension, dimension)).amax();
        if residual > IDENTITY_TOLERANCE {
            return Err(SingularMatrixError {
                dimension,
                residual,
            });
        }

        debug!(dimension, residual, "incidence matrix inverted");

        Ok(Self { inverse })
    }

    pub fn dimension(&self) -> usize {
        self.inverse.nrows()
    }

    pub fn inverse(&self) -> &DMatrix<f64> {
        &self.inverse
    }

    /// compute `A⁻¹ · path_values`, one value per link.
    pub fn apply(&self, path_values: &[f64]) -> Result<Vec<f64>, VectorLengthMismatch> {
        if path_values.len() != self.dimension() {
            return Err(VectorLengthMismatch {
                expected: self.dimension(),
                got: path_values.len(),
            });
        }

        let paths = DVector::from_column_slice(path_values);
        let links = &self.inverse * paths;

        Ok(links.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    fn solver(paths: &str) -> Result<(IncidenceMatrix, Solver), SingularMatrixError> {
        let topology = Topology::parse(paths).unwrap();
        let incidence = IncidenceMatrix::build(&topology).unwrap();
        let solver = Solver::new(&incidence)?;
        Ok((incidence, solver))
    }

    #[test]
    fn inverse_is_identity() {
        for paths in [
            "0 -> 1 2 3\n1 -> 2 3",
            "1 -> 1 2 1\n2 -> 1 2 3 2 1\n3 -> 1 2 3 4 3 2 1",
            "1 -> 1 2\n2 -> 1 2 3\n3 -> 3 4\n4 -> 2 3 4 5",
        ] {
            let (incidence, solver) = solver(paths).unwrap();
            let n = incidence.dimension();
            let product = incidence.to_f64() * solver.inverse();
            let residual = (product - DMatrix::<f64>::identity(n, n)).amax();

            assert!(residual < 1e-9, "residual {residual} for {paths:?}");
        }
    }

    #[test]
    fn singular() {
        // both paths cover both links exactly once: links can't be separated
        let error = solver("1 -> 1 2 3\n2 -> 3 2 1").unwrap_err();

        assert_eq!(error.dimension, 2);
    }

    #[test]
    fn apply() {
        let (_, solver) = solver("0 -> 1 2 3\n1 -> 2 3").unwrap();

        // link 1-2 = 4ms, link 2-3 = 6ms
        let links = solver.apply(&[10.0, 6.0]).unwrap();

        assert!((links[0] - 4.0).abs() < 1e-12);
        assert!((links[1] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn apply_wrong_length() {
        let (_, solver) = solver("0 -> 1 2 3\n1 -> 2 3").unwrap();

        assert_eq!(
            solver.apply(&[1.0]).unwrap_err(),
            VectorLengthMismatch {
                expected: 2,
                got: 1
            }
        );
    }
}
