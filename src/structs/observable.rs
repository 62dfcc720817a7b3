use crate::error::{LikelihoodError, LikelihoodResult};
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// An ensemble of realizations of one observable
///
/// The realizations are stored row-wise in a `(ensemble_size, size)` matrix, so each row is
/// one realization of length `size` (the pixel count of the observable). The `domain` tag
/// describes how the pixels of one realization are laid out; it is never interpreted by the
/// likelihood code, but its product always equals `size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    data: Array2<f64>,
    domain: Vec<usize>,
}

impl Observable {
    /// Create an observable from a `(ensemble_size, size)` matrix
    ///
    /// Fails with [LikelihoodError::InvalidParameter] if there is no realization or the
    /// realizations are empty.
    pub fn new(data: Array2<f64>) -> LikelihoodResult<Self> {
        let (ensemble_size, size) = data.dim();
        if ensemble_size == 0 {
            return Err(LikelihoodError::InvalidParameter(
                "an observable needs at least one realization".to_string(),
            ));
        }
        if size == 0 {
            return Err(LikelihoodError::InvalidParameter(
                "realizations must contain at least one pixel".to_string(),
            ));
        }
        Ok(Observable {
            data,
            domain: vec![size],
        })
    }

    /// Create an observable holding a single realization
    pub fn from_realization(realization: Array1<f64>) -> LikelihoodResult<Self> {
        let size = realization.len();
        let data = realization
            .into_shape((1, size))
            .map_err(|e| LikelihoodError::InvalidParameter(e.to_string()))?;
        Observable::new(data)
    }

    /// Create an observable from a list of equally long realizations
    pub fn from_rows(rows: &[Vec<f64>]) -> LikelihoodResult<Self> {
        let size = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(bad) = rows.iter().find(|r| r.len() != size) {
            return Err(LikelihoodError::InvalidParameter(format!(
                "realizations have different lengths ({} and {})",
                size,
                bad.len()
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((rows.len(), size), flat)
            .map_err(|e| LikelihoodError::InvalidParameter(e.to_string()))?;
        Observable::new(data)
    }

    /// Attach a domain tag, e.g. `[12, 4]` for a 12x4 grid flattened into 48 pixels
    pub fn with_domain(mut self, domain: Vec<usize>) -> LikelihoodResult<Self> {
        let pixels: usize = domain.iter().product();
        if pixels != self.size() {
            return Err(LikelihoodError::InvalidParameter(format!(
                "domain {:?} holds {} pixels, realizations have {}",
                domain,
                pixels,
                self.size()
            )));
        }
        self.domain = domain;
        Ok(self)
    }

    /// Number of realizations
    pub fn ensemble_size(&self) -> usize {
        self.data.nrows()
    }

    /// Length of each realization
    pub fn size(&self) -> usize {
        self.data.ncols()
    }

    pub fn domain(&self) -> &[usize] {
        &self.domain
    }

    /// Get the realization matrix, one row per realization
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn realization(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.ensemble_size()).then(|| self.data.row(index))
    }

    /// Elementwise arithmetic mean over the realizations
    ///
    /// Accumulated relative to the first realization, so an ensemble of identical
    /// realizations returns that realization exactly.
    pub fn ensemble_mean(&self) -> Array1<f64> {
        let (origin, deviations) = self.deviations_from_first();
        origin + deviations.sum_axis(Axis(0)) / self.ensemble_size() as f64
    }

    /// The first realization and every realization minus it
    pub(crate) fn deviations_from_first(&self) -> (Array1<f64>, Array2<f64>) {
        let origin = self.data.row(0).to_owned();
        let deviations = &self.data - &origin.view().insert_axis(Axis(0));
        (origin, deviations)
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Append the realizations of `other` after the existing ones
    ///
    /// The caller is responsible for checking that both observables have the same size.
    pub(crate) fn extend(&mut self, other: &Observable) -> LikelihoodResult<()> {
        self.data = concatenate(Axis(0), &[self.data.view(), other.data.view()])
            .map_err(|e| LikelihoodError::InvalidParameter(e.to_string()))?;
        Ok(())
    }
}

impl TryFrom<Array2<f64>> for Observable {
    type Error = LikelihoodError;

    fn try_from(data: Array2<f64>) -> Result<Self, Self::Error> {
        Observable::new(data)
    }
}

impl TryFrom<Array1<f64>> for Observable {
    type Error = LikelihoodError;

    fn try_from(realization: Array1<f64>) -> Result<Self, Self::Error> {
        Observable::from_realization(realization)
    }
}
