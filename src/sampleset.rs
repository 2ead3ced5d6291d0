use crate::errors::{check_dim, Result};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix1};

/// A training observation: an input vector `x` and its scalar target `y`
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<F: Float> {
    x: Array1<F>,
    y: F,
}

impl<F: Float> Sample<F> {
    /// Input vector
    pub fn x(&self) -> ArrayView1<F> {
        self.x.view()
    }

    /// Target value
    pub fn y(&self) -> F {
        self.y
    }
}

/// An ordered set of training observations sharing the same input dimension.
///
/// Insertion order defines the row/column order of the kernel matrix.
/// Duplicates are allowed.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet<F: Float> {
    input_dim: usize,
    samples: Vec<Sample<F>>,
}

impl<F: Float> SampleSet<F> {
    /// Constructor of an empty set of `input_dim` dimensional samples
    pub fn new(input_dim: usize) -> Self {
        SampleSet {
            input_dim,
            samples: Vec::new(),
        }
    }

    /// Append a sample, fails if `x` has not `input_dim` components
    pub fn add(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, y: F) -> Result<()> {
        check_dim(self.input_dim, x.len())?;
        self.samples.push(Sample { x: x.to_owned(), y });
        Ok(())
    }

    /// Dimension of sample inputs
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the set holds no sample
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at index `i`
    pub fn get(&self, i: usize) -> Option<&Sample<F>> {
        self.samples.get(i)
    }

    /// Iterate over samples in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample<F>> {
        self.samples.iter()
    }

    /// Targets as a (n,) vector
    pub fn targets(&self) -> Array1<F> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// Inputs as a (n, input_dim) matrix
    pub fn inputs(&self) -> Array2<F> {
        let mut x = Array2::zeros((self.len(), self.input_dim));
        for (mut row, s) in x.rows_mut().into_iter().zip(self.samples.iter()) {
            row.assign(&s.x);
        }
        x
    }
}

impl<'a, F: Float> IntoIterator for &'a SampleSet<F> {
    type Item = &'a Sample<F>;
    type IntoIter = std::slice::Iter<'a, Sample<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GpError;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_sampleset_order_and_duplicates() {
        let mut set = SampleSet::<f64>::new(2);
        set.add(&arr1(&[0., 1.]), 1.).unwrap();
        set.add(&arr1(&[2., 3.]), 2.).unwrap();
        set.add(&arr1(&[0., 1.]), 1.).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.targets(), arr1(&[1., 2., 1.]));
        assert_eq!(set.inputs(), arr2(&[[0., 1.], [2., 3.], [0., 1.]]));
        assert_eq!(set.get(1).unwrap().x(), arr1(&[2., 3.]));
        assert!(set.get(3).is_none());
    }

    #[test]
    fn test_sampleset_bad_dimension() {
        let mut set = SampleSet::<f64>::new(2);
        let res = set.add(&arr1(&[0., 1., 2.]), 1.);
        assert!(matches!(
            res,
            Err(GpError::InvalidParameter {
                expected: 2,
                actual: 3
            })
        ));
        assert!(set.is_empty());
    }
}
