use linfa::Float;
use ndarray::ArrayView1;

/// Squared euclidean distance between `x1` and `x2`
/// *Panics* in debug mode if x1 and x2 have not the same number of components,
/// in release mode extra components of the longer vector are ignored
pub fn squared_distance<F: Float>(x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
    debug_assert!(x1.len() == x2.len());
    x1.iter().zip(x2.iter()).fold(F::zero(), |acc, (a, b)| {
        let d = *a - *b;
        acc + d * d
    })
}

/// Whether `x1` and `x2` are views on the very same stored vector,
/// as opposed to two vectors which merely hold equal values.
pub fn same_observation<F: Float>(x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> bool {
    x1.len() == x2.len() && x1.strides() == x2.strides() && std::ptr::eq(x1.as_ptr(), x2.as_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_squared_distance() {
        let x1 = array![1., 2., 3.];
        let x2 = array![0., 4., 3.5];
        assert_abs_diff_eq!(squared_distance(&x1.view(), &x2.view()), 5.25, epsilon = 1e-12);
        assert_abs_diff_eq!(squared_distance(&x1.view(), &x1.view()), 0.);
    }

    #[test]
    fn test_same_observation() {
        let x = array![1., 2.];
        let y = x.clone();
        assert!(same_observation(&x.view(), &x.view()));
        assert!(!same_observation(&x.view(), &y.view()));
    }
}
