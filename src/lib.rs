//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! with a zero prior mean and a pluggable covariance function parameterized by log-hyperparameters.
//!
//! Training samples are added one at a time to a [GaussianProcess], the Cholesky factorization
//! of the kernel matrix is computed lazily on the next prediction and reused until samples or
//! hyperparameters change. The complexity of a rebuild is in O(N^3) in processing time and O(N^2)
//! in memory where N is the number of training points.
//!
//! Covariance functions implement the [CovarianceFunction] trait, see [covariance_functions] for
//! the available kernels. They are usually built from a textual definition such as
//! `CovSum(CovSEiso, CovNoise)` with [create_covariance].
//!
//! The log marginal likelihood and its gradient with respect to log-hyperparameters are available
//! for an external hyperparameters optimizer. Models can be saved and loaded in a text format.
//!
//! GP models can also be created through [GpParams] and the [linfa::traits::Fit] trait.
//!
//! # Example
//!
//! ```no_run
//! use egobox_gpr::GaussianProcess;
//! use linfa::prelude::{Dataset, Fit};
//! use ndarray::array;
//!
//! let xt = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
//! let yt = array![0.0, 0.84, 0.91, 0.14, -0.76];
//!
//! let mut gp = GaussianProcess::<f64>::params(1, "CovSum(CovSEiso, CovNoise)")
//!     .loghyper(array![0., 0., -2.3])
//!     .fit(&Dataset::new(xt, yt))
//!     .expect("GP fit error");
//!
//! let xtest = array![[0.5], [1.5], [2.5]];
//! let (mean, var) = gp.predict_valvar_values(&xtest).expect("GP prediction");
//! println!("mean = {mean}, variance = {:?}", var);
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod covariance_factory;
pub mod covariance_functions;
mod errors;
mod parameters;
mod persistence;
mod sampleset;
mod utils;

pub use algorithm::*;
pub use covariance_factory::*;
pub use covariance_functions::CovarianceFunction;
pub use errors::*;
pub use parameters::*;
pub use sampleset::*;
