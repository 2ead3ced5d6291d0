use crate::algorithm::GaussianProcess;
use crate::covariance_factory::create_covariance;
use crate::errors::{GpError, Result};
use linfa::{Float, ParamGuard};

use ndarray::Array1;

/// Default covariance function definition
pub const GP_DEFAULT_COVARIANCE: &str = "CovSEiso";

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct GpValidParams<F: Float> {
    /// Dimension of training and query inputs
    pub(crate) input_dim: usize,
    /// Textual definition of the covariance function k(x, x')
    pub(crate) kernel: String,
    /// Initial log-hyperparameters of the covariance function, zeros when not specified
    pub(crate) loghyper: Option<Array1<F>>,
}

impl<F: Float> GpValidParams<F> {
    /// Get input dimension
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Get covariance function definition
    pub fn kernel(&self) -> &str {
        &self.kernel
    }

    /// Get initial log-hyperparameters if any
    pub fn loghyper(&self) -> Option<&Array1<F>> {
        self.loghyper.as_ref()
    }

    /// Create an untrained GP from these parameters
    pub fn build(&self) -> Result<GaussianProcess<F>> {
        let mut gp = GaussianProcess::from_definition(self.input_dim, &self.kernel)?;
        if let Some(loghyper) = self.loghyper.as_ref() {
            gp.set_loghyper(loghyper)?;
        }
        Ok(gp)
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](struct.GaussianProcess.html).
pub struct GpParams<F: Float>(GpValidParams<F>);

impl<F: Float> GpParams<F> {
    /// A constructor for GP parameters given the input dimension and
    /// the covariance function definition
    pub fn new(input_dim: usize, kernel: &str) -> GpParams<F> {
        Self(GpValidParams {
            input_dim,
            kernel: kernel.to_string(),
            loghyper: None,
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F>) -> Self {
        Self(params.clone())
    }

    /// Set covariance function definition, e.g. `CovSum(CovSEard, CovNoise)`
    pub fn kernel(mut self, kernel: &str) -> Self {
        self.0.kernel = kernel.to_string();
        self
    }

    /// Set initial log-hyperparameters of the covariance function
    pub fn loghyper(mut self, loghyper: Array1<F>) -> Self {
        self.0.loghyper = Some(loghyper);
        self
    }
}

impl<F: Float> From<GpValidParams<F>> for GpParams<F> {
    fn from(valid: GpValidParams<F>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float> ParamGuard for GpParams<F> {
    type Checked = GpValidParams<F>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.input_dim == 0 {
            return Err(GpError::InvalidValueError(
                "`input_dim` cannot be 0!".to_string(),
            ));
        }
        let covf = create_covariance::<F>(self.0.input_dim, &self.0.kernel)?;
        if let Some(loghyper) = self.0.loghyper.as_ref() {
            if loghyper.len() != covf.param_dim() {
                return Err(GpError::InvalidValueError(format!(
                    "Initial loghyper length ({}) should match {} parameter dimension ({})",
                    loghyper.len(),
                    covf,
                    covf.param_dim()
                )));
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float> Default for GpParams<F> {
    fn default() -> Self {
        GpParams::new(1, GP_DEFAULT_COVARIANCE)
    }
}
