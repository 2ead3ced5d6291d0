use crate::covariance_functions::*;
use crate::errors::{GpError, Result};
use linfa::Float;

/// Names of the covariance functions known by [`create_covariance`]
pub const COVARIANCE_NAMES: [&str; 10] = [
    "CovLinearard",
    "CovLinearone",
    "CovMatern3iso",
    "CovMatern5iso",
    "CovNoise",
    "CovRQiso",
    "CovSEard",
    "CovSEiso",
    "CovSum",
    "CovProd",
];

/// Maximum nesting depth of compound covariance definitions
pub const MAX_COVARIANCE_NESTING: usize = 32;

/// List available covariance function names
pub fn available_covariances() -> &'static [&'static str] {
    &COVARIANCE_NAMES
}

/// Create a covariance function of `input_dim` dimensional inputs
/// from its textual definition.
///
/// Atomic covariances are given by their name (ex: `CovSEiso`), compound ones
/// take two covariance definitions as arguments, e.g. `CovSum(CovSEiso, CovNoise)`
/// or `CovProd(CovLinearone, CovSum(CovSEard, CovNoise))`. Whitespaces are ignored.
///
/// Compound definitions nested deeper than [`MAX_COVARIANCE_NESTING`] are rejected.
///
/// The created covariance function has zero log-hyperparameters.
pub fn create_covariance<F: Float>(
    input_dim: usize,
    definition: &str,
) -> Result<Box<dyn CovarianceFunction<F>>> {
    if input_dim == 0 {
        return Err(GpError::InvalidValueError(
            "Input dimension should be greater than 0".to_string(),
        ));
    }
    let definition: String = definition.chars().filter(|c| !c.is_whitespace()).collect();
    let mut depth = 0usize;
    for c in definition.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth > MAX_COVARIANCE_NESTING {
            return Err(GpError::InvalidValueError(format!(
                "Covariance definition nested deeper than {MAX_COVARIANCE_NESTING} levels"
            )));
        }
    }
    parse_covariance(input_dim, &definition)
}

fn parse_covariance<F: Float>(
    input_dim: usize,
    definition: &str,
) -> Result<Box<dyn CovarianceFunction<F>>> {
    let (name, args) = match definition.find('(') {
        Some(pos) => {
            let args = definition[pos + 1..]
                .strip_suffix(')')
                .ok_or_else(|| malformed(definition))?;
            (&definition[..pos], Some(args))
        }
        None if definition.contains(')') => return Err(malformed(definition)),
        None => (definition, None),
    };
    if name.is_empty() {
        return Err(malformed(definition));
    }

    match (name, args) {
        ("CovSum", Some(args)) => {
            let (first, second) = split_arguments(name, args)?;
            Ok(Box::new(SumCov::new(
                parse_covariance(input_dim, first)?,
                parse_covariance(input_dim, second)?,
            )?))
        }
        ("CovProd", Some(args)) => {
            let (first, second) = split_arguments(name, args)?;
            Ok(Box::new(ProductCov::new(
                parse_covariance(input_dim, first)?,
                parse_covariance(input_dim, second)?,
            )?))
        }
        ("CovSum" | "CovProd", None) => Err(GpError::InvalidValueError(format!(
            "Compound covariance {name} expects two covariance arguments"
        ))),
        (name, None) => create_atomic(input_dim, name),
        (name, Some(_)) if COVARIANCE_NAMES.contains(&name) => Err(GpError::InvalidValueError(
            format!("Atomic covariance {name} takes no argument"),
        )),
        (name, Some(_)) => Err(GpError::UnknownKernel(name.to_string())),
    }
}

fn create_atomic<F: Float>(input_dim: usize, name: &str) -> Result<Box<dyn CovarianceFunction<F>>> {
    let covf: Box<dyn CovarianceFunction<F>> = match name {
        "CovLinearard" => Box::new(LinearArdCov::<F>::new(input_dim)),
        "CovLinearone" => Box::new(LinearOneCov::<F>::new(input_dim)),
        "CovMatern3iso" => Box::new(Matern32IsoCov::<F>::new(input_dim)),
        "CovMatern5iso" => Box::new(Matern52IsoCov::<F>::new(input_dim)),
        "CovNoise" => Box::new(NoiseCov::<F>::new(input_dim)),
        "CovRQiso" => Box::new(RationalQuadraticIsoCov::<F>::new(input_dim)),
        "CovSEard" => Box::new(SquaredExponentialArdCov::<F>::new(input_dim)),
        "CovSEiso" => Box::new(SquaredExponentialIsoCov::<F>::new(input_dim)),
        _ => return Err(GpError::UnknownKernel(name.to_string())),
    };
    Ok(covf)
}

/// Split `args` at its top level comma, exactly two arguments are expected
fn split_arguments<'a>(name: &str, args: &'a str) -> Result<(&'a str, &'a str)> {
    let mut depth = 0usize;
    let mut comma = None;
    for (i, c) in args.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| malformed(args))?;
            }
            ',' if depth == 0 => {
                if comma.is_some() {
                    return Err(GpError::InvalidValueError(format!(
                        "Compound covariance {name} expects two covariance arguments, got more"
                    )));
                }
                comma = Some(i);
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(malformed(args));
    }
    match comma {
        Some(i) => Ok((&args[..i], &args[i + 1..])),
        None => Err(GpError::InvalidValueError(format!(
            "Compound covariance {name} expects two covariance arguments, got one"
        ))),
    }
}

fn malformed(definition: &str) -> GpError {
    GpError::InvalidValueError(format!("Malformed covariance definition `{definition}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_create_all_atomic() {
        for name in available_covariances()
            .iter()
            .filter(|n| **n != "CovSum" && **n != "CovProd")
        {
            let covf = create_covariance::<f64>(3, name).expect("known covariance");
            assert_eq!(covf.to_string(), *name);
            assert_eq!(covf.input_dim(), 3);
            assert_eq!(covf.loghyper(), ndarray::Array1::zeros(covf.param_dim()));
        }
    }

    #[test]
    fn test_param_dims() {
        let dims = [
            ("CovSEiso", 2),
            ("CovSEard", 5),
            ("CovMatern3iso", 2),
            ("CovMatern5iso", 2),
            ("CovRQiso", 3),
            ("CovLinearard", 4),
            ("CovLinearone", 1),
            ("CovNoise", 1),
            ("CovSum(CovSEard, CovNoise)", 6),
            ("CovProd(CovLinearone, CovSum(CovRQiso, CovNoise))", 5),
        ];
        for (def, dim) in dims {
            let covf = create_covariance::<f64>(4, def).unwrap();
            assert_eq!(covf.param_dim(), dim, "param dim of {def}");
        }
    }

    #[test]
    fn test_compound_round_trip() {
        let def = "CovSum ( CovProd(CovSEiso,  CovLinearone), CovNoise)";
        let covf = create_covariance::<f64>(2, def).unwrap();
        let name = covf.to_string();
        assert_eq!(name, "CovSum(CovProd(CovSEiso, CovLinearone), CovNoise)");
        let again = create_covariance::<f64>(2, &name).unwrap();
        assert_eq!(again.to_string(), name);
        assert_eq!(again.param_dim(), covf.param_dim());
    }

    #[test]
    fn test_compound_evaluation() {
        let mut covf = create_covariance::<f64>(1, "CovSum(CovSEiso, CovNoise)").unwrap();
        covf.set_loghyper(&arr1(&[0., 0., f64::ln(0.1)]).view())
            .unwrap();
        let x = arr1(&[0.5]);
        let y = arr1(&[0.5]);
        approx::assert_abs_diff_eq!(covf.get(&x.view(), &x.view()), 1.01, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(covf.get(&x.view(), &y.view()), 1., epsilon = 1e-12);
    }

    #[test]
    fn test_compound_derivatives() {
        let def = "CovProd(CovSum(CovSEard, CovNoise), CovMatern3iso)";
        let covf = create_covariance::<f64>(2, def).unwrap();
        let p = arr1(&[0.1, -0.3, 0.2, -1.0, 0.4, -0.2]);
        assert_eq!(covf.param_dim(), p.len());
        let x1 = arr1(&[0.2, 0.7]);
        let x2 = arr1(&[-0.4, 1.1]);
        let eval = |p: &Vec<f64>, same: bool| -> f64 {
            let mut covf = create_covariance::<f64>(2, def).unwrap();
            covf.set_loghyper(&arr1(p).view()).unwrap();
            if same {
                covf.get(&x1.view(), &x1.view())
            } else {
                covf.get(&x1.view(), &x2.view())
            }
        };
        let mut covf = covf;
        covf.set_loghyper(&p.view()).unwrap();
        for same in [true, false] {
            let grad = if same {
                covf.grad(&x1.view(), &x1.view())
            } else {
                covf.grad(&x1.view(), &x2.view())
            };
            let e = 1e-6;
            for k in 0..p.len() {
                let mut pp = p.to_vec();
                pp[k] += e;
                let kp = eval(&pp, same);
                pp[k] -= 2. * e;
                let km = eval(&pp, same);
                approx::assert_abs_diff_eq!(grad[k], (kp - km) / (2. * e), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_unknown_kernel() {
        assert!(matches!(
            create_covariance::<f64>(2, "CovFoo"),
            Err(GpError::UnknownKernel(name)) if name == "CovFoo"
        ));
        assert!(matches!(
            create_covariance::<f64>(2, "CovSum(CovSEiso, CovBar)"),
            Err(GpError::UnknownKernel(name)) if name == "CovBar"
        ));
        assert!(matches!(
            create_covariance::<f64>(2, "CovBaz(CovSEiso, CovNoise)"),
            Err(GpError::UnknownKernel(name)) if name == "CovBaz"
        ));
    }

    #[test]
    fn test_malformed_definitions() {
        for def in [
            "CovSum",
            "CovSum(CovSEiso)",
            "CovSum(CovSEiso, CovNoise, CovSEard)",
            "CovSum(CovSEiso, CovNoise",
            "CovSum(CovSEiso, CovNoise))",
            "CovSEiso(CovNoise)",
            "CovSEiso)",
            "CovSum(,CovNoise)",
            "CovSum(CovSEiso,)",
            "(CovSEiso)",
            "",
        ] {
            assert!(
                matches!(
                    create_covariance::<f64>(2, def),
                    Err(GpError::InvalidValueError(_))
                ),
                "{def} should be rejected"
            );
        }
    }

    #[test]
    fn test_nesting_depth() {
        let nested = |depth: usize| {
            let mut def = "CovSEiso".to_string();
            for _ in 0..depth {
                def = format!("CovSum({def}, CovNoise)");
            }
            def
        };
        let covf = create_covariance::<f64>(1, &nested(MAX_COVARIANCE_NESTING)).unwrap();
        assert_eq!(covf.param_dim(), 2 + MAX_COVARIANCE_NESTING);
        assert!(matches!(
            create_covariance::<f64>(1, &nested(MAX_COVARIANCE_NESTING + 1)),
            Err(GpError::InvalidValueError(_))
        ));
        let deep = "CovSum(".repeat(100_000);
        assert!(matches!(
            create_covariance::<f64>(1, &deep),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_zero_input_dim() {
        assert!(matches!(
            create_covariance::<f64>(0, "CovSEiso"),
            Err(GpError::InvalidValueError(_))
        ));
    }
}
