//! Text persistence of a GP model: input dimension, covariance function,
//! log-hyperparameters and training samples.
//!
//! ```text
//! # input dimensionality
//! 1
//!
//! # covariance function
//! CovSum(CovSEiso, CovNoise)
//!
//! # log-hyperparameter
//! 0 0 -2.3025850929940455
//!
//! # data (target value in first column)
//! 0 0
//! 0.8 1
//! ```
//!
//! Empty lines and lines starting with `#` are ignored when reading.
//!
//! Floats are written with their shortest representation reading back to the
//! same value, instead of a fixed number of decimals, so a reloaded model
//! predicts exactly as the saved one. Files written with fixed precision
//! decimals are read as well.
use crate::algorithm::GaussianProcess;
use crate::covariance_factory::create_covariance;
use crate::errors::{GpError, Result};

use linfa::Float;
use ndarray::{s, Array1};

use log::debug;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Reading state, sections are expected in this order
enum Section<F: Float> {
    InputDim,
    Covariance(usize),
    LogHyper(GaussianProcess<F>),
    Data(GaussianProcess<F>),
}

impl<F: Float> GaussianProcess<F> {
    /// Save GP model in the given file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path.as_ref())?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        debug!(
            "GP model with {} samples saved in {}",
            self.sampleset_size(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Load GP model from the given file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(fs::File::open(path.as_ref())?);
        let gp = Self::read_from(reader)?;
        debug!(
            "GP model with {} samples loaded from {}",
            gp.sampleset_size(),
            path.as_ref().display()
        );
        Ok(gp)
    }

    /// Write GP model in text format.
    ///
    /// Floats are written in their shortest representation which
    /// reads back to the same value.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "# input dimensionality")?;
        writeln!(writer, "{}", self.input_dim())?;
        writeln!(writer)?;
        writeln!(writer, "# covariance function")?;
        writeln!(writer, "{}", self.covariance())?;
        writeln!(writer)?;
        writeln!(writer, "# log-hyperparameter")?;
        writeln!(writer, "{}", join(self.loghyper().iter()))?;
        writeln!(writer)?;
        writeln!(writer, "# data (target value in first column)")?;
        for sample in self.sampleset() {
            let y = sample.y();
            writeln!(
                writer,
                "{}",
                join(std::iter::once(&y).chain(sample.x().iter()))
            )?;
        }
        Ok(())
    }

    /// Read GP model in text format, see [`GaussianProcess::write_to`]
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut section = Section::InputDim;
        let mut lineno = 0;
        for line in reader.lines() {
            lineno += 1;
            let line = line?;
            let content = line.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            section = match section {
                Section::InputDim => match content.parse::<usize>() {
                    Ok(dim) if dim > 0 => Section::Covariance(dim),
                    _ => {
                        return Err(parse_error(
                            lineno,
                            format!("invalid input dimensionality `{content}`"),
                        ))
                    }
                },
                Section::Covariance(dim) => {
                    let covf = create_covariance(dim, content)?;
                    Section::LogHyper(GaussianProcess::new(dim, covf)?)
                }
                Section::LogHyper(mut gp) => {
                    let loghyper = parse_values::<F>(lineno, content)?;
                    if loghyper.len() != gp.param_dim() {
                        return Err(parse_error(
                            lineno,
                            format!(
                                "expected {} log-hyperparameters, got {}",
                                gp.param_dim(),
                                loghyper.len()
                            ),
                        ));
                    }
                    gp.set_loghyper(&loghyper)?;
                    Section::Data(gp)
                }
                Section::Data(mut gp) => {
                    let values = parse_values::<F>(lineno, content)?;
                    if values.len() != gp.input_dim() + 1 {
                        return Err(parse_error(
                            lineno,
                            format!(
                                "expected target and {} input values, got {} values",
                                gp.input_dim(),
                                values.len()
                            ),
                        ));
                    }
                    gp.add_pattern(&values.slice(s![1..]), values[0])?;
                    Section::Data(gp)
                }
            };
        }
        match section {
            Section::Data(gp) => Ok(gp),
            Section::InputDim => Err(missing(lineno, "input dimensionality")),
            Section::Covariance(_) => Err(missing(lineno, "covariance function")),
            Section::LogHyper(_) => Err(missing(lineno, "log-hyperparameter")),
        }
    }
}

fn join<'a, F: Float + 'a>(values: impl Iterator<Item = &'a F>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_values<F: Float>(lineno: usize, content: &str) -> Result<Array1<F>> {
    content
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map(|v| F::cast(v))
                .map_err(|_| parse_error(lineno, format!("invalid number `{token}`")))
        })
        .collect()
}

fn parse_error(line: usize, message: String) -> GpError {
    GpError::ParseError { line, message }
}

fn missing(line: usize, section: &str) -> GpError {
    parse_error(line, format!("truncated file, missing {section} section"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn trained_gp() -> GaussianProcess<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let xt = Array2::random_using((10, 2), Uniform::new(0., 1.), &mut rng);
        let mut gp =
            GaussianProcess::<f64>::from_definition(2, "CovSum(CovSEard, CovNoise)").unwrap();
        gp.set_loghyper(&array![0.1, -0.2, 0.7, f64::ln(0.05)])
            .unwrap();
        for x in xt.rows() {
            gp.add_pattern(&x, x[0].sin() * x[1]).unwrap();
        }
        gp
    }

    fn read(content: &str) -> Result<GaussianProcess<f64>> {
        GaussianProcess::read_from(content.as_bytes())
    }

    #[test]
    fn test_write_read() {
        let mut gp = trained_gp();
        let mut buffer = Vec::new();
        gp.write_to(&mut buffer).unwrap();
        let mut loaded = GaussianProcess::<f64>::read_from(buffer.as_slice()).unwrap();

        assert_eq!(loaded.input_dim(), 2);
        assert_eq!(loaded.loghyper(), gp.loghyper());
        assert_eq!(loaded.sampleset(), gp.sampleset());
        assert_eq!(loaded.to_string(), gp.to_string());

        let x = array![[0.3, 0.4], [0.9, 0.2], [1.5, -1.]];
        assert_eq!(
            loaded.predict_valvar_values(&x).unwrap(),
            gp.predict_valvar_values(&x).unwrap()
        );
    }

    #[test]
    fn test_save_load() {
        let mut gp = trained_gp();
        let path = std::env::temp_dir().join("egobox_gpr_test_save_load.gp");
        gp.save(&path).expect("GP saving");
        let mut loaded = GaussianProcess::<f64>::load(&path).expect("GP loading");
        let _ = fs::remove_file(&path);
        let x = array![0.25, 0.75];
        assert_eq!(loaded.predict_valvar(&x).unwrap(), gp.predict_valvar(&x).unwrap());
    }

    #[test]
    fn test_read_with_comments_and_no_data() {
        let gp = read("# dim\n\n   3\n# covf\nCovSEiso\n#\n0.5 -1\n").unwrap();
        assert_eq!(gp.input_dim(), 3);
        assert_eq!(gp.loghyper(), array![0.5, -1.]);
        assert_eq!(gp.sampleset_size(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("egobox_gpr_missing_file.gp");
        assert!(matches!(
            GaussianProcess::<f64>::load(path),
            Err(GpError::IoError(_))
        ));
    }

    #[test]
    fn test_read_malformed() {
        let cases = [
            ("x\nCovSEiso\n0 0\n", 1),
            ("0\nCovSEiso\n0 0\n", 1),
            ("1.5\nCovSEiso\n0 0\n", 1),
            ("1\nCovSEiso\n0 zero\n", 3),
            ("1\nCovSEiso\n0 0 0\n", 3),
            ("1\nCovSEiso\n0 0\n1 2\n0.5\n", 5),
            ("1\nCovSEiso\n0 0\n1 2 3\n", 4),
            ("1\nCovSEiso\n0 0\n1 a\n", 4),
            ("1\nCovSEiso\n", 2),
            ("1\n", 1),
            ("", 0),
        ];
        for (content, expected) in cases {
            match read(content) {
                Err(GpError::ParseError { line, .. }) => {
                    assert_eq!(line, expected, "error line for {content:?}")
                }
                res => panic!("{content:?} should fail with a parse error, got {res:?}"),
            }
        }
    }

    #[test]
    fn test_read_fixed_precision_values() {
        let mut gp = read(
            "1\nCovSum(CovSEiso, CovNoise)\n0.0000000000 0.0000000000 -2.3025850930\n\
             0.0000000000 0.0000000000\n0.8000000000 1.0000000000\n",
        )
        .unwrap();
        assert_eq!(gp.sampleset_size(), 2);
        assert_eq!(gp.sampleset().targets(), array![0., 0.8]);
        assert!(gp.predict(&array![0.5]).unwrap().is_finite());
    }

    #[test]
    fn test_written_values_are_shortest() {
        let mut gp = GaussianProcess::<f64>::from_definition(1, "CovSEiso").unwrap();
        gp.set_loghyper(&array![0.1, -0.5]).unwrap();
        gp.add_pattern(&array![0.3], 1.0).unwrap();
        let mut buffer = Vec::new();
        gp.write_to(&mut buffer).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        assert!(content.contains("\n0.1 -0.5\n"));
        assert!(content.contains("\n1 0.3\n"));
    }

    #[test]
    fn test_read_unknown_kernel() {
        assert!(matches!(
            read("1\nCovFoo\n0 0\n"),
            Err(GpError::UnknownKernel(_))
        ));
    }
}
