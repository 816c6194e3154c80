//! Command line configuration for `hdri_merge`.

use std::path::PathBuf;

use anyhow::{bail, ensure, Context, Result};
use clap::{App, Arg, ArgMatches};

use hdr::{CurveShape, MergeParams};

pub const DEFAULT_CURVE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,

    /// Exposure times, index-aligned with `inputs`.  When absent they're
    /// read from each file's Exif data.
    pub times: Option<Vec<f32>>,

    /// When absent, the exposure time of the middle image of the sorted
    /// stack is used.
    pub target_time: Option<f32>,

    pub clamp_correction: f32,
    pub robust_calibration: bool,
    pub weight: CurveShape,
    pub response: CurveShape,
    pub curve_size: usize,
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("HDRI Merge")
        .version("1.0")
        .about("Merges bracketed LDR exposures of a static scene into a linear radiance image")
        .arg(
            Arg::with_name("INPUT")
                .help("input image files (TIFF, PNG, or JPEG)")
                .required(true)
                .multiple(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("FILE")
                .help("Output radiance image, written as a 32-bit float TIFF")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("times")
                .short("t")
                .long("times")
                .value_name("SECONDS")
                .help("Comma separated exposure times, one per input in input order [default: from Exif]")
                .takes_value(true)
                .use_delimiter(true),
        )
        .arg(
            Arg::with_name("target-time")
                .long("target-time")
                .value_name("SECONDS")
                .help("Exposure time the output is normalized to [default: middle exposure]")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("clamp-correction")
                .long("clamp-correction")
                .value_name("FACTOR")
                .help("How much to trust near-clipped samples of the shortest exposure")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(
            Arg::with_name("robust-calibration")
                .long("robust-calibration")
                .help("The response curve comes from a robust calibration"),
        )
        .arg(
            Arg::with_name("weight")
                .long("weight")
                .value_name("SHAPE")
                .help("Weight curve: constant, triangle, gaussian, or plateau")
                .takes_value(true)
                .default_value("gaussian"),
        )
        .arg(
            Arg::with_name("response")
                .long("response")
                .value_name("SHAPE")
                .help("Response curve: linear, srgb, or gamma:<exponent>")
                .takes_value(true)
                .default_value("srgb"),
        )
        .arg(
            Arg::with_name("curve-size")
                .long("curve-size")
                .value_name("ENTRIES")
                .help("Number of lookup table entries per curve channel")
                .takes_value(true)
                .default_value("4096"),
        )
}

impl Config {
    pub fn from_matches(matches: &ArgMatches) -> Result<Config> {
        let inputs: Vec<PathBuf> = match matches.values_of_os("INPUT") {
            Some(values) => values.map(PathBuf::from).collect(),
            None => bail!("no input images given"),
        };
        let output = match matches.value_of_os("output") {
            Some(path) => PathBuf::from(path),
            None => bail!("no output file given"),
        };

        let times = match matches.values_of("times") {
            Some(values) => {
                let times = values
                    .map(|v| parse_positive(v, "exposure time"))
                    .collect::<Result<Vec<f32>>>()?;
                ensure!(
                    times.len() == inputs.len(),
                    "got {} exposure times for {} input images",
                    times.len(),
                    inputs.len()
                );
                Some(times)
            }
            None => None,
        };

        let target_time = match matches.value_of("target-time") {
            Some(v) => Some(parse_positive(v, "target time")?),
            None => None,
        };

        let clamp_correction = {
            let v = matches.value_of("clamp-correction").unwrap_or("0");
            let c: f32 = v
                .parse()
                .with_context(|| format!("invalid clamp correction \"{}\"", v))?;
            ensure!(
                c.is_finite() && c >= 0.0,
                "clamp correction must be non-negative, got {}",
                c
            );
            c
        };

        let weight: CurveShape = matches.value_of("weight").unwrap_or("gaussian").parse()?;
        let response: CurveShape = matches.value_of("response").unwrap_or("srgb").parse()?;

        let curve_size = match matches.value_of("curve-size") {
            Some(v) => {
                let n: usize = v
                    .parse()
                    .with_context(|| format!("invalid curve size \"{}\"", v))?;
                ensure!(n >= 2, "curve size must be at least 2, got {}", n);
                n
            }
            None => DEFAULT_CURVE_SIZE,
        };

        Ok(Config {
            inputs: inputs,
            output: output,
            times: times,
            target_time: target_time,
            clamp_correction: clamp_correction,
            robust_calibration: matches.is_present("robust-calibration"),
            weight: weight,
            response: response,
            curve_size: curve_size,
        })
    }

    pub fn merge_params(&self, target_time: f32) -> MergeParams {
        MergeParams {
            target_time: target_time,
            robust_calibration: self.robust_calibration,
            clamp_correction: self.clamp_correction,
        }
    }
}

fn parse_positive(text: &str, what: &str) -> Result<f32> {
    let n: f32 = text
        .trim()
        .parse()
        .with_context(|| format!("invalid {} \"{}\"", what, text))?;
    ensure!(n.is_finite() && n > 0.0, "{} must be positive, got {}", what, n);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let matches = app()
            .get_matches_from_safe(std::iter::once("hdri_merge").chain(args.iter().copied()))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Config::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let config = parse(&["a.png", "b.png", "-o", "out.tif"]).unwrap();

        assert_eq!(config.inputs, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        assert_eq!(config.output, PathBuf::from("out.tif"));
        assert_eq!(config.times, None);
        assert_eq!(config.target_time, None);
        assert_eq!(config.clamp_correction, 0.0);
        assert!(!config.robust_calibration);
        assert_eq!(config.weight, CurveShape::Gaussian);
        assert_eq!(config.response, CurveShape::Srgb);
        assert_eq!(config.curve_size, DEFAULT_CURVE_SIZE);
    }

    #[test]
    fn all_options() {
        let config = parse(&[
            "a.tif",
            "b.tif",
            "c.tif",
            "--output",
            "out.tif",
            "--times",
            "0.01,0.1,1",
            "--target-time",
            "0.5",
            "--clamp-correction",
            "0.002",
            "--robust-calibration",
            "--weight",
            "plateau",
            "--response",
            "gamma:2.2",
            "--curve-size",
            "256",
        ])
        .unwrap();

        assert_eq!(config.times, Some(vec![0.01, 0.1, 1.0]));
        assert_eq!(config.target_time, Some(0.5));
        assert_eq!(config.clamp_correction, 0.002);
        assert!(config.robust_calibration);
        assert_eq!(config.weight, CurveShape::Plateau);
        assert_eq!(config.response, CurveShape::Gamma(2.2));
        assert_eq!(config.curve_size, 256);

        let params = config.merge_params(0.5);
        assert_eq!(params.target_time, 0.5);
        assert_eq!(params.clamp_correction, 0.002);
        assert!(params.robust_calibration);
    }

    #[test]
    fn rejects_bad_values() {
        // Time count doesn't match input count.
        assert!(parse(&["a.png", "b.png", "-o", "o.tif", "--times", "0.1"]).is_err());

        // Non-positive or unparsable times.
        assert!(parse(&["a.png", "-o", "o.tif", "--times", "0"]).is_err());
        assert!(parse(&["a.png", "-o", "o.tif", "--times", "fast"]).is_err());
        assert!(parse(&["a.png", "-o", "o.tif", "--target-time", "-1"]).is_err());

        assert!(parse(&["a.png", "-o", "o.tif", "--clamp-correction", "-0.5"]).is_err());
        assert!(parse(&["a.png", "-o", "o.tif", "--weight", "bell"]).is_err());
        assert!(parse(&["a.png", "-o", "o.tif", "--curve-size", "1"]).is_err());

        // Missing output.
        assert!(parse(&["a.png"]).is_err());
    }
}
