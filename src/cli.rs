//! Definition of command line arguments

use std::path::PathBuf;

pub use clap::Parser;
pub use clap_verbosity_flag::Verbosity;

/// Argument definitions for [clap::Parser]
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Arguments {
    /// The scene description to render
    #[clap(default_value = "scene.json", value_name = "SCENE")]
    pub scene: PathBuf,

    /// The path to the file to write the resulting image into
    ///
    /// Overrides the output given in the scene file
    #[clap(short, long, value_parser = valid_image_file, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// samples per pixel
    ///
    /// Overrides the sample count of the scene file. A higher count of samples
    /// leads to higher visual fidelity due to more rays sent for a pixel
    #[clap(
        short = 'n',
        long = "samples",
        value_parser = valid_count::<u32>,
        value_name = "NUM"
    )]
    pub samples_per_pixel: Option<u32>,

    /// number of light contribution bounces
    ///
    /// A higher number of bounces leads to higher visual fidelity due to more accurate gathered light
    #[clap(
        short,
        long = "bounces",
        value_parser = valid_count::<u32>,
        default_value_t = 50,
        value_name = "NUM"
    )]
    pub bounce_depth: u32,

    /// number of worker threads
    ///
    /// Defaults to the available parallelism of this machine
    #[clap(
        short,
        long,
        value_parser = valid_count::<usize>,
        default_value_t = default_threads(),
        value_name = "NUM"
    )]
    pub threads: usize,

    /// The seed used for psuedorandom number generation
    #[clap(long)]
    pub seed: Option<u64>,

    #[clap(flatten)]
    pub verbosity: self::Verbosity,
}

fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, usize::from)
}

/// Checks whether the given integer value is greater than 0
fn valid_count<T>(s: &str) -> Result<T, String>
where
    T: num_traits::PrimInt + std::str::FromStr,
    <T as std::str::FromStr>::Err: std::fmt::Display,
{
    match s.parse::<T>() {
        Ok(count) => {
            if count > T::zero() {
                Ok(count)
            } else {
                Err("count must be greater than 0".to_string())
            }
        }
        Err(e) => Err(e.to_string()),
    }
}

/// Checks whether the given output file is valid
///
/// Checks the following properties:
/// * a valid path (always the case)
/// * a supported image format, see [crate::film::output_format]
fn valid_image_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    match crate::film::output_format(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(e.to_string()),
    }
}
