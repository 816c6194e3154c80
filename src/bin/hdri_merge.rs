use std::{fs::File, io::BufWriter};

use anyhow::{Context, Result};
use tracing::{error, info};

use hdr::RgbCurve;
use lib::{config, exposure_stack::ExposureStack, logger};

fn main() {
    logger::init();

    let matches = config::app().get_matches();
    if let Err(e) = run(&matches) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    let config = config::Config::from_matches(matches)?;

    // Load the exposure stack, shortest exposure first.
    let stack = ExposureStack::load(&config.inputs, config.times.as_deref())?;
    let (width, height) = stack.dimensions();
    info!(
        "Loaded {} images of {}x{}, exposure times {:?}",
        stack.len(),
        width,
        height,
        stack.times()
    );

    // Build curves.
    let weight = RgbCurve::from_shape(config.weight, config.curve_size);
    let response = RgbCurve::from_shape(config.response, config.curve_size);
    let target_time = config.target_time.unwrap_or_else(|| stack.middle_time());

    // Merge.
    info!(
        "Merging with {:?} weighting and {:?} response, target time {}",
        config.weight, config.response, target_time
    );
    let radiance = hdr::merge(
        stack.images(),
        stack.times(),
        &weight,
        &response,
        &config.merge_params(target_time),
    )?;

    // Save.
    info!("Saving: {}", config.output.to_string_lossy());
    let file = File::create(&config.output)
        .with_context(|| format!("Unable to create \"{}\"", config.output.to_string_lossy()))?;
    image_fmt::write_rgb_f32_tiff(
        BufWriter::new(file),
        radiance.width(),
        radiance.height(),
        radiance.pixels(),
    )
    .with_context(|| format!("Unable to write \"{}\"", config.output.to_string_lossy()))?;

    info!("Done.");
    Ok(())
}
