//! Loading and ordering of bracketed exposures.

use std::path::Path;

use anyhow::{anyhow, ensure, Context, Result};
use tracing::{debug, info, warn};

use hdr::Image;

/// One exposure of the stack.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub filename: String,
    pub image: Image,
    pub exposure_time: f32,
}

/// Images of the same scene ordered from shortest to longest exposure.
#[derive(Debug, Clone)]
pub struct ExposureStack {
    filenames: Vec<String>,
    images: Vec<Image>,
    times: Vec<f32>,
}

impl ExposureStack {
    /// Builds a stack from already loaded images, sorting them by
    /// exposure time.
    ///
    /// All images must have the resolution of the first one.
    pub fn from_images(mut sources: Vec<SourceImage>) -> Result<ExposureStack> {
        ensure!(!sources.is_empty(), "no images to merge");

        let needed = sources[0].image.dimensions();
        for src in sources.iter() {
            ensure!(
                src.image.dimensions() == needed,
                "Image has a different resolution: \"{}\" is {}x{} but {}x{} is needed.  Note: all images must have the same resolution.",
                src.filename,
                src.image.width(),
                src.image.height(),
                needed.0,
                needed.1,
            );
            ensure!(
                src.exposure_time.is_finite() && src.exposure_time > 0.0,
                "invalid exposure time {} for \"{}\"",
                src.exposure_time,
                src.filename,
            );
        }

        // Shortest exposure first.
        sources.sort_by(|a, b| a.exposure_time.total_cmp(&b.exposure_time));

        let mut stack = ExposureStack {
            filenames: Vec::with_capacity(sources.len()),
            images: Vec::with_capacity(sources.len()),
            times: Vec::with_capacity(sources.len()),
        };
        for src in sources {
            debug!("\"{}\": exposure time {}", src.filename, src.exposure_time);
            stack.filenames.push(src.filename);
            stack.images.push(src.image);
            stack.times.push(src.exposure_time);
        }

        Ok(stack)
    }

    /// Loads the image files at `paths`.
    ///
    /// If `times` is given it must match `paths` index for index,
    /// otherwise each file's exposure time is read from its Exif data.
    pub fn load<P: AsRef<Path>>(paths: &[P], times: Option<&[f32]>) -> Result<ExposureStack> {
        if let Some(times) = times {
            ensure!(
                times.len() == paths.len(),
                "got {} exposure times for {} images",
                times.len(),
                paths.len()
            );
        }

        let mut sources = Vec::with_capacity(paths.len());
        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();
            info!("Loading: {}", path.to_string_lossy());

            let image = load_image(path)?;
            let exposure_time = match times {
                Some(times) => times[i],
                None => exif_exposure_time(path)?.ok_or_else(|| {
                    anyhow!(
                        "Image file lacks the Exif exposure time: \"{}\".  Pass --times instead.",
                        path.to_string_lossy()
                    )
                })?,
            };

            sources.push(SourceImage {
                filename: path.to_string_lossy().into_owned(),
                image: image,
                exposure_time: exposure_time,
            });
        }

        ExposureStack::from_images(sources)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.images[0].dimensions()
    }

    /// The exposure time of the middle image of the stack.
    pub fn middle_time(&self) -> f32 {
        self.times[self.times.len() / 2]
    }
}

fn load_image(path: &Path) -> Result<Image> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Unable to access file \"{}\".", path.to_string_lossy()))?;
    let img = image_fmt::load(std::io::BufReader::new(file))
        .with_context(|| format!("Unable to load image \"{}\".", path.to_string_lossy()))?;

    let (width, height) = img.dimensions;
    debug!("{}x{}, {}-bit", width, height, img.bit_depth());
    Ok(Image::new(width, height, img.to_normalized_rgb())?)
}

/// Reads the exposure time from the file's Exif data, in seconds.
///
/// Returns `None` if the file has no usable Exif exposure time.
pub fn exif_exposure_time(path: &Path) -> Result<Option<f32>> {
    let mut file = std::io::BufReader::new(
        std::fs::File::open(path)
            .with_context(|| format!("Unable to access file \"{}\".", path.to_string_lossy()))?,
    );

    let img_exif = match exif::Reader::new().read_from_container(&mut file) {
        Ok(img_exif) => img_exif,
        Err(_) => {
            warn!("No Exif data in \"{}\".", path.to_string_lossy());
            return Ok(None);
        }
    };

    if let Some(&exif::Value::Rational(ref n)) = img_exif
        .get_field(exif::Tag::ExposureTime, exif::In::PRIMARY)
        .map(|n| &n.value)
    {
        if let Some(t) = n.first() {
            let t = t.to_f64() as f32;
            if t.is_finite() && t > 0.0 {
                return Ok(Some(t));
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, width: usize, height: usize, time: f32) -> SourceImage {
        SourceImage {
            filename: name.to_string(),
            image: Image::from_pixel(width, height, [time; 3]),
            exposure_time: time,
        }
    }

    #[test]
    fn sorts_shortest_first() {
        let stack = ExposureStack::from_images(vec![
            source("mid", 4, 3, 0.1),
            source("long", 4, 3, 1.0),
            source("short", 4, 3, 0.01),
        ])
        .unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.filenames(), &["short", "mid", "long"]);
        assert_eq!(stack.times(), &[0.01, 0.1, 1.0]);
        assert_eq!(stack.images()[0].pixel(0, 0), [0.01; 3]);
        assert_eq!(stack.images()[2].pixel(3, 2), [1.0; 3]);
        assert_eq!(stack.dimensions(), (4, 3));
        assert_eq!(stack.middle_time(), 0.1);
    }

    #[test]
    fn rejects_mismatched_resolution() {
        let r = ExposureStack::from_images(vec![source("a", 4, 3, 0.1), source("b", 3, 4, 0.2)]);
        assert!(r.is_err());
    }

    #[test]
    fn rejects_bad_times() {
        assert!(ExposureStack::from_images(vec![source("a", 1, 1, 0.0)]).is_err());
        assert!(ExposureStack::from_images(vec![source("a", 1, 1, f32::NAN)]).is_err());
        assert!(ExposureStack::from_images(Vec::new()).is_err());
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(ExposureStack::load(&[&missing], Some(&[0.1][..])).is_err());
        assert!(ExposureStack::load(&[&missing], Some(&[0.1, 0.2][..])).is_err());
    }

    #[test]
    fn exif_of_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"no exif here").unwrap();
        assert_eq!(exif_exposure_time(&path).unwrap(), None);
    }
}
