//! Image silhouettes as point clouds.
//!
//! An image becomes a flat cloud by scaling it onto a small raster and
//! keeping one point per sufficiently opaque pixel. Decoding is slow enough
//! to stall a frame, so [`ImageLoader`] queues it on one worker thread and
//! [`ShapeSelector`] makes sure a late result never replaces a shape the user
//! picked after asking for the image.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::error::RasterError;
use crate::shapes::ShapeFamily;
use crate::Vec3;

/// Default raster edge, in pixels.
pub const RASTER_SIZE: u32 = 300;
/// Pixels must be strictly more opaque than this to emit a point.
pub const ALPHA_THRESHOLD: u8 = 128;
/// Status text shown when an image cannot be used.
pub const FALLBACK_MESSAGE: &str = "image load failed, using geometric shape";
/// Shape shown instead of an image that failed to load.
pub const FALLBACK_SHAPE: ShapeFamily = ShapeFamily::Sphere;

/// Sample the opaque pixels of `image` on a `width` x `height` raster.
///
/// Points are centred on the raster with y pointing up:
/// pixel `(x, y)` maps to `(x - width/2, height/2 - y, 0)`, halves included
/// for odd sizes.
pub fn rasterize(image: &DynamicImage, width: u32, height: u32) -> Vec<Vec3> {
    let rgba = image.to_rgba8();
    let rgba = if rgba.dimensions() == (width, height) {
        rgba
    } else {
        imageops::resize(&rgba, width, height, FilterType::Triangle)
    };

    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;

    rgba.enumerate_pixels()
        .filter(|(_, _, px)| px[3] > ALPHA_THRESHOLD)
        .map(|(x, y, _)| Vec3::new(x as f32 - half_w, half_h - y as f32, 0.0))
        .collect()
}

/// Read and decode an image file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicImage, RasterError> {
    let bytes = std::fs::read(path.as_ref())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Load and rasterize in one step. An image with no opaque pixel is an error.
pub fn image_points<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Vec<Vec3>, RasterError> {
    let image = load(path)?;
    let points = rasterize(&image, width, height);
    if points.is_empty() {
        return Err(RasterError::EmptyRaster);
    }
    Ok(points)
}

/// Receipt for an image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTicket {
    pub generation: u64,
}

/// A finished decode, delivered back to the render thread.
#[derive(Debug)]
pub struct ImageCompletion {
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<Vec<Vec3>, RasterError>,
}

#[derive(Debug)]
struct DecodeJob {
    generation: u64,
    path: PathBuf,
}

/// Decodes images off the render thread.
///
/// Requests are queued to a single worker, started on the first request and
/// stopped when the loader is dropped. Completions arrive in request order.
#[derive(Debug)]
pub struct ImageLoader {
    tx: Sender<ImageCompletion>,
    rx: Receiver<ImageCompletion>,
    jobs: Option<Sender<DecodeJob>>,
    next_generation: u64,
    raster: (u32, u32),
}

impl ImageLoader {
    pub fn new(raster_width: u32, raster_height: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            jobs: None,
            next_generation: 1,
            raster: (raster_width, raster_height),
        }
    }

    /// Queue `path` for decoding. Each request gets a fresh generation.
    pub fn request(&mut self, path: impl Into<PathBuf>) -> ImageTicket {
        let generation = self.next_generation;
        self.next_generation += 1;

        let path = path.into();
        let job = DecodeJob {
            generation,
            path: path.clone(),
        };

        let job = match &self.jobs {
            Some(jobs) => match jobs.send(job) {
                Ok(()) => return ImageTicket { generation },
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        if self.jobs.take().is_some() {
            log::warn!("image decode worker stopped, restarting it");
        }

        if let Err(e) = self.start_worker(job) {
            log::warn!("could not spawn decode thread: {}", e);
            let _ = self.tx.send(ImageCompletion {
                generation,
                path,
                result: Err(RasterError::Io(e)),
            });
        }

        ImageTicket { generation }
    }

    fn start_worker(&mut self, first: DecodeJob) -> std::io::Result<()> {
        let (jobs, queue) = mpsc::channel::<DecodeJob>();
        // `queue` is alive here, so this cannot fail.
        let _ = jobs.send(first);

        let done = self.tx.clone();
        let (width, height) = self.raster;
        std::thread::Builder::new()
            .name("image-decode".into())
            .spawn(move || {
                for job in queue {
                    let result = image_points(&job.path, width, height);
                    let completion = ImageCompletion {
                        generation: job.generation,
                        path: job.path,
                        result,
                    };
                    if done.send(completion).is_err() {
                        break;
                    }
                }
            })?;

        self.jobs = Some(jobs);
        Ok(())
    }

    /// Drain completions without blocking.
    pub fn poll(&self) -> Vec<ImageCompletion> {
        self.rx.try_iter().collect()
    }

    /// Block until one completion arrives or `timeout` passes.
    pub fn wait(&self, timeout: Duration) -> Option<ImageCompletion> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new(RASTER_SIZE, RASTER_SIZE)
    }
}

/// What is currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Family(ShapeFamily),
    Image(PathBuf),
}

/// A completion that should be applied.
#[derive(Debug)]
pub enum ImageOutcome {
    Loaded { path: PathBuf, points: Vec<Vec3> },
    /// The image failed; show `family` and tell the user.
    Fallback { family: ShapeFamily, message: &'static str },
}

/// Tracks the user's latest choice and filters stale image completions.
#[derive(Debug)]
pub struct ShapeSelector {
    loader: ImageLoader,
    current: Selection,
    pending: Option<ImageTicket>,
}

impl ShapeSelector {
    pub fn new(loader: ImageLoader, initial: ShapeFamily) -> Self {
        Self {
            loader,
            current: Selection::Family(initial),
            pending: None,
        }
    }

    pub fn current(&self) -> &Selection {
        &self.current
    }

    pub fn pending(&self) -> Option<ImageTicket> {
        self.pending
    }

    /// Choose a generated shape. Any image still decoding becomes stale.
    pub fn select_family(&mut self, family: ShapeFamily) {
        if let Some(ticket) = self.pending.take() {
            log::debug!("image request {} superseded by {}", ticket.generation, family);
        }
        self.current = Selection::Family(family);
    }

    /// Ask for an image. It replaces the current shape only when it arrives
    /// and nothing newer was chosen in between.
    pub fn request_image(&mut self, path: impl Into<PathBuf>) -> ImageTicket {
        let ticket = self.loader.request(path);
        self.pending = Some(ticket);
        ticket
    }

    /// Drain the loader and keep what is still wanted.
    pub fn poll(&mut self) -> Vec<ImageOutcome> {
        let completions = self.loader.poll();
        completions
            .into_iter()
            .filter_map(|c| self.accept(c))
            .collect()
    }

    /// Like [`ShapeSelector::poll`], but blocks for at most `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<ImageOutcome> {
        let completion = self.loader.wait(timeout)?;
        self.accept(completion)
    }

    /// Decide what to do with one completion.
    pub fn accept(&mut self, completion: ImageCompletion) -> Option<ImageOutcome> {
        let wanted = self
            .pending
            .is_some_and(|t| t.generation == completion.generation);
        if !wanted {
            log::debug!(
                "discarding stale image {} (generation {})",
                completion.path.display(),
                completion.generation
            );
            return None;
        }
        self.pending = None;

        match completion.result {
            Ok(points) => {
                log::info!(
                    "loaded image {} as {} points",
                    completion.path.display(),
                    points.len()
                );
                self.current = Selection::Image(completion.path.clone());
                Some(ImageOutcome::Loaded {
                    path: completion.path,
                    points,
                })
            }
            Err(e) => {
                log::warn!("image {} unusable: {}", completion.path.display(), e);
                self.current = Selection::Family(FALLBACK_SHAPE);
                Some(ImageOutcome::Fallback {
                    family: FALLBACK_SHAPE,
                    message: FALLBACK_MESSAGE,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(width: u32, height: u32, alpha: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, alpha])))
    }

    fn completion(generation: u64, result: Result<Vec<Vec3>, RasterError>) -> ImageCompletion {
        ImageCompletion {
            generation,
            path: PathBuf::from("heart.png"),
            result,
        }
    }

    #[test]
    fn test_rasterize_two_by_two() {
        let points = rasterize(&solid(2, 2, 255), 2, 2);
        assert_eq!(
            points,
            vec![
                Vec3::new(-1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_rasterize_odd_size_is_centred() {
        let points = rasterize(&solid(3, 1, 255), 3, 1);
        assert_eq!(
            points,
            vec![
                Vec3::new(-1.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
            ]
        );
    }

    #[test]
    fn test_alpha_threshold_is_strict() {
        assert!(rasterize(&solid(4, 4, 128), 4, 4).is_empty());
        assert_eq!(rasterize(&solid(4, 4, 129), 4, 4).len(), 16);
    }

    #[test]
    fn test_rasterize_resizes() {
        let points = rasterize(&solid(10, 6, 255), 30, 30);
        assert_eq!(points.len(), 900);
        assert!(points.iter().all(|p| p.x >= -15.0 && p.x < 15.0 && p.z == 0.0));
    }

    #[test]
    fn test_partial_silhouette() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        img.put_pixel(3, 0, Rgba([255, 0, 0, 255]));
        let points = rasterize(&DynamicImage::ImageRgba8(img), 4, 4);
        assert_eq!(points, vec![Vec3::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, RasterError::Io(_)));
    }

    #[test]
    fn test_load_garbage() {
        let path = std::env::temp_dir().join("glyphmorph_raster_garbage.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, RasterError::ImageLoad(_)));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut selector = ShapeSelector::new(ImageLoader::default(), ShapeFamily::Sphere);
        let ticket = selector.request_image("/missing/heart.png");
        selector.select_family(ShapeFamily::Cube);

        let outcome = selector.accept(completion(ticket.generation, Ok(vec![Vec3::X])));
        assert!(outcome.is_none());
        assert_eq!(selector.current(), &Selection::Family(ShapeFamily::Cube));
    }

    #[test]
    fn test_older_request_superseded_by_newer() {
        let mut selector = ShapeSelector::new(ImageLoader::default(), ShapeFamily::Sphere);
        let first = selector.request_image("/missing/a.png");
        let second = selector.request_image("/missing/b.png");
        assert!(second.generation > first.generation);

        assert!(selector.accept(completion(first.generation, Ok(vec![Vec3::X]))).is_none());
        let outcome = selector.accept(completion(second.generation, Ok(vec![Vec3::Y])));
        assert!(matches!(outcome, Some(ImageOutcome::Loaded { ref points, .. }) if points == &[Vec3::Y]));
        assert!(selector.pending().is_none());
    }

    #[test]
    fn test_failure_falls_back() {
        let mut selector = ShapeSelector::new(ImageLoader::default(), ShapeFamily::Cube);
        let ticket = selector.request_image("/missing/skull.png");
        let outcome = selector.accept(completion(ticket.generation, Err(RasterError::EmptyRaster)));
        match outcome {
            Some(ImageOutcome::Fallback { family, message }) => {
                assert_eq!(family, ShapeFamily::Sphere);
                assert_eq!(message, "image load failed, using geometric shape");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(selector.current(), &Selection::Family(ShapeFamily::Sphere));
    }

    #[test]
    fn test_loader_thread_reports_failure() {
        let mut selector = ShapeSelector::new(ImageLoader::default(), ShapeFamily::Sphere);
        selector.request_image("/definitely/not/here.png");
        let outcome = selector.wait(Duration::from_secs(5));
        assert!(matches!(outcome, Some(ImageOutcome::Fallback { .. })));
    }

    #[test]
    fn test_loader_thread_decodes_png() {
        let path = std::env::temp_dir().join("glyphmorph_raster_dot.png");
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        img.put_pixel(4, 4, Rgba([255, 255, 255, 255]));
        img.save(&path).unwrap();

        let mut loader = ImageLoader::new(8, 8);
        let ticket = loader.request(&path);
        let done = loader.wait(Duration::from_secs(5)).expect("completion");
        assert_eq!(done.generation, ticket.generation);
        assert_eq!(done.result.unwrap(), vec![Vec3::new(0.0, 0.0, 0.0)]);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_loader_queues_requests_on_one_worker() {
        let mut loader = ImageLoader::new(8, 8);
        let tickets: Vec<_> = ["/missing/a.png", "/missing/b.png", "/missing/c.png"]
            .iter()
            .map(|p| loader.request(*p))
            .collect();

        let generations: Vec<u64> = (0..3)
            .map(|_| loader.wait(Duration::from_secs(5)).expect("completion").generation)
            .collect();
        assert_eq!(generations, tickets.iter().map(|t| t.generation).collect::<Vec<_>>());
        assert!(loader.jobs.is_some());
    }
}
