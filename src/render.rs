//! Render an image given a [Camera] and a [World].
//!
//! The framebuffer is cut into one contiguous band of scanlines per worker
//! thread. Workers write only their own band and publish how many rows they
//! finished through [Progress]; the calling thread polls those counters to
//! drive the progress bar until every worker is done.

use std::{
    sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering},
    time::{Duration, Instant},
};

use indicatif::ProgressBar;
use rand::Rng;

use crate::{
    camera::Camera,
    color::{self, Color},
    film::{FilmDescriptor, Framebuffer},
    integrator::radiance_along,
    utils::{progress::get_progressbar, random::row_rng},
    world::World,
};

/// Stage of a render, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Idle = 0,
    Dispatching = 1,
    Running = 2,
    Aggregating = 3,
    Done = 4,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Dispatching,
            2 => Phase::Running,
            3 => Phase::Aggregating,
            4 => Phase::Done,
            _ => Phase::Idle,
        }
    }
}

/// Completion state of one worker.
#[derive(Debug, Default)]
struct WorkerProgress {
    rows_done: AtomicU32,
    done: AtomicBool,
}

/// Marks its worker as finished when dropped, even while unwinding.
struct DoneGuard<'a>(&'a WorkerProgress);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.done.store(true, Ordering::Release);
    }
}

/// Lock-free progress of a render, readable from any thread while it runs.
#[derive(Debug)]
pub struct Progress {
    phase: AtomicU8,
    workers: Vec<WorkerProgress>,
}

impl Progress {
    /// Creates a tracker with one slot per worker thread.
    pub fn new(workers: usize) -> Self {
        Self {
            phase: AtomicU8::new(Phase::Idle as u8),
            workers: (0..workers).map(|_| WorkerProgress::default()).collect(),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Scanlines finished by worker `worker`.
    pub fn worker_rows(&self, worker: usize) -> Option<u32> {
        self.workers
            .get(worker)
            .map(|w| w.rows_done.load(Ordering::Relaxed))
    }

    /// Scanlines finished by all workers together.
    pub fn rows_done(&self) -> u32 {
        self.workers
            .iter()
            .map(|w| w.rows_done.load(Ordering::Relaxed))
            .sum()
    }

    /// Whether every worker has signalled completion.
    pub fn all_done(&self) -> bool {
        self.workers.iter().all(|w| w.done.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: Phase) {
        log::debug!("Render phase: {phase:?}");
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn reset(&self) {
        for worker in &self.workers {
            worker.rows_done.store(0, Ordering::Relaxed);
            worker.done.store(false, Ordering::Relaxed);
        }
        self.set_phase(Phase::Idle);
    }
}

/// Failure to set up a render.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not start the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("progress tracker has {found} worker slots, but the render uses {expected} threads")]
    ProgressSlots { expected: usize, found: usize },
}

/// Render settings that are not part of the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Number of worker threads
    pub threads: usize,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Seed of the per-row generators, drawn at random if `None`
    pub seed: Option<u64>,
    /// How often the calling thread checks on the workers
    pub poll_interval: Duration,
    /// Whether to draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, usize::from),
            max_depth: 50,
            seed: None,
            poll_interval: Duration::from_millis(100),
            show_progress: true,
        }
    }
}

/// Image Renderer holding the settings shared by every render it performs
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Creates a new [Renderer].
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn threads(&self) -> usize {
        self.config.threads.max(1)
    }

    /// Creates a [Progress] sized for this renderer.
    pub fn progress(&self) -> Progress {
        Progress::new(self.threads())
    }

    /// Calculates the total color value of the pixel at image coordinates (`x`, `y`)
    ///
    /// Averages `samples_per_pixel` jittered primary rays through the pixel.
    #[inline]
    pub fn compute_pixel_v<R: Rng + ?Sized>(
        &self,
        world: &World,
        cam: &Camera,
        film: &FilmDescriptor,
        x: u32,
        y: u32,
        rng: &mut R,
    ) -> Color {
        let samples = film.samples_per_pixel.max(1);
        let u_span = film.width.saturating_sub(1).max(1) as f32;
        let v_span = film.height.saturating_sub(1).max(1) as f32;
        let flipped_y = film.height.saturating_sub(1).saturating_sub(y) as f32;

        let mut color_v = Color::ZERO;
        for _ in 0..samples {
            // convert buffer indices to viewport coordinates
            let offset_u: f32 = rng.gen();
            let offset_v: f32 = rng.gen();
            let u = (x as f32 + offset_u) / u_span;
            let v = (flipped_y + offset_v) / v_span;

            let ray = cam.get_ray(u, v, rng);
            color_v += radiance_along(&ray, world, self.config.max_depth, rng);
        }

        // Account for number of samples
        color_v / samples as f32
    }

    /// Renders the scanlines starting at `first_row` into `band`.
    fn render_band(
        &self,
        world: &World,
        cam: &Camera,
        film: &FilmDescriptor,
        seed: u64,
        first_row: u32,
        band: &mut [u8],
        progress: &WorkerProgress,
    ) {
        let row_bytes = film.width as usize * 3;
        for (offset, row) in band.chunks_mut(row_bytes).enumerate() {
            let y = first_row + offset as u32;
            let mut rng = row_rng(seed, y);
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                let color_v = self.compute_pixel_v(world, cam, film, x as u32, y, &mut rng);
                pixel.copy_from_slice(&color::encode(color_v));
            }
            progress.rows_done.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Generates an image of `world` as seen by `cam`.
    pub fn render(&self, world: &World, cam: &Camera, film: &FilmDescriptor) -> Result<Framebuffer, RenderError> {
        self.render_with_progress(world, cam, film, &self.progress())
    }

    /// [Renderer::render] that publishes its progress into `progress`.
    ///
    /// `progress` must have one slot per thread, see [Renderer::progress].
    pub fn render_with_progress(
        &self,
        world: &World,
        cam: &Camera,
        film: &FilmDescriptor,
        progress: &Progress,
    ) -> Result<Framebuffer, RenderError> {
        let threads = self.threads();
        if progress.worker_count() != threads {
            return Err(RenderError::ProgressSlots {
                expected: threads,
                found: progress.worker_count(),
            });
        }
        progress.reset();
        progress.set_phase(Phase::Dispatching);

        let seed = self.config.seed.unwrap_or_else(|| {
            let seed = rand::random();
            log::debug!("Using render seed {seed}");
            seed
        });

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("glint-worker-{idx}"))
            .build()?;

        let mut framebuffer = Framebuffer::new(film.width, film.height);
        let rows_per_band = ((film.height as usize + threads - 1) / threads).max(1);
        let band_bytes = rows_per_band * film.width as usize * 3;

        let progress_bar = if self.config.show_progress {
            get_progressbar(u64::from(film.height)).with_prefix("Rendering")
        } else {
            ProgressBar::hidden()
        };

        log::info!(
            "Rendering {}x{} at {} samples per pixel on {threads} threads",
            film.width,
            film.height,
            film.samples_per_pixel
        );
        let start = Instant::now();

        pool.in_place_scope(|scope| {
            let mut dispatched = 0;
            // an empty image has no bands at all
            if band_bytes > 0 {
                for (worker, band) in framebuffer.bytes_mut().chunks_mut(band_bytes).enumerate() {
                    let slot = &progress.workers[worker];
                    let first_row = (worker * rows_per_band) as u32;
                    scope.spawn(move |_| {
                        let _guard = DoneGuard(slot);
                        self.render_band(world, cam, film, seed, first_row, band, slot);
                    });
                    dispatched += 1;
                }
            }
            // fewer bands than threads when the image is short
            for idle in &progress.workers[dispatched..] {
                idle.done.store(true, Ordering::Release);
            }
            progress.set_phase(Phase::Running);

            loop {
                progress_bar.set_position(u64::from(progress.rows_done()));
                if progress.all_done() {
                    break;
                }
                std::thread::sleep(self.config.poll_interval);
            }
            progress.set_phase(Phase::Aggregating);
        });

        progress_bar.finish();
        drop(pool);
        progress.set_phase(Phase::Done);
        log::info!("Render finished in {:.2?}", start.elapsed());

        Ok(framebuffer)
    }
}
