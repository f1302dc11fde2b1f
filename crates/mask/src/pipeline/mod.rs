pub mod builder;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::{
    algorithms::resize_mask,
    collection::MaskCollection,
    conversion::{to_image, to_mask},
    traits::PixelAlgorithm,
    types::{ImageSize, Mask, Point2D, TimeFrameIndex, DEFAULT_IMAGE_SIZE},
};

/// Receives completion percentages in `0..=100`
pub type ProgressCallback<'a> = &'a mut dyn FnMut(u32);

/// Knobs for one dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Carry empty input masks through as empty output masks
    pub preserve_empty_masks: bool,
    /// Worker count; `None` runs on the global rayon pool
    pub num_threads: Option<usize>,
}

/// One mask at one time frame
struct ProcessingJob<'a> {
    points: &'a [Point2D],
    time: TimeFrameIndex,
    original_index: usize,
    is_empty: bool,
}

/// Result slot filled by exactly one worker
struct JobOutcome {
    points: Mask,
    emit: bool,
}

/// Fans per-mask work out across a worker pool and merges the results back
/// into a new collection in a fixed order.
///
/// Workers only ever fill their own result slot. Insertion into the output
/// collection and every progress report happen afterwards on the calling
/// thread, iterating jobs in time order then per-frame mask order, so the
/// result does not depend on the number of threads.
#[derive(Debug, Clone, Default)]
pub struct MaskDispatcher {
    options: DispatchOptions,
}

impl MaskDispatcher {
    /// Create a new dispatcher builder
    pub fn builder() -> builder::DispatcherBuilder {
        builder::DispatcherBuilder::new()
    }

    pub fn new(options: DispatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Rasterize every mask, run `algorithm` on it and extract the result.
    ///
    /// A missing or mask-less source produces an empty collection after a
    /// single progress report of 100.
    pub fn dispatch<A>(
        &self,
        source: Option<&MaskCollection>,
        algorithm: &A,
        progress: Option<ProgressCallback<'_>>,
    ) -> MaskCollection
    where
        A: PixelAlgorithm + ?Sized,
    {
        let image_size = canonical_size(source);
        debug!(
            algorithm = algorithm.name(),
            %image_size,
            "Dispatching pixel algorithm over mask collection"
        );

        self.run(source, image_size, progress, |points| {
            to_mask(&algorithm.apply(&to_image(points, image_size)))
        })
    }

    /// Run a point-level `transform` on every non-empty mask.
    ///
    /// The output collection takes `output_size` as its canonical size.
    pub fn dispatch_masks<F>(
        &self,
        source: Option<&MaskCollection>,
        output_size: ImageSize,
        transform: F,
        progress: Option<ProgressCallback<'_>>,
    ) -> MaskCollection
    where
        F: Fn(&[Point2D]) -> Mask + Sync,
    {
        self.run(source, output_size, progress, transform)
    }

    /// Resample every mask from the source's canonical size to `dest`
    pub fn resize(
        &self,
        source: Option<&MaskCollection>,
        dest: ImageSize,
        progress: Option<ProgressCallback<'_>>,
    ) -> MaskCollection {
        let source_size = canonical_size(source);
        debug!(%source_size, %dest, "Resizing mask collection");

        self.dispatch_masks(
            source,
            dest,
            |points| resize_mask(points, source_size, dest),
            progress,
        )
    }

    fn run<F>(
        &self,
        source: Option<&MaskCollection>,
        output_size: ImageSize,
        mut progress: Option<ProgressCallback<'_>>,
        transform: F,
    ) -> MaskCollection
    where
        F: Fn(&[Point2D]) -> Mask + Sync,
    {
        let mut report = |percent: u32| {
            if let Some(callback) = progress.as_deref_mut() {
                callback(percent);
            }
        };

        let mut output = MaskCollection::with_image_size(output_size);
        let jobs = collect_jobs(source);
        if jobs.is_empty() {
            report(100);
            return output;
        }

        let preserve_empty = self.options.preserve_empty_masks;
        let outcomes = self.execute(&jobs, |job| {
            if job.is_empty {
                return JobOutcome {
                    points: Mask::new(),
                    emit: preserve_empty,
                };
            }
            let points = transform(job.points);
            let emit = !points.is_empty();
            JobOutcome { points, emit }
        });

        let total = jobs.len();
        let mut last_reported = 0;
        for (done, (job, outcome)) in jobs.iter().zip(outcomes).enumerate() {
            if outcome.emit {
                output.add_at_time(job.time, outcome.points);
            } else if !job.is_empty {
                debug!(
                    time = %job.time,
                    index = job.original_index,
                    "Dropping mask with no remaining pixels"
                );
            }
            last_reported = progress_percent(done + 1, total);
            report(last_reported);
        }
        if last_reported < 100 {
            report(100);
        }

        debug!(
            jobs = total,
            masks = output.total_mask_count(),
            frames = output.time_count(),
            "Merged dispatch results"
        );
        output
    }

    /// Parallel phase: one outcome per job, in job order
    fn execute<F>(&self, jobs: &[ProcessingJob<'_>], run_job: F) -> Vec<JobOutcome>
    where
        F: Fn(&ProcessingJob<'_>) -> JobOutcome + Sync,
    {
        let parallel = || -> Vec<JobOutcome> { jobs.par_iter().map(&run_job).collect() };

        match self.options.num_threads {
            None => parallel(),
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(parallel),
                Err(err) => {
                    warn!("Could not build a {}-thread worker pool ({}); using the global pool", threads, err);
                    parallel()
                }
            },
        }
    }
}

/// Canonical size of `source`, or the default canvas when it has none
pub fn canonical_size(source: Option<&MaskCollection>) -> ImageSize {
    source
        .and_then(MaskCollection::image_size)
        .filter(ImageSize::is_valid)
        .unwrap_or(DEFAULT_IMAGE_SIZE)
}

fn collect_jobs(source: Option<&MaskCollection>) -> Vec<ProcessingJob<'_>> {
    let Some(collection) = source else {
        return Vec::new();
    };

    collection
        .iter()
        .flat_map(|(time, masks)| {
            masks
                .iter()
                .enumerate()
                .map(move |(original_index, points)| ProcessingJob {
                    points,
                    time,
                    original_index,
                    is_empty: points.is_empty(),
                })
        })
        .collect()
}

fn progress_percent(done: usize, total: usize) -> u32 {
    (done as f64 / total as f64 * 100.0).round() as u32
}
