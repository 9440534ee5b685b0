//! Region cutting orchestration.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use projection::{HeightRange, SamplingGrid};
use raster::{ImageCropper, PercentileToneMapper, RasterCropper, ToneMapper};
use rayon::prelude::*;
use scene_metadata::{Dataset, DatasetOptions, RawImage};
use tile_common::{evaluate_coverage, tile_key, GeographicRegion, PixelRect, Result, TilerError};
use tracing::{debug, info, warn};

use crate::config::CutterConfig;
use crate::decision::{ImageAssessment, ImageDecision};
use crate::layout::{write_json, OutputLayout};
use crate::report::{RegionPlan, RegionReport, Tile};
use crate::staging::{remove_quietly, StagedTile};

/// An accepted image with its output index fixed.
struct TileJob {
    index: usize,
    image_index: usize,
    window: PixelRect,
    overlap_ratio: f64,
}

/// Cuts regions out of a dataset of raw scenes.
///
/// Construction loads nothing lazily: the dataset is already parsed, the
/// shared height envelope is computed once, and the output layout exists.
pub struct TileCutter {
    dataset: Dataset,
    heights: HeightRange,
    layout: OutputLayout,
    config: CutterConfig,
    cropper: Box<dyn RasterCropper>,
    tone_mapper: Box<dyn ToneMapper>,
    cancel: Arc<AtomicBool>,
}

impl TileCutter {
    /// Create a cutter over a loaded dataset, initializing `out_dir`.
    pub fn new(dataset: Dataset, out_dir: &Path, config: CutterConfig) -> Result<Self> {
        config.validate()?;
        let heights = dataset.height_range()?;
        let layout = OutputLayout::initialize(out_dir)?;

        info!(
            images = dataset.len(),
            min_height = heights.min,
            max_height = heights.max,
            cloud_threshold = config.cloud_threshold,
            coverage_threshold = config.coverage_threshold,
            "Tile cutter ready"
        );

        Ok(Self {
            dataset,
            heights,
            layout,
            config,
            cropper: Box::new(ImageCropper),
            tone_mapper: Box::new(PercentileToneMapper::default()),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Discover the dataset in `dataset_dir` and create a cutter over it.
    pub fn open(
        dataset_dir: &Path,
        out_dir: &Path,
        options: &DatasetOptions,
        config: CutterConfig,
    ) -> Result<Self> {
        let dataset = Dataset::discover(dataset_dir, options)?;
        Self::new(dataset, out_dir, config)
    }

    pub fn with_cropper(mut self, cropper: impl RasterCropper + 'static) -> Self {
        self.cropper = Box::new(cropper);
        self
    }

    pub fn with_tone_mapper(mut self, tone_mapper: impl ToneMapper + 'static) -> Self {
        self.tone_mapper = Box::new(tone_mapper);
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn height_range(&self) -> HeightRange {
        self.heights
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn config(&self) -> &CutterConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Run the filtering pass for a region without writing anything.
    ///
    /// Images are visited in capture-time order. A camera that cannot be
    /// evaluated over the region aborts the pass; rejections do not.
    pub fn plan_region(&self, region: &GeographicRegion) -> Result<RegionPlan> {
        region.validate()?;
        let grid = SamplingGrid::for_region(region, self.heights)?;

        let mut assessments: Vec<ImageAssessment> = (0..self.dataset.len())
            .map(|index| ImageAssessment {
                index,
                decision: ImageDecision::Pending,
            })
            .collect();
        let mut cancelled = false;

        for (index, image) in self.dataset.images().iter().enumerate() {
            if self.is_cancelled() {
                warn!(region = %region, remaining = self.dataset.len() - index, "Region cancelled");
                cancelled = true;
                break;
            }

            debug!(
                image = %image.name(),
                index,
                total = self.dataset.len(),
                "Assessing image"
            );
            let decision = self.assess(image, &grid)?;
            match decision {
                ImageDecision::RejectedCloudy { cloud_cover } => warn!(
                    image = %image.name(),
                    cloud_cover,
                    threshold = self.config.cloud_threshold,
                    "Rejected cloudy image"
                ),
                ImageDecision::RejectedLowCoverage { overlap_ratio } => warn!(
                    image = %image.name(),
                    overlap_ratio,
                    threshold = self.config.coverage_threshold,
                    "Rejected image with low coverage"
                ),
                ImageDecision::Accepted {
                    window,
                    overlap_ratio,
                } => info!(
                    image = %image.name(),
                    window = %window,
                    overlap_ratio,
                    "Accepted image"
                ),
                ImageDecision::Pending => {}
            }
            assessments[index].decision = decision;
        }

        Ok(RegionPlan {
            region: *region,
            assessments,
            cancelled,
        })
    }

    /// Decide one image against the region's sampling grid.
    fn assess(&self, image: &RawImage, grid: &SamplingGrid) -> Result<ImageDecision> {
        let meta = &image.metadata;
        if meta.cloud_cover > self.config.cloud_threshold {
            return Ok(ImageDecision::RejectedCloudy {
                cloud_cover: meta.cloud_cover,
            });
        }

        let (cols, rows) = meta
            .rpc
            .project(grid.lat(), grid.lon(), grid.height())
            .map_err(|e| TilerError::Data(format!("{}: {}", image.name(), e)))?;
        let candidate = PixelRect::bounding(&cols, &rows)?;
        let coverage = evaluate_coverage(&meta.extent(), &candidate)?;

        if !coverage.has_intersection || coverage.overlap_ratio < self.config.coverage_threshold {
            return Ok(ImageDecision::RejectedLowCoverage {
                overlap_ratio: coverage.overlap_ratio,
            });
        }

        Ok(ImageDecision::Accepted {
            window: coverage.intersection,
            overlap_ratio: coverage.overlap_ratio,
        })
    }

    /// Plan a region and write one tile per accepted image.
    ///
    /// Output indices follow acceptance order. Any failure while producing or
    /// committing a tile aborts the region and leaves none of its tiles
    /// behind.
    pub fn cut_region(&self, region: &GeographicRegion) -> Result<RegionReport> {
        let plan = self.plan_region(region)?;
        if plan.cancelled {
            return Ok(cancelled_report(plan));
        }

        let jobs: Vec<TileJob> = plan
            .accepted()
            .enumerate()
            .map(|(index, (image_index, window, overlap_ratio))| TileJob {
                index,
                image_index,
                window,
                overlap_ratio,
            })
            .collect();

        let staged: Vec<(Tile, StagedTile)> = if self.config.parallel {
            jobs.par_iter()
                .map(|job| self.stage_tile(job, region))
                .collect::<Result<_>>()?
        } else {
            jobs.iter()
                .map(|job| self.stage_tile(job, region))
                .collect::<Result<_>>()?
        };

        // Staged scratch files are discarded with the guards
        if self.is_cancelled() {
            warn!(region = %region, staged = staged.len(), "Region cancelled before commit");
            return Ok(cancelled_report(plan));
        }

        let mut tiles = Vec::with_capacity(staged.len());
        for (tile, guard) in staged {
            if let Err(e) = guard.commit() {
                for written in &tiles {
                    remove_tile(written);
                }
                return Err(e);
            }
            info!(
                key = %tile.key,
                source = %tile.source.display(),
                window = %tile.window,
                "Wrote tile"
            );
            tiles.push(tile);
        }

        let counts = plan.counts();
        info!(
            region = %region,
            tiles = tiles.len(),
            rejected_cloudy = counts.rejected_cloudy,
            rejected_low_coverage = counts.rejected_low_coverage,
            "Region complete"
        );

        Ok(RegionReport {
            region: *region,
            tiles,
            assessments: plan.assessments,
            cancelled: false,
        })
    }

    /// Write the area-of-interest descriptor, then cut it as one region.
    pub fn cut_aoi(&self, region: &GeographicRegion) -> Result<RegionReport> {
        region.validate()?;
        let path = self.layout.write_aoi(region)?;
        info!(path = %path.display(), aoi = %region, "Wrote area of interest");
        self.cut_region(region)
    }

    /// Produce a tile's three artifacts in the staging directory.
    fn stage_tile(&self, job: &TileJob, region: &GeographicRegion) -> Result<(Tile, StagedTile)> {
        let image = self.dataset.get(job.image_index).ok_or_else(|| {
            TilerError::Data(format!("image index {} outside dataset", job.image_index))
        })?;
        let meta = &image.metadata;
        let key = tile_key(job.index, &meta.capture_time);
        let layout = &self.layout;
        let mut staged = StagedTile::new(&key);

        let image_scratch = staged.stage(layout.staging_path(&key, "png"), layout.image_path(&key));
        self.cropper.crop(
            &image.raster_path,
            &image_scratch,
            (meta.width, meta.height),
            &job.window,
        )?;
        self.tone_mapper.normalize(&image_scratch, &image_scratch)?;

        let adjusted = meta.cropped(&job.window)?;
        let meta_scratch = staged.stage(layout.staging_path(&key, "meta.json"), layout.meta_path(&key));
        fs::write(&meta_scratch, adjusted.to_json()?).map_err(|e| TilerError::io(&meta_scratch, e))?;

        let region_scratch =
            staged.stage(layout.staging_path(&key, "region.json"), layout.region_path(&key));
        write_json(&region_scratch, region)?;

        debug!(key = %key, source = %image.name(), "Staged tile");

        let tile = Tile {
            index: job.index,
            image_path: layout.image_path(&key),
            meta_path: layout.meta_path(&key),
            region_path: layout.region_path(&key),
            key,
            image_index: job.image_index,
            source: image.raster_path.clone(),
            window: job.window,
            overlap_ratio: job.overlap_ratio,
        };
        Ok((tile, staged))
    }
}

fn cancelled_report(plan: RegionPlan) -> RegionReport {
    RegionReport {
        region: plan.region,
        tiles: Vec::new(),
        assessments: plan.assessments,
        cancelled: true,
    }
}

fn remove_tile(tile: &Tile) {
    for path in [&tile.image_path, &tile.meta_path, &tile.region_path] {
        remove_quietly(path);
    }
}
