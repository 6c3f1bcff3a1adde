//! Work distribution for tile-based rendering: partitions the film's
//! crop window into [`WorkUnit`]s that workers pull one at a time and
//! hand back once rendered. Three variants, all driven through the
//! [`RegionScheduler`] trait so the driver doesn't care which one a
//! render is configured with:
//! - [`TileScheduler`]: row-major tiles, fixed spp, no feedback.
//! - [`SpiralGridScheduler`]: same tiling, emitted in an outward spiral
//!   from the center instead of raster order (a render interrupted
//!   partway through fills in evenly rather than leaving one corner
//!   unstarted).
//! - [`DammertzScheduler`]: adaptive refinement — a region's error is
//!   measured after each pass and the region is split, re-enqueued, or
//!   retired accordingly.

use std::collections::VecDeque;

use crate::geometry::bounds::Bounds2i;
use crate::Point2i;

/// One rendering pass over a [`Bounds2i`] region: render it for `spp`
/// samples per pixel, then report back to the dispatcher via
/// [`RegionScheduler::submit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkUnit {
    pub region: Bounds2i,
    pub spp: usize,
}

/// Common interface workers and the driver use to pull units and report
/// completion, regardless of which dispatch policy is configured.
pub trait RegionScheduler {
    /// Pops the next unit to render, or `None` if nothing is left.
    fn dispatch(&mut self) -> Option<WorkUnit>;

    /// Reports the result of rendering `region`: for non-adaptive
    /// schedulers this simply retires the region; `error_estimate` is
    /// only consulted by [`DammertzScheduler`].
    fn submit(&mut self, region: Bounds2i, error_estimate: f32);

    fn is_done(&self) -> bool;

    /// Fraction of the total render area that has been handed to a
    /// worker at least once. Monotonic, approximate under re-passes.
    fn scheduled_fraction(&self) -> f32;

    /// Fraction of the total render area that has been retired.
    fn submitted_fraction(&self) -> f32;
}

fn area(region: Bounds2i) -> i64 {
    let (w, h) = region.dimensions();
    w as i64 * h as i64
}

/// Splits `region` into a row-major grid of at-most-`tile`-sized cells.
fn tile_grid(region: Bounds2i, tile: i32) -> Vec<Bounds2i> {
    let mut tiles = Vec::new();
    let mut y = region.min.y;
    while y < region.max.y {
        let mut x = region.min.x;
        while x < region.max.x {
            let max = Point2i::new((x + tile).min(region.max.x), (y + tile).min(region.max.y));
            tiles.push(Bounds2i::with_bounds(Point2i::new(x, y), max));
            x += tile;
        }
        y += tile;
    }
    tiles
}

/// Orders tile-grid indices `(col, row)` by ascending (then clockwise)
/// distance from the grid's center, so the dispatch sequence spirals
/// outward rather than sweeping row by row.
fn spiral_order(n_cols: i32, n_rows: i32) -> Vec<(i32, i32)> {
    let center_x = (n_cols - 1) as f32 / 2.0;
    let center_y = (n_rows - 1) as f32 / 2.0;
    let mut cells: Vec<(i32, i32)> = (0..n_rows).flat_map(|r| (0..n_cols).map(move |c| (c, r))).collect();
    cells.sort_by(|&(ac, ar), &(bc, br)| {
        let da = (ac as f32 - center_x).powi(2) + (ar as f32 - center_y).powi(2);
        let db = (bc as f32 - center_x).powi(2) + (br as f32 - center_y).powi(2);
        da.partial_cmp(&db).unwrap()
    });
    cells
}

/// Fixed row-major tiling: every tile is dispatched exactly once, at a
/// constant sample count, with no feedback loop.
pub struct TileScheduler {
    pending: VecDeque<Bounds2i>,
    total_area: i64,
    dispatched_area: i64,
    submitted_area: i64,
    spp: usize,
}

impl TileScheduler {
    pub fn new(full_region: Bounds2i, tile: i32, spp: usize) -> Self {
        let tiles = tile_grid(full_region, tile);
        let total_area = tiles.iter().map(|&r| area(r)).sum();
        Self { pending: tiles.into(), total_area, dispatched_area: 0, submitted_area: 0, spp }
    }
}

impl RegionScheduler for TileScheduler {
    fn dispatch(&mut self) -> Option<WorkUnit> {
        let region = self.pending.pop_front()?;
        self.dispatched_area += area(region);
        Some(WorkUnit { region, spp: self.spp })
    }

    fn submit(&mut self, region: Bounds2i, _error_estimate: f32) {
        self.submitted_area += area(region);
    }

    fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    fn scheduled_fraction(&self) -> f32 {
        if self.total_area == 0 { 1.0 } else { self.dispatched_area as f32 / self.total_area as f32 }
    }

    fn submitted_fraction(&self) -> f32 {
        if self.total_area == 0 { 1.0 } else { self.submitted_area as f32 / self.total_area as f32 }
    }
}

/// Same tiling as [`TileScheduler`], but cells are dispatched in an
/// outward spiral from the region's center instead of raster order.
pub struct SpiralGridScheduler {
    inner: TileScheduler,
}

impl SpiralGridScheduler {
    pub fn new(full_region: Bounds2i, tile: i32, spp: usize) -> Self {
        let tiles = tile_grid(full_region, tile);
        let n_cols = ((full_region.dimensions().0 + tile - 1) / tile).max(1);
        let n_rows = ((full_region.dimensions().1 + tile - 1) / tile).max(1);
        let order = spiral_order(n_cols, n_rows);

        let spiraled: Vec<Bounds2i> = order
            .into_iter()
            .filter_map(|(c, r)| tiles.get((r * n_cols + c) as usize).copied())
            .collect();

        let total_area = spiraled.iter().map(|&r| area(r)).sum();
        Self {
            inner: TileScheduler {
                pending: spiraled.into(),
                total_area,
                dispatched_area: 0,
                submitted_area: 0,
                spp,
            },
        }
    }
}

impl RegionScheduler for SpiralGridScheduler {
    fn dispatch(&mut self) -> Option<WorkUnit> {
        self.inner.dispatch()
    }

    fn submit(&mut self, region: Bounds2i, error_estimate: f32) {
        self.inner.submit(region, error_estimate)
    }

    fn is_done(&self) -> bool {
        self.inner.is_done()
    }

    fn scheduled_fraction(&self) -> f32 {
        self.inner.scheduled_fraction()
    }

    fn submitted_fraction(&self) -> f32 {
        self.inner.submitted_fraction()
    }
}

/// FIFO region dispatcher implementing Dammertz's split/terminate rule.
///
/// A region's accumulated error is compared against two thresholds
/// derived from a single `precision_standard` knob: below
/// `terminate_threshold` the region is done; above `split_threshold` it
/// is quartered and each quadrant re-enqueued; in between it is
/// re-enqueued unsplit for another pass at the same resolution.
pub struct DammertzScheduler {
    pending: VecDeque<Bounds2i>,
    terminate_threshold: f32,
    split_threshold: f32,
    depth_per_region: usize,
    total_area: i64,
    dispatched_area: i64,
    retired_area: i64,
}

impl DammertzScheduler {
    /// `precision_standard` of `1.0` matches the reference thresholds
    /// (`terminate = 0.0002`, `split = 256 * terminate`); scale it up to
    /// tolerate more noise, or down to demand a cleaner image before a
    /// region is allowed to retire.
    pub fn new(full_region: Bounds2i, precision_standard: f32, depth_per_region: usize) -> Self {
        let terminate_threshold = precision_standard * 0.0002;
        let split_threshold = 256.0 * terminate_threshold;
        let mut pending = VecDeque::new();
        pending.push_back(full_region);
        let total_area = area(full_region);
        Self {
            pending,
            terminate_threshold,
            split_threshold,
            depth_per_region,
            total_area,
            dispatched_area: 0,
            retired_area: 0,
        }
    }

    pub fn with_defaults(full_region: Bounds2i) -> Self {
        Self::new(full_region, 1.0, 16)
    }

    /// Pops the next region to render, if any are still pending.
    pub fn dispatch(&mut self) -> Option<WorkUnit> {
        let region = self.pending.pop_front()?;
        self.dispatched_area += area(region);
        Some(WorkUnit { region, spp: self.depth_per_region })
    }

    /// Reports the error estimate measured after rendering `region`,
    /// deciding whether it needs another pass, a split, or is finished.
    pub fn submit(&mut self, region: Bounds2i, error_estimate: f32) {
        if error_estimate <= self.terminate_threshold {
            self.retired_area += area(region);
            return;
        }

        if error_estimate <= self.split_threshold || !Self::can_split(region) {
            self.pending.push_back(region);
            return;
        }

        for quadrant in Self::split(region) {
            self.pending.push_back(quadrant);
        }
    }

    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn can_split(region: Bounds2i) -> bool {
        let (w, h) = region.dimensions();
        w > 1 && h > 1
    }

    fn split(region: Bounds2i) -> [Bounds2i; 4] {
        let mid = Point2i::new(
            (region.min.x + region.max.x) / 2,
            (region.min.y + region.max.y) / 2,
        );
        [
            Bounds2i::with_bounds(region.min, mid),
            Bounds2i::with_bounds(Point2i::new(mid.x, region.min.y), Point2i::new(region.max.x, mid.y)),
            Bounds2i::with_bounds(Point2i::new(region.min.x, mid.y), Point2i::new(mid.x, region.max.y)),
            Bounds2i::with_bounds(mid, region.max),
        ]
    }
}

impl RegionScheduler for DammertzScheduler {
    fn dispatch(&mut self) -> Option<WorkUnit> {
        DammertzScheduler::dispatch(self)
    }

    fn submit(&mut self, region: Bounds2i, error_estimate: f32) {
        DammertzScheduler::submit(self, region, error_estimate)
    }

    fn is_done(&self) -> bool {
        DammertzScheduler::is_done(self)
    }

    fn scheduled_fraction(&self) -> f32 {
        if self.total_area == 0 { 1.0 } else { self.dispatched_area as f32 / self.total_area as f32 }
    }

    fn submitted_fraction(&self) -> f32 {
        if self.total_area == 0 { 1.0 } else { self.retired_area as f32 / self.total_area as f32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x0: i32, y0: i32, x1: i32, y1: i32) -> Bounds2i {
        Bounds2i::with_bounds(Point2i::new(x0, y0), Point2i::new(x1, y1))
    }

    #[test]
    fn starts_with_full_region_pending() {
        let mut sched = DammertzScheduler::with_defaults(region(0, 0, 64, 64));
        assert_eq!(sched.pending_count(), 1);
        let unit = sched.dispatch().unwrap();
        assert_eq!(unit.region, region(0, 0, 64, 64));
        assert!(sched.is_done());
    }

    #[test]
    fn low_error_terminates_region() {
        let mut sched = DammertzScheduler::with_defaults(region(0, 0, 64, 64));
        let unit = sched.dispatch().unwrap();
        sched.submit(unit.region, 0.0001);
        assert!(sched.is_done());
    }

    #[test]
    fn moderate_error_requeues_unsplit() {
        let mut sched = DammertzScheduler::with_defaults(region(0, 0, 64, 64));
        let unit = sched.dispatch().unwrap();
        sched.submit(unit.region, 0.01);
        assert_eq!(sched.pending_count(), 1);
        let requeued = sched.dispatch().unwrap();
        assert_eq!(requeued.region, unit.region);
    }

    #[test]
    fn high_error_splits_into_quadrants() {
        let mut sched = DammertzScheduler::with_defaults(region(0, 0, 64, 64));
        let unit = sched.dispatch().unwrap();
        sched.submit(unit.region, 1.0);
        assert_eq!(sched.pending_count(), 4);

        let total_area: i32 = std::iter::from_fn(|| sched.dispatch())
            .map(|u| {
                let (w, h) = u.region.dimensions();
                w * h
            })
            .sum();
        assert_eq!(total_area, 64 * 64);
    }

    #[test]
    fn single_pixel_region_cannot_split() {
        let mut sched = DammertzScheduler::with_defaults(region(0, 0, 1, 1));
        let unit = sched.dispatch().unwrap();
        sched.submit(unit.region, 1.0);
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn tile_scheduler_covers_region_exactly_once() {
        let mut sched = TileScheduler::new(region(0, 0, 65, 33), 16, 8);
        let mut covered = 0i64;
        let mut n_units = 0;
        while let Some(unit) = sched.dispatch() {
            assert_eq!(unit.spp, 8);
            covered += area(unit.region);
            sched.submit(unit.region, 0.0);
            n_units += 1;
        }
        assert_eq!(covered, 65 * 33);
        assert!(sched.is_done());
        assert_eq!(sched.scheduled_fraction(), 1.0);
        assert_eq!(sched.submitted_fraction(), 1.0);
        assert!(n_units > 1, "a 65x33 region at tile 16 should need more than one tile");
    }

    #[test]
    fn spiral_scheduler_covers_same_area_as_tile_scheduler() {
        let full = region(0, 0, 64, 48);
        let mut spiral = SpiralGridScheduler::new(full, 16, 4);
        let mut covered = 0i64;
        while let Some(unit) = spiral.dispatch() {
            covered += area(unit.region);
            spiral.submit(unit.region, 0.0);
        }
        assert_eq!(covered, 64 * 48);
    }

    #[test]
    fn spiral_scheduler_starts_near_the_center() {
        let full = region(0, 0, 48, 48);
        let mut spiral = SpiralGridScheduler::new(full, 16, 4);
        let first = spiral.dispatch().unwrap().region;
        // A 3x3 tile grid's center cell is tile (1, 1), i.e. [16, 32).
        assert_eq!(first, region(16, 16, 32, 32));
    }
}
