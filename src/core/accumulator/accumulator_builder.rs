use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::core::accumulator::accumulator::Accumulator;
use crate::core::accumulator::errors::AccumulatorError;
use crate::core::data::affine_transformation::AffineTransformation;
use crate::core::data::point::Point;
use crate::core::data::viewport::Viewport;

/// Colour indices are summed in fixed point so concurrent writers can use
/// plain atomic adds. 2^24 keeps ~6e-8 precision and leaves room for 2^40
/// hits per cell.
pub const COLOR_FIXED_POINT_SCALE: f64 = (1u64 << 24) as f64;

/// Most hits a single cell can take before its colour sum leaves the
/// fixed-point range.
pub const MAX_CELL_HITS: u64 = u64::MAX / (1u64 << 24);

/// Scratch histogram for one compute run.
///
/// Shared by every worker of a run. Cells are updated with relaxed atomic
/// adds; there is no grid-wide lock.
#[derive(Debug)]
pub struct AccumulatorBuilder {
    viewport: Viewport,
    width: usize,
    height: usize,
    to_grid: AffineTransformation,
    hits: Vec<AtomicU64>,
    color_sums: Vec<AtomicU64>,
}

impl AccumulatorBuilder {
    pub fn new(viewport: Viewport, width: usize, height: usize) -> Result<Self, AccumulatorError> {
        if width == 0 || height == 0 {
            return Err(AccumulatorError::InvalidSize { width, height });
        }

        let cells = width
            .checked_mul(height)
            .filter(|cells| *cells <= isize::MAX as usize / size_of::<AtomicU64>())
            .ok_or(AccumulatorError::GridTooLarge { width, height })?;

        let to_grid = AffineTransformation::scaling(
            width as f64 / viewport.width(),
            height as f64 / viewport.height(),
        )
        .compose_with(&AffineTransformation::translation(
            -viewport.left(),
            -viewport.bottom(),
        ));

        Ok(Self {
            viewport,
            width,
            height,
            to_grid,
            hits: (0..cells).map(|_| AtomicU64::new(0)).collect(),
            color_sums: (0..cells).map(|_| AtomicU64::new(0)).collect(),
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// The plane-to-grid map; row 0 is the bottom of the viewport.
    #[must_use]
    pub fn to_grid(&self) -> AffineTransformation {
        self.to_grid
    }

    /// Grid offset of the cell containing `p`, `None` outside the grid.
    #[must_use]
    pub fn cell_offset(&self, p: Point) -> Option<usize> {
        let g = self.to_grid.transform_point(p);

        // Negated comparisons also reject NaN
        if !(g.x >= 0.0 && g.x < self.width as f64 && g.y >= 0.0 && g.y < self.height as f64) {
            return None;
        }

        Some(g.y as usize * self.width + g.x as usize)
    }

    /// Snapshot of the hits recorded so far.
    #[must_use]
    pub fn total_hits(&self) -> u64 {
        self.hits
            .iter()
            .map(|h| h.load(Ordering::Relaxed))
            .sum()
    }

    /// Records a hit; points outside the viewport are dropped.
    pub fn hit(&self, p: Point, color_index: f64) {
        if let Some(offset) = self.cell_offset(p) {
            self.hits[offset].fetch_add(1, Ordering::Relaxed);
            self.color_sums[offset].fetch_add(to_fixed_point(color_index), Ordering::Relaxed);
        }
    }

    /// Folds externally accumulated counts into a cell.
    pub fn merge_cell(&self, offset: usize, hits: u64, color_sum: f64) {
        if offset < self.hits.len() && hits > 0 {
            self.hits[offset].fetch_add(hits, Ordering::Relaxed);
            self.color_sums[offset].fetch_add(to_fixed_point(color_sum), Ordering::Relaxed);
        }
    }

    /// Folds whole per-cell hit and colour-sum buffers into the grid.
    pub fn merge_grid(&self, hits: &[u64], color_sums: &[f64]) -> Result<(), AccumulatorError> {
        let expected = self.hits.len();
        for actual in [hits.len(), color_sums.len()] {
            if actual != expected {
                return Err(AccumulatorError::ReadbackSizeMismatch { expected, actual });
            }
        }

        hits.par_iter()
            .zip(color_sums.par_iter())
            .enumerate()
            .for_each(|(offset, (h, c))| self.merge_cell(offset, *h, *c));

        Ok(())
    }

    pub fn build(self) -> Accumulator {
        let hits: Vec<u64> = self.hits.into_par_iter().map(AtomicU64::into_inner).collect();
        let color_indices: Vec<f64> = self
            .color_sums
            .into_par_iter()
            .zip(hits.par_iter())
            .map(|(sum, h)| {
                if *h == 0 {
                    0.0
                } else {
                    sum.into_inner() as f64 / COLOR_FIXED_POINT_SCALE / *h as f64
                }
            })
            .collect();

        Accumulator::new(self.width, self.height, hits, color_indices)
    }
}

fn to_fixed_point(color: f64) -> u64 {
    if color.is_nan() || color <= 0.0 {
        0
    } else {
        (color * COLOR_FIXED_POINT_SCALE).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn centered(width: f64, height: f64) -> Viewport {
        Viewport::new(Point::ORIGIN, width, height).unwrap()
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert_eq!(
            AccumulatorBuilder::new(centered(2.0, 2.0), 0, 10).err(),
            Some(AccumulatorError::InvalidSize { width: 0, height: 10 })
        );
    }

    #[test]
    fn test_rejects_overflowing_grid() {
        assert_eq!(
            AccumulatorBuilder::new(centered(2.0, 2.0), usize::MAX, 2).err(),
            Some(AccumulatorError::GridTooLarge {
                width: usize::MAX,
                height: 2
            })
        );
    }

    #[test]
    fn test_origin_maps_to_center_cell() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 10, 10).unwrap();

        assert_eq!(builder.cell_offset(Point::ORIGIN), Some(5 * 10 + 5));
    }

    #[test]
    fn test_bottom_left_corner_is_cell_zero() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 10, 10).unwrap();

        assert_eq!(builder.cell_offset(Point::new(-1.0, -1.0)), Some(0));
    }

    #[test]
    fn test_right_and_top_edges_are_outside() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 10, 10).unwrap();

        assert_eq!(builder.cell_offset(Point::new(1.0, 0.0)), None);
        assert_eq!(builder.cell_offset(Point::new(0.0, 1.0)), None);
        assert_eq!(builder.cell_offset(Point::new(0.0, -1.5)), None);
        assert_eq!(builder.cell_offset(Point::new(f64::NAN, 0.0)), None);
    }

    #[test]
    fn test_row_zero_is_viewport_bottom() {
        let builder = AccumulatorBuilder::new(centered(4.0, 2.0), 4, 2).unwrap();

        builder.hit(Point::new(-1.5, -0.5), 0.0);
        let accumulator = builder.build();

        assert_eq!(accumulator.hits(0, 0), Ok(1));
        assert_eq!(accumulator.hits(0, 1), Ok(0));
    }

    #[test]
    fn test_out_of_bounds_hits_are_dropped() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 4, 4).unwrap();

        builder.hit(Point::new(5.0, 5.0), 0.5);
        builder.hit(Point::new(-5.0, 0.0), 0.5);

        assert_eq!(builder.build().total_hits(), 0);
    }

    #[test]
    fn test_color_index_is_mean_of_hits() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 2, 2).unwrap();

        builder.hit(Point::new(0.5, 0.5), 0.25);
        builder.hit(Point::new(0.5, 0.5), 0.75);
        let accumulator = builder.build();

        assert_eq!(accumulator.hits(1, 1), Ok(2));
        assert!((accumulator.color_index(1, 1).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(accumulator.color_index(0, 0), Ok(0.0));
    }

    #[test]
    fn test_concurrent_hits_are_all_counted() {
        let builder = Arc::new(AccumulatorBuilder::new(centered(2.0, 2.0), 8, 8).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let builder = Arc::clone(&builder);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        builder.hit(Point::new(0.1, 0.1), 1.0);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let accumulator = Arc::try_unwrap(builder).unwrap().build();
        assert_eq!(accumulator.total_hits(), 40_000);
        assert_eq!(accumulator.max_hit(), 40_000);
    }

    #[test]
    fn test_merge_grid_folds_readback() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 2, 1).unwrap();
        builder.hit(Point::new(-0.5, 0.0), 1.0);

        builder.merge_grid(&[3, 0], &[0.0, 0.0]).unwrap();
        let accumulator = builder.build();

        assert_eq!(accumulator.hits(0, 0), Ok(4));
        assert!((accumulator.color_index(0, 0).unwrap() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_cell_counts_past_u32_range() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 2, 2).unwrap();
        let crowded = u64::from(u32::MAX);

        builder.merge_cell(3, crowded, 0.5 * crowded as f64);
        builder.hit(Point::new(0.5, 0.5), 0.5);
        builder.hit(Point::new(-0.5, -0.5), 0.5);
        let accumulator = builder.build();

        assert_eq!(accumulator.hits(1, 1), Ok(crowded + 1));
        assert_eq!(accumulator.max_hit(), crowded + 1);
        assert_eq!(accumulator.brightest_cell(), Some((1, 1)));
        assert_eq!(accumulator.intensity(1, 1), Ok(1.0));
        assert!(accumulator.intensity(0, 0).unwrap() < 0.05);
        assert!((accumulator.color_index(1, 1).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_merge_grid_rejects_wrong_size() {
        let builder = AccumulatorBuilder::new(centered(2.0, 2.0), 2, 2).unwrap();

        assert_eq!(
            builder.merge_grid(&[0; 3], &[0.0; 4]),
            Err(AccumulatorError::ReadbackSizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }
}
