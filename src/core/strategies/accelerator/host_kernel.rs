use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::data::affine_transformation::AffineTransformation;
use crate::core::data::point::Point;
use crate::core::flame::flame_transformation::FlameTransformation;
use crate::core::flame::variation::VARIATION_COUNT;
use crate::core::strategies::accelerator::kernel::{
    ComputeKernel, KernelError, KernelProvider, KernelReadback,
};
use crate::core::strategies::accelerator::marshal::{AFFINE_STRIDE, KernelJob};

/// Runs the lane walks on the host CPU.
///
/// Reads only the marshaled buffers, so it doubles as a reference for
/// device kernels and for checking the marshaling itself.
#[derive(Debug, Clone, Copy)]
pub struct HostKernelProvider {
    available: bool,
}

impl HostKernelProvider {
    #[must_use]
    pub fn new() -> Self {
        Self { available: true }
    }

    /// A provider that never reports itself available.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl Default for HostKernelProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelProvider for HostKernelProvider {
    fn name(&self) -> &str {
        "host"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn create_kernel(&self) -> Result<Box<dyn ComputeKernel>, KernelError> {
        if !self.available {
            return Err(KernelError::Unavailable("host kernel disabled".to_string()));
        }

        Ok(Box::new(HostKernel::default()))
    }
}

#[derive(Debug)]
struct Lane {
    point: Point,
    color_index: f64,
    rng: StdRng,
    warmed_up: bool,
}

#[derive(Debug, Default)]
pub struct HostKernel {
    transformations: Vec<FlameTransformation>,
    color_indices: Vec<f64>,
    grid_transform: AffineTransformation,
    width: usize,
    height: usize,
    warmup_iterations: u32,
    lanes: Vec<Lane>,
    hits: Vec<u64>,
    color_sums: Vec<f64>,
}

impl HostKernel {
    fn step(&mut self, lane: usize) -> Point {
        let state = &mut self.lanes[lane];
        let i = state.rng.gen_range(0..self.transformations.len());

        state.point = self.transformations[i].transform_point(state.point);
        state.color_index = (state.color_index + self.color_indices[i]) / 2.0;
        state.point
    }
}

fn expect_len<T>(buffer: &[T], expected: usize, name: &str) -> Result<(), KernelError> {
    if buffer.len() != expected {
        return Err(KernelError::Upload(format!(
            "{name} buffer holds {} values, expected {expected}",
            buffer.len()
        )));
    }
    Ok(())
}

impl ComputeKernel for HostKernel {
    fn upload(&mut self, job: &KernelJob) -> Result<(), KernelError> {
        let count = job.transformation_count as usize;
        if count == 0 {
            return Err(KernelError::Upload("no transformations".to_string()));
        }
        expect_len(&job.affine, count * AFFINE_STRIDE, "affine")?;
        expect_len(&job.weights, count * VARIATION_COUNT, "weight")?;
        expect_len(&job.color_indices, count, "colour index")?;
        expect_len(&job.seeds, job.lanes as usize, "seed")?;

        self.transformations = job
            .affine
            .chunks_exact(AFFINE_STRIDE)
            .zip(job.weights.chunks_exact(VARIATION_COUNT))
            .map(|(a, w)| {
                let affine = AffineTransformation::new(
                    f64::from(a[0]),
                    f64::from(a[1]),
                    f64::from(a[2]),
                    f64::from(a[3]),
                    f64::from(a[4]),
                    f64::from(a[5]),
                );
                let weights: Vec<f64> = w.iter().map(|w| f64::from(*w)).collect();
                FlameTransformation::new(affine, &weights)
                    .map_err(|e| KernelError::Upload(e.to_string()))
            })
            .collect::<Result<_, _>>()?;

        let g = job.grid_transform.map(f64::from);
        self.grid_transform = AffineTransformation::new(g[0], g[1], g[2], g[3], g[4], g[5]);
        self.color_indices = job.color_indices.iter().map(|c| f64::from(*c)).collect();
        self.width = job.width as usize;
        self.height = job.height as usize;
        self.warmup_iterations = job.warmup_iterations;
        self.lanes = job
            .seeds
            .iter()
            .map(|seed| Lane {
                point: Point::ORIGIN,
                color_index: 0.0,
                rng: StdRng::seed_from_u64(u64::from(*seed)),
                warmed_up: false,
            })
            .collect();
        self.hits = vec![0; job.cell_count()];
        self.color_sums = vec![0.0; job.cell_count()];

        Ok(())
    }

    fn dispatch_wave(&mut self, wave: u64, iterations_per_lane: u32) -> Result<(), KernelError> {
        if self.transformations.is_empty() {
            return Err(KernelError::Dispatch {
                wave,
                message: "no job uploaded".to_string(),
            });
        }

        for lane in 0..self.lanes.len() {
            if !self.lanes[lane].warmed_up {
                for _ in 0..self.warmup_iterations {
                    self.step(lane);
                }
                self.lanes[lane].warmed_up = true;
            }

            for _ in 0..iterations_per_lane {
                let p = self.step(lane);
                let g = self.grid_transform.transform_point(p);

                if g.x >= 0.0 && g.x < self.width as f64 && g.y >= 0.0 && g.y < self.height as f64 {
                    let offset = g.y as usize * self.width + g.x as usize;
                    self.hits[offset] += 1;
                    self.color_sums[offset] += self.lanes[lane].color_index;
                }
            }
        }

        Ok(())
    }

    fn download(&mut self) -> Result<KernelReadback, KernelError> {
        Ok(KernelReadback {
            hits: self.hits.clone(),
            color_sums: self.color_sums.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(lanes: u32) -> KernelJob {
        KernelJob {
            affine: vec![0.5, 0.0, 0.0, 0.0, 0.5, 0.0],
            weights: vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            color_indices: vec![0.0],
            grid_transform: [2.0, 0.0, 1.0, 0.0, 2.0, 1.0],
            transformation_count: 1,
            width: 2,
            height: 2,
            lanes,
            warmup_iterations: 20,
            seeds: (0..lanes).collect(),
        }
    }

    #[test]
    fn test_unavailable_provider_refuses_kernels() {
        let provider = HostKernelProvider::unavailable();

        assert!(!provider.is_available());
        assert!(matches!(
            provider.create_kernel(),
            Err(KernelError::Unavailable(_))
        ));
    }

    #[test]
    fn test_dispatch_before_upload_fails() {
        let mut kernel = HostKernel::default();

        assert!(matches!(
            kernel.dispatch_wave(0, 1),
            Err(KernelError::Dispatch { wave: 0, .. })
        ));
    }

    #[test]
    fn test_upload_rejects_short_buffers() {
        let mut short = job(2);
        short.seeds.pop();

        assert!(matches!(
            HostKernel::default().upload(&short),
            Err(KernelError::Upload(_))
        ));
    }

    #[test]
    fn test_contracting_walk_accumulates_every_iteration() {
        // Points collapse onto the origin, which maps to cell (1, 1)
        let mut kernel = HostKernel::default();
        kernel.upload(&job(3)).unwrap();

        kernel.dispatch_wave(0, 10).unwrap();
        kernel.dispatch_wave(1, 5).unwrap();
        let readback = kernel.download().unwrap();

        assert_eq!(readback.hits, vec![0, 0, 0, 45]);
        assert_eq!(readback.color_sums, vec![0.0; 4]);
    }
}
