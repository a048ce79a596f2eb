//! GPU kernel provider backed by `wgpu`.
//!
//! The WGSL program is supplied by the caller and must expose a
//! `@compute` entry point named `main` with a workgroup size of
//! [`WORKGROUP_SIZE`] and this bind group 0 layout:
//!
//! | binding | type                         | contents                                   |
//! |---------|------------------------------|--------------------------------------------|
//! | 0       | uniform `WaveParams`         | grid transform, sizes, wave counters        |
//! | 1       | storage, read                | `TRANSFORM_STRIDE` f32 per transformation   |
//! | 2       | storage, read_write          | 4 u32 per lane: rng state, x, y, colour     |
//! | 3       | storage, read_write atomic   | hit count per cell, `(low, high)` u32 pair  |
//! | 4       | storage, read_write atomic   | colour sum per cell, `(low, high)` u32 pair |
//!
//! Both per-cell counters are 64-bit values split into two words: the kernel
//! adds to the low word and carries into the high word when the add wraps.
//! Colour sums are fixed point at [`COLOR_FIXED_POINT_SCALE`], so each hit
//! adds `round(colour_index * 2^24)`.
//!
//! Lanes start with a nonzero xorshift state and the point at the origin.
//! The kernel runs the warm-up during wave 0.

use std::sync::OnceLock;
use std::sync::mpsc;

use bytemuck::{Pod, Zeroable};
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::core::accumulator::accumulator_builder::COLOR_FIXED_POINT_SCALE;
use crate::core::flame::variation::VARIATION_COUNT;
use crate::core::strategies::accelerator::kernel::{
    ComputeKernel, KernelError, KernelProvider, KernelReadback,
};
use crate::core::strategies::accelerator::marshal::{AFFINE_STRIDE, KernelJob};

pub const WORKGROUP_SIZE: u32 = 64;
/// Affine coefficients, variation weights, then the colour index.
pub const TRANSFORM_STRIDE: usize = AFFINE_STRIDE + VARIATION_COUNT + 1;
const LANE_STRIDE: usize = 4;
/// u32 words per 64-bit cell counter.
const CELL_WORDS: usize = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct WaveParams {
    grid_a: f32,
    grid_b: f32,
    grid_c: f32,
    grid_d: f32,
    grid_e: f32,
    grid_f: f32,
    width: u32,
    height: u32,
    transformation_count: u32,
    lanes: u32,
    warmup_iterations: u32,
    iterations_per_lane: u32,
    wave: u32,
    _padding: [u32; 3],
}

#[derive(Debug)]
pub struct WgpuKernelProvider {
    shader_source: String,
    available: OnceLock<bool>,
}

impl WgpuKernelProvider {
    #[must_use]
    pub fn new(shader_source: impl Into<String>) -> Self {
        Self {
            shader_source: shader_source.into(),
            available: OnceLock::new(),
        }
    }
}

fn request_adapter() -> Option<wgpu::Adapter> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
}

impl KernelProvider for WgpuKernelProvider {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let found = request_adapter();
            if let Some(adapter) = &found {
                debug!(adapter = %adapter.get_info().name, "found compute adapter");
            }
            found.is_some()
        })
    }

    fn create_kernel(&self) -> Result<Box<dyn ComputeKernel>, KernelError> {
        let adapter = request_adapter()
            .ok_or_else(|| KernelError::Unavailable("no wgpu adapter".to_string()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Flame Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| KernelError::Unavailable(e.to_string()))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Flame Shader"),
            source: wgpu::ShaderSource::Wgsl(self.shader_source.as_str().into()),
        });

        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Flame Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, false),
                storage(3, false),
                storage(4, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Flame Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Flame Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        Ok(Box::new(WgpuKernel {
            device,
            queue,
            pipeline,
            bind_group_layout,
            session: None,
        }))
    }
}

struct Session {
    params: WaveParams,
    params_buffer: wgpu::Buffer,
    hits_buffer: wgpu::Buffer,
    colors_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    cells: usize,
}

pub struct WgpuKernel {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    session: Option<Session>,
}

impl WgpuKernel {
    /// Reads a buffer of `(low, high)` word pairs back as 64-bit values.
    fn read_counters(&self, source: &wgpu::Buffer, cells: usize) -> Result<Vec<u64>, KernelError> {
        let size = (cells * CELL_WORDS * size_of::<u32>()) as u64;
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Flame Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Flame Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        let _ = self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|e| KernelError::Download(e.to_string()))?
            .map_err(|e| KernelError::Download(e.to_string()))?;

        let data = slice.get_mapped_range();
        let values: Vec<u64> = bytemuck::cast_slice::<u8, u32>(&data)
            .chunks_exact(CELL_WORDS)
            .map(|pair| u64::from(pair[0]) | (u64::from(pair[1]) << 32))
            .collect();
        drop(data);
        staging.unmap();

        Ok(values)
    }
}

impl ComputeKernel for WgpuKernel {
    fn upload(&mut self, job: &KernelJob) -> Result<(), KernelError> {
        let count = job.transformation_count as usize;
        let mut transforms = Vec::with_capacity(count * TRANSFORM_STRIDE);
        for i in 0..count {
            transforms.extend_from_slice(&job.affine[i * AFFINE_STRIDE..(i + 1) * AFFINE_STRIDE]);
            transforms.extend_from_slice(&job.weights[i * VARIATION_COUNT..(i + 1) * VARIATION_COUNT]);
            transforms.push(job.color_indices[i]);
        }

        let lanes: Vec<u32> = job
            .seeds
            .iter()
            .flat_map(|seed| [(*seed).max(1), 0, 0, 0])
            .collect();
        debug_assert_eq!(lanes.len(), job.lanes as usize * LANE_STRIDE);

        let cells = job.cell_count();
        let g = job.grid_transform;
        let params = WaveParams {
            grid_a: g[0],
            grid_b: g[1],
            grid_c: g[2],
            grid_d: g[3],
            grid_e: g[4],
            grid_f: g[5],
            width: job.width,
            height: job.height,
            transformation_count: job.transformation_count,
            lanes: job.lanes,
            warmup_iterations: job.warmup_iterations,
            iterations_per_lane: 0,
            wave: 0,
            _padding: [0; 3],
        };

        let init = |label, contents: &[u8], usage| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };
        let params_buffer = init(
            "Flame Params Buffer",
            bytemuck::bytes_of(&params),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let transforms_buffer = init(
            "Flame Transforms Buffer",
            bytemuck::cast_slice(&transforms),
            wgpu::BufferUsages::STORAGE,
        );
        let lanes_buffer = init(
            "Flame Lanes Buffer",
            bytemuck::cast_slice(&lanes),
            wgpu::BufferUsages::STORAGE,
        );
        let zeroes = vec![0u32; cells * CELL_WORDS];
        let hits_buffer = init(
            "Flame Hits Buffer",
            bytemuck::cast_slice(&zeroes),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let colors_buffer = init(
            "Flame Colour Buffer",
            bytemuck::cast_slice(&zeroes),
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Flame Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: transforms_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: lanes_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: hits_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: colors_buffer.as_entire_binding(),
                },
            ],
        });

        self.session = Some(Session {
            params,
            params_buffer,
            hits_buffer,
            colors_buffer,
            bind_group,
            cells,
        });

        Ok(())
    }

    fn dispatch_wave(&mut self, wave: u64, iterations_per_lane: u32) -> Result<(), KernelError> {
        let session = self.session.as_mut().ok_or_else(|| KernelError::Dispatch {
            wave,
            message: "no job uploaded".to_string(),
        })?;

        session.params.wave = u32::try_from(wave).map_err(|_| KernelError::Dispatch {
            wave,
            message: "wave index exceeds u32".to_string(),
        })?;
        session.params.iterations_per_lane = iterations_per_lane;
        self.queue
            .write_buffer(&session.params_buffer, 0, bytemuck::bytes_of(&session.params));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Flame Wave Encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Flame Wave Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &session.bind_group, &[]);
            compute_pass.dispatch_workgroups(session.params.lanes.div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        Ok(())
    }

    fn download(&mut self) -> Result<KernelReadback, KernelError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| KernelError::Download("no job uploaded".to_string()))?;

        let hits = self.read_counters(&session.hits_buffer, session.cells)?;
        let color_sums = self
            .read_counters(&session.colors_buffer, session.cells)?
            .into_iter()
            .map(|fixed| fixed as f64 / COLOR_FIXED_POINT_SCALE)
            .collect();

        Ok(KernelReadback { hits, color_sums })
    }
}
