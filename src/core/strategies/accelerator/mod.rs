pub mod host_kernel;
pub mod kernel;
pub mod marshal;
pub mod offload;
#[cfg(feature = "gpu")]
pub mod wgpu_kernel;
