use tracing::{debug, trace};

use crate::core::accumulator::accumulator_builder::AccumulatorBuilder;
use crate::core::actions::cancellation::CancelToken;
use crate::core::actions::chaos_game::progress::ProgressReporter;
use crate::core::flame::flame::Flame;
use crate::core::strategies::accelerator::kernel::KernelProvider;
use crate::core::strategies::accelerator::marshal::{KernelJob, WavePlan};
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::errors::RunError;

/// Drives a kernel wave by wave and folds its readback into `builder`.
///
/// Cancellation is checked between waves. Whatever the kernel accumulated
/// is read back and merged on abort as well as on completion.
pub fn run_offload(
    provider: &dyn KernelProvider,
    flame: &Flame,
    builder: &AccumulatorBuilder,
    iterations: u64,
    config: &ComputeConfig,
    cancel: &dyn CancelToken,
    progress_sink: &(dyn Fn(u8) + Sync),
) -> Result<(), RunError> {
    let plan = WavePlan::new(iterations, config.accelerator_lanes(), config.wave_iterations());
    let reporter = ProgressReporter::new(1, config.progress_steps(), progress_sink);
    let mut progress = reporter.worker(0, plan.waves());

    if plan.waves() == 0 {
        progress.finish();
        return Ok(());
    }

    let job = KernelJob::marshal(
        flame,
        builder.to_grid(),
        builder.width(),
        builder.height(),
        plan.lanes(),
        config.warmup_iterations(),
        config.seed(),
    )?;

    let mut kernel = provider.create_kernel()?;
    kernel.upload(&job)?;

    debug!(
        provider = provider.name(),
        lanes = plan.lanes(),
        waves = plan.waves(),
        "offloading chaos game"
    );

    let mut outcome = Ok(());
    for wave in 0..plan.waves() {
        if let Err(cancelled) = cancel.check() {
            outcome = Err(cancelled);
            break;
        }

        let iterations_per_lane = plan.iterations_in_wave(wave);
        trace!(wave, iterations_per_lane, "dispatching wave");
        kernel.dispatch_wave(wave, iterations_per_lane)?;
        progress.update(wave + 1);
    }

    let readback = kernel.download()?;
    builder.merge_grid(&readback.hits, &readback.color_sums)?;

    outcome?;
    progress.finish();
    Ok(())
}
