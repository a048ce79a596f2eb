use crate::controllers::compute::events::compute_event::ComputeEvent;

/// Receives events from compute runs, on the threads doing the work.
pub trait ComputeListener: Send + Sync {
    fn on_event(&self, event: ComputeEvent);
}
