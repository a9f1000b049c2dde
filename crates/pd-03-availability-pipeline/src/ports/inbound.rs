use crate::domain::PipelineError;
use shared_types::NodeAvailability;

/// Non-blocking intake used by request handlers.
///
/// Implementations must return immediately; persistence happens later and
/// its outcome is never reported back to the caller.
pub trait AvailabilityRecorder: Send + Sync {
    fn enqueue(&self, record: NodeAvailability) -> Result<(), PipelineError>;
}
