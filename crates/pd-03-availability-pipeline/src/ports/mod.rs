pub mod inbound;
pub mod outbound;

pub use inbound::AvailabilityRecorder;
pub use outbound::AvailabilitySink;
