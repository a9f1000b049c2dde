pub mod availability_sink;

pub use availability_sink::StoreAvailabilitySink;
