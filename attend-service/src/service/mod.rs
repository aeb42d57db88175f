pub mod metrics;
pub mod reporter;
pub mod scheduler;
pub mod shutdown;
