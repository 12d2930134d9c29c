pub mod errors;
pub mod fetch;
pub mod pipeline;
pub mod sync;
pub mod timezone;

pub use errors::{PipelineError, PipelineResult};
