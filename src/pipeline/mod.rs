pub mod orchestrator;
pub mod state;

pub use orchestrator::{PipelineSettings, ReportPipeline};
pub use state::{Invocation, InvocationState};
