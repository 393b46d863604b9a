pub mod backend;
pub mod context;
pub mod controller;
pub mod run_state;

pub use backend::GenerationBackend;
pub use context::assemble_context;
pub use controller::PipelineController;
pub use run_state::{PipelineState, RunState};
