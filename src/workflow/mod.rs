//! Capture-and-upload workflow — public API.
//!
//! The orchestrator sequences Select → Capture → (Preview?) → Upload →
//! Clipboard over ports supplied by the host shell. External code should
//! only use the types exported here.

mod orchestrator;
mod progress;
mod state;

pub use orchestrator::{HostUi, Orchestrator, PreviewDecision, WorkflowOutcome};
pub use progress::{Notice, WorkflowStage};
pub use state::WorkflowState;
