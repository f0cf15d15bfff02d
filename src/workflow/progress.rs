//! Stage progress reporting, decoupled from any toolkit.
//!
//! The orchestrator narrates the run through [`Notice`] values; the host
//! decides how to show them (status label, toast, log line).

/// Stages of the screenshot-to-URL workflow, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Capture,
    Analysis,
    Rename,
    Upload,
    Clipboard,
}

impl WorkflowStage {
    /// Human-readable status line for the host to display.
    pub fn message(&self) -> &'static str {
        match self {
            WorkflowStage::Capture => "Capturing screenshot...",
            WorkflowStage::Analysis => "Analyzing image content...",
            WorkflowStage::Rename => "Renaming file from description...",
            WorkflowStage::Upload => "Uploading image to ImageKit...",
            WorkflowStage::Clipboard => "Copying URL to clipboard...",
        }
    }
}

/// A status update pushed to the host during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Stage(WorkflowStage),
    Success(String),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_has_a_message() {
        for stage in [
            WorkflowStage::Capture,
            WorkflowStage::Analysis,
            WorkflowStage::Rename,
            WorkflowStage::Upload,
            WorkflowStage::Clipboard,
        ] {
            assert!(!stage.message().is_empty());
        }
    }
}
