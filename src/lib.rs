//! snapkit — screenshot capture-and-upload workflow core.
//!
//! This crate is the toolkit-agnostic heart of a screenshot-to-ImageKit
//! utility:
//! - Credential configuration, sealed at rest (config/)
//! - Screen capture domain: region geometry + monitor grab (capture/)
//! - ImageKit upload over multipart HTTP (upload/)
//! - Clipboard publishing (clipboard)
//! - Optional AI filename suggestion (naming)
//! - The workflow orchestrator tying them together (workflow/)
//!
//! A GUI shell drives [`workflow::Orchestrator`] through the
//! [`workflow::HostUi`] port; everything OS-facing (grab, clipboard,
//! keyring, HTTP) ships with a production implementation behind a trait so
//! the workflow is testable end to end.

pub mod capture;
pub mod clipboard;
pub mod config;
pub mod naming;
pub mod upload;
pub mod workflow;

pub use capture::{CaptureMode, CaptureRequest, CapturedImage, Capturer, Region, ScreenCapturer};
pub use clipboard::{ClipboardPublisher, SystemClipboard};
pub use config::{CredentialSource, CredentialStore, Credentials};
pub use upload::{ImageKitUploader, UploadError, UploadResult, Uploader};
pub use workflow::{
    HostUi, Notice, Orchestrator, PreviewDecision, WorkflowOutcome, WorkflowStage, WorkflowState,
};
