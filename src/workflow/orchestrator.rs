//! Workflow orchestrator — drives one capture-and-upload run.
//!
//! Select → Capture → (Name?) → (Preview?) → Upload → Clipboard, with user
//! cancellation and error reporting at each step. The orchestrator owns the
//! in-flight image; running through `&mut self` means a second run cannot
//! start while one is outstanding.

use super::progress::{Notice, WorkflowStage};
use super::state::WorkflowState;
use crate::capture::{CaptureMode, CaptureRequest, CapturedImage, Capturer, Region};
use crate::clipboard::ClipboardPublisher;
use crate::config::{CredentialSource, Credentials};
use crate::naming::{timestamp_name, Namer};
use crate::upload::{UploadError, UploadResult, Uploader};

/// The user's verdict on the preview dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewDecision {
    Upload,
    Cancel,
}

/// Everything the GUI shell provides to a run: the selection overlay, the
/// preview dialog, window visibility, and status display. Keeping these
/// behind one port keeps the workflow free of any toolkit.
pub trait HostUi {
    /// Run the interactive region selection. `None` means the user aborted.
    fn select_region(&mut self) -> Option<Region>;

    /// Show the preview gate and wait for the user's verdict.
    fn confirm_preview(&mut self, image: &CapturedImage) -> PreviewDecision;

    /// Hide the host window so it stays out of the shot.
    fn hide(&mut self);

    /// Bring the host window back.
    fn restore(&mut self);

    /// Display a status update, success, or error to the user.
    fn notify(&mut self, notice: Notice);
}

/// How a run ended.
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// Upload succeeded; the URL was handed to the clipboard.
    Uploaded(UploadResult),
    /// Upload failed; the captured image is retained for
    /// [`Orchestrator::retry_upload`].
    Failed(UploadError),
    /// The user backed out before the uploader ran.
    Cancelled,
    /// Credentials are incomplete; the run never left `Idle`.
    NotConfigured,
}

/// A failed upload's payload, kept so the user can retry without
/// recapturing.
struct PendingUpload {
    image: CapturedImage,
    file_name: String,
}

/// Hides the host window and guarantees exactly one restore on every exit
/// path, whether the grab succeeds, fails, or unwinds.
struct VisibilityGuard<'a, H: HostUi> {
    host: &'a mut H,
}

impl<'a, H: HostUi> VisibilityGuard<'a, H> {
    fn hide(host: &'a mut H) -> Self {
        host.hide();
        Self { host }
    }
}

impl<H: HostUi> Drop for VisibilityGuard<'_, H> {
    fn drop(&mut self) {
        self.host.restore();
    }
}

pub struct Orchestrator<H, C, U, P, S> {
    host: H,
    capturer: C,
    uploader: U,
    clipboard: P,
    credentials: S,
    namer: Option<Box<dyn Namer + Send + Sync>>,
    state: WorkflowState,
    pending: Option<PendingUpload>,
}

impl<H, C, U, P, S> Orchestrator<H, C, U, P, S>
where
    H: HostUi,
    C: Capturer,
    U: Uploader,
    P: ClipboardPublisher,
    S: CredentialSource,
{
    pub fn new(host: H, capturer: C, uploader: U, clipboard: P, credentials: S) -> Self {
        Self {
            host,
            capturer,
            uploader,
            clipboard,
            credentials,
            namer: None,
            state: WorkflowState::Idle,
            pending: None,
        }
    }

    /// Attach a filename namer for the optional analysis stage.
    pub fn with_namer(mut self, namer: impl Namer + Send + Sync + 'static) -> Self {
        self.namer = Some(Box::new(namer));
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// A failed upload left an image behind.
    pub fn has_pending_upload(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the image retained by a failed upload.
    pub fn discard_pending(&mut self) {
        if self.pending.take().is_some() {
            log::info!("[WORKFLOW] Pending upload discarded");
        }
    }

    /// Drive one capture-and-upload run to a terminal state.
    pub async fn run(&mut self, request: CaptureRequest) -> WorkflowOutcome {
        self.state = WorkflowState::Idle;
        log::info!(
            "[WORKFLOW] Run started: mode={:?} direct_upload={} ai_naming={}",
            request.mode,
            request.direct_upload,
            request.ai_naming
        );

        // Credentials are read once per upload and passed explicitly.
        let credentials = self.credentials.load();
        if !credentials.is_complete() {
            log::warn!("[WORKFLOW] Credentials not configured — run refused");
            self.host.notify(Notice::Error(
                "ImageKit is not configured. Set credentials first.".into(),
            ));
            return WorkflowOutcome::NotConfigured;
        }

        self.set_state(WorkflowState::Selecting);
        let region = match request.mode {
            CaptureMode::Area => match self.host.select_region() {
                Some(region) if !region.is_empty() => Some(region),
                Some(_) => {
                    log::info!("[WORKFLOW] Zero-area selection, treating as abort");
                    return self.cancel();
                }
                None => {
                    log::info!("[WORKFLOW] Selection aborted by user");
                    return self.cancel();
                }
            },
            CaptureMode::FullScreen => None,
        };

        self.set_state(WorkflowState::Capturing);
        self.host.notify(Notice::Stage(WorkflowStage::Capture));

        // The host window stays out of the shot; the guard restores it
        // exactly once whatever the grab does.
        let grabbed = {
            let _visibility = VisibilityGuard::hide(&mut self.host);
            self.capturer.capture(region.as_ref())
        };

        let image = match grabbed {
            Ok(image) => image,
            Err(e) => {
                // A capture-source failure is treated like a user abort,
                // not a fault (the selection overlay or grab went away).
                log::warn!("[WORKFLOW] Capture failed, treating as aborted: {e}");
                return self.cancel();
            }
        };
        let (width, height) = image.dimensions();
        log::info!("[WORKFLOW] Captured {width}x{height}");

        let file_name = self.resolve_file_name(&request, &image).await;

        if !request.direct_upload {
            self.set_state(WorkflowState::Previewing);
            match self.host.confirm_preview(&image) {
                PreviewDecision::Upload => {}
                PreviewDecision::Cancel => {
                    log::info!("[WORKFLOW] Preview cancelled, image discarded");
                    return self.cancel();
                }
            }
        }

        self.upload_and_publish(image, file_name, credentials).await
    }

    /// Re-upload the image retained by a failed run, without recapturing.
    /// `None` when there is nothing pending.
    pub async fn retry_upload(&mut self) -> Option<WorkflowOutcome> {
        let PendingUpload { image, file_name } = self.pending.take()?;
        log::info!("[WORKFLOW] Retrying upload of {file_name}");

        let credentials = self.credentials.load();
        if !credentials.is_complete() {
            self.pending = Some(PendingUpload { image, file_name });
            self.host.notify(Notice::Error(
                "ImageKit is not configured. Set credentials first.".into(),
            ));
            return Some(WorkflowOutcome::NotConfigured);
        }

        Some(self.upload_and_publish(image, file_name, credentials).await)
    }

    async fn resolve_file_name(&mut self, request: &CaptureRequest, image: &CapturedImage) -> String {
        let default = timestamp_name();
        if !request.ai_naming {
            return default;
        }
        let Some(namer) = &self.namer else {
            log::debug!("[WORKFLOW] AI naming requested but no namer configured");
            return default;
        };

        self.host.notify(Notice::Stage(WorkflowStage::Analysis));
        match namer.suggest_name(image).await {
            Some(name) => {
                self.host.notify(Notice::Stage(WorkflowStage::Rename));
                name
            }
            None => default,
        }
    }

    async fn upload_and_publish(
        &mut self,
        image: CapturedImage,
        file_name: String,
        credentials: Credentials,
    ) -> WorkflowOutcome {
        self.set_state(WorkflowState::Uploading);
        self.host.notify(Notice::Stage(WorkflowStage::Upload));

        match self.uploader.upload(&image, &file_name, &credentials).await {
            Ok(result) => {
                self.pending = None;
                self.host.notify(Notice::Stage(WorkflowStage::Clipboard));
                match self.clipboard.publish(&result.url) {
                    Ok(()) => self.host.notify(Notice::Success(format!(
                        "Screenshot uploaded — URL copied to clipboard: {}",
                        result.url
                    ))),
                    Err(e) => {
                        log::error!("[WORKFLOW] Clipboard publish failed: {e}");
                        self.host.notify(Notice::Error(format!(
                            "Uploaded to {} but the clipboard write failed: {e}",
                            result.url
                        )));
                    }
                }
                self.set_state(WorkflowState::Done);
                WorkflowOutcome::Uploaded(result)
            }
            Err(e) => {
                log::error!("[WORKFLOW] Upload failed: {e}");
                self.pending = Some(PendingUpload { image, file_name });
                self.host
                    .notify(Notice::Error(format!("Upload failed: {e}")));
                self.set_state(WorkflowState::Done);
                WorkflowOutcome::Failed(e)
            }
        }
    }

    fn cancel(&mut self) -> WorkflowOutcome {
        self.set_state(WorkflowState::Cancelled);
        WorkflowOutcome::Cancelled
    }

    fn set_state(&mut self, next: WorkflowState) {
        log::debug!("[WORKFLOW] {} -> {}", self.state, next);
        self.state = next;
    }
}
