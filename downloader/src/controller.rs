/// Download controller.
///
/// Owns the lifecycle of one download at a time: guard, start, fetch with
/// progress, classify, resolve the filename, persist, and always return to
/// idle. Progress and activity are published on a `watch` channel so a front
/// end can render them without touching the controller.
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, Instrument};

use clipgrab_shared::errors::{ClipgrabResult, DownloadError};
use clipgrab_shared::filename::resolve_filename;
use clipgrab_shared::models::{DownloadRequest, DownloadResult};
use clipgrab_shared::protocol::{classify, ClassifiedResponse};
use clipgrab_shared::state::{TransferEvent, TransferState};

use crate::notify::Notifier;
use crate::persist::Saver;
use crate::transport::Transport;

/// How a call to [`DownloadController::start_download`] ended.
#[derive(Debug)]
pub enum DownloadOutcome {
    Saved(DownloadResult),
    /// The failure has already been reported through the notifier.
    Failed(DownloadError),
    /// Another download was in flight; nothing happened.
    Busy,
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved(_))
    }

    pub fn result(&self) -> Option<&DownloadResult> {
        match self {
            DownloadOutcome::Saved(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            DownloadOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

pub struct DownloadController<T, S, N> {
    transport: T,
    saver: S,
    notifier: N,
    state: watch::Sender<TransferState>,
}

impl<T, S, N> DownloadController<T, S, N>
where
    T: Transport,
    S: Saver,
    N: Notifier,
{
    pub fn new(transport: T, saver: S, notifier: N) -> Self {
        let (state, _) = watch::channel(TransferState::IDLE);
        Self {
            transport,
            saver,
            notifier,
            state,
        }
    }

    /// Receiver for every state change of this controller.
    pub fn subscribe(&self) -> watch::Receiver<TransferState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TransferState {
        *self.state.borrow()
    }

    pub fn is_downloading(&self) -> bool {
        self.state.borrow().is_downloading
    }

    /// Download `file_id` and save it locally.
    ///
    /// Failures are reported through the notifier and never propagate; the
    /// returned outcome is informational. Calling this while a download is
    /// in flight returns [`DownloadOutcome::Busy`] without side effects.
    pub async fn start_download(
        &self,
        file_id: &str,
        suggested_filename: Option<&str>,
    ) -> DownloadOutcome {
        if !try_begin(&self.state) {
            debug!("Ignoring download of {}: another transfer is active", file_id);
            return DownloadOutcome::Busy;
        }
        let _reset = ResetOnDrop(&self.state);

        let request = DownloadRequest::new(file_id, suggested_filename);
        let span = info_span!("download", id = %request.short_id(), file_id = %request.file_id);

        async {
            info!("Download started");
            match self.run(&request).await {
                Ok(result) => {
                    info!(
                        "Saved {} ({} bytes) to {}",
                        result.filename, result.file_size, result.file_path
                    );
                    apply(&self.state, TransferEvent::Succeeded);
                    DownloadOutcome::Saved(result)
                }
                Err(e) => {
                    error!(kind = e.kind(), "Download failed: {}", e);
                    let message = e.user_message();
                    self.notifier.notify_error(&message);
                    apply(&self.state, TransferEvent::Failed);
                    DownloadOutcome::Failed(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &DownloadRequest) -> ClipgrabResult<DownloadResult> {
        let state = &self.state;
        let payload = self
            .transport
            .fetch(&request.file_id, |progress| {
                apply(state, TransferEvent::Progress(progress));
            })
            .await?;
        debug!("Received {} bytes", payload.bytes.len());

        let payload = match classify(payload) {
            ClassifiedResponse::Binary(payload) => payload,
            ClassifiedResponse::ServerError(message) => {
                return Err(DownloadError::server_reported(message))
            }
        };

        let resolved = resolve_filename(
            payload.meta.content_disposition.as_deref(),
            request.suggested_filename.as_deref(),
        );
        debug!("Resolved filename {:?} ({:?})", resolved.name, resolved.source);

        let content_type = payload.meta.content_type_or_default().to_string();
        let saved = self
            .saver
            .save(&resolved.name, &content_type, &payload.bytes)
            .await?;

        Ok(DownloadResult {
            request_id: request.id,
            file_id: request.file_id.clone(),
            file_path: saved.path.display().to_string(),
            file_size: saved.size,
            filename: saved.filename,
            content_type,
            finished_at: Utc::now(),
        })
    }
}

/// Atomically move from idle to `Started`. Returns false if already active.
fn try_begin(state: &watch::Sender<TransferState>) -> bool {
    let mut began = false;
    state.send_if_modified(|current| {
        if current.is_downloading {
            return false;
        }
        *current = current.apply(&TransferEvent::Started);
        began = true;
        true
    });
    began
}

/// Run an event through the state machine, notifying only on change.
fn apply(state: &watch::Sender<TransferState>, event: TransferEvent) {
    state.send_if_modified(|current| {
        let next = current.apply(&event);
        let changed = next != *current;
        *current = next;
        changed
    });
}

/// Returns the controller to idle on every exit path, including a dropped future.
struct ResetOnDrop<'a>(&'a watch::Sender<TransferState>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|current| {
            if *current == TransferState::IDLE {
                return false;
            }
            *current = TransferState::IDLE;
            true
        });
    }
}
