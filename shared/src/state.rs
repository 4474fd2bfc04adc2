/// Transfer state machine.
///
/// The controller never mutates [`TransferState`] field by field; it feeds
/// [`TransferEvent`]s through [`TransferState::apply`], which keeps the
/// progress invariants in one place:
///
/// - `Started` always begins from `{downloading, 0%}`.
/// - progress never goes down and never passes 100 within one invocation.
/// - `Succeeded` and `Failed` both return to idle `{false, 0}`.
use serde::Serialize;

use crate::models::ProgressEvent;

/// Observable activity of one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferState {
    pub is_downloading: bool,
    pub progress_percent: u8,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Started,
    Progress(ProgressEvent),
    Succeeded,
    Failed,
}

impl TransferState {
    pub const IDLE: TransferState = TransferState {
        is_downloading: false,
        progress_percent: 0,
    };

    pub fn apply(self, event: &TransferEvent) -> TransferState {
        match event {
            TransferEvent::Started => TransferState {
                is_downloading: true,
                progress_percent: 0,
            },
            // Late progress after termination is dropped.
            TransferEvent::Progress(_) if !self.is_downloading => self,
            TransferEvent::Progress(progress) => match percent(progress.loaded, progress.total) {
                Some(pct) => TransferState {
                    progress_percent: self.progress_percent.max(pct),
                    ..self
                },
                None => self,
            },
            TransferEvent::Succeeded | TransferEvent::Failed => TransferState::IDLE,
        }
    }
}

/// `round(loaded * 100 / total)`, halves rounding up, clamped to 100.
///
/// Returns `None` when the total is unknown or zero.
pub fn percent(loaded: u64, total: Option<u64>) -> Option<u8> {
    let total = u128::from(total.filter(|t| *t > 0)?);
    let loaded = u128::from(loaded).min(total);
    let pct = (loaded * 200 + total) / (total * 2);
    Some(pct.min(100) as u8)
}
