/// Presentation model derived from [`TransferState`].
use crate::state::TransferState;

pub const IDLE_LABEL: &str = "Download";

/// What a front end shows for the current transfer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferView {
    pub label: String,
    /// The trigger is disabled while a transfer is running.
    pub disabled: bool,
    /// Bar width in percent; only present for `0 < p < 100`.
    pub progress_bar: Option<u8>,
}

impl TransferView {
    pub fn from_state(state: TransferState) -> Self {
        if !state.is_downloading {
            return Self {
                label: IDLE_LABEL.to_string(),
                disabled: false,
                progress_bar: None,
            };
        }

        let pct = state.progress_percent;
        Self {
            label: format!("Downloading... {}%", pct),
            disabled: true,
            progress_bar: (pct > 0 && pct < 100).then_some(pct),
        }
    }
}

impl From<TransferState> for TransferView {
    fn from(state: TransferState) -> Self {
        Self::from_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active(pct: u8) -> TransferState {
        TransferState {
            is_downloading: true,
            progress_percent: pct,
        }
    }

    #[test]
    fn test_idle_view() {
        let view = TransferView::from(TransferState::IDLE);
        assert_eq!(view.label, "Download");
        assert!(!view.disabled);
        assert_eq!(view.progress_bar, None);
    }

    #[test]
    fn test_active_view() {
        let view = TransferView::from(active(42));
        assert_eq!(view.label, "Downloading... 42%");
        assert!(view.disabled);
        assert_eq!(view.progress_bar, Some(42));
    }

    #[test]
    fn test_bar_hidden_at_bounds() {
        assert_eq!(TransferView::from(active(0)).progress_bar, None);
        assert_eq!(TransferView::from(active(100)).progress_bar, None);
        assert_eq!(TransferView::from(active(100)).label, "Downloading... 100%");
    }
}
