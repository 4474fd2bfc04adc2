/// Terminal rendering of the transfer state.
use std::io::Write;

use tokio::sync::watch;

use clipgrab_shared::state::TransferState;
use clipgrab_shared::view::TransferView;

const BAR_WIDTH: usize = 20;

/// One status line for a view, e.g. `Downloading... 40% [########------------]`.
pub fn render_line(view: &TransferView) -> String {
    match view.progress_bar {
        Some(pct) => {
            let filled = (usize::from(pct) * BAR_WIDTH + 50) / 100;
            format!(
                "{} [{}{}]",
                view.label,
                "#".repeat(filled),
                "-".repeat(BAR_WIDTH - filled)
            )
        }
        None => view.label.clone(),
    }
}

/// Redraw a single status line on every state change until the controller goes away.
///
/// The line is cleared when the controller returns to idle.
pub async fn run_renderer<W: Write>(mut rx: watch::Receiver<TransferState>, mut out: W) {
    while rx.changed().await.is_ok() {
        let view = TransferView::from_state(*rx.borrow_and_update());
        let line = if view.disabled {
            render_line(&view)
        } else {
            String::new()
        };
        // A broken terminal is not worth failing the download over.
        let _ = write!(out, "\r\x1b[2K{}", line);
        let _ = out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(is_downloading: bool, progress_percent: u8) -> TransferView {
        TransferView::from_state(TransferState {
            is_downloading,
            progress_percent,
        })
    }

    #[test]
    fn test_line_with_bar() {
        assert_eq!(
            render_line(&view(true, 40)),
            "Downloading... 40% [########------------]"
        );
    }

    #[test]
    fn test_line_without_bar() {
        assert_eq!(render_line(&view(true, 0)), "Downloading... 0%");
        assert_eq!(render_line(&view(true, 100)), "Downloading... 100%");
        assert_eq!(render_line(&view(false, 0)), "Download");
    }

    #[tokio::test]
    async fn test_renderer_stops_when_sender_dropped() {
        let (tx, rx) = watch::channel(TransferState::IDLE);
        let handle = tokio::spawn(run_renderer(rx, Vec::new()));

        tx.send_replace(TransferState {
            is_downloading: true,
            progress_percent: 50,
        });
        drop(tx);

        handle.await.unwrap();
    }
}
