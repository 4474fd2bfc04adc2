//! Clipgrab native downloader.
//!
//! Fetches a single audio file over HTTP, reports progress on a watch
//! channel, separates in-band JSON errors from audio payloads, and saves the
//! result under the server-provided or caller-suggested filename.

pub mod config;
pub mod controller;
pub mod notify;
pub mod persist;
pub mod render;
pub mod transport;

pub use config::DownloaderConfig;
pub use controller::{DownloadController, DownloadOutcome};
pub use notify::{ConsoleNotifier, Notifier};
pub use persist::{FileSaver, Saver};
pub use transport::{HttpTransport, Transport};
