/// Saving downloaded payloads to local storage.
///
/// Bytes are first written to a hidden `.part` staging file inside the output
/// directory and then renamed to the final name. The staging file is a scoped
/// resource: if anything fails before the rename, dropping [`StagedFile`]
/// removes it, so a failed save never leaves a partial file behind.
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use clipgrab_shared::filename::sanitize_filename;

/// Where and under which name a payload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}

/// Persists a named, typed byte buffer.
pub trait Saver {
    fn save(
        &self,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> impl Future<Output = io::Result<SavedFile>> + Send;
}

/// Writes files into a directory, never overwriting existing ones.
#[derive(Debug, Clone)]
pub struct FileSaver {
    output_dir: PathBuf,
}

impl FileSaver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Saver for FileSaver {
    async fn save(&self, filename: &str, content_type: &str, bytes: &[u8]) -> io::Result<SavedFile> {
        let safe_name = sanitize_filename(filename);
        if safe_name != filename {
            debug!("Sanitized filename {:?} -> {:?}", filename, safe_name);
        }

        let staged = StagedFile::write(&self.output_dir, bytes).await?;
        let target = staged.commit_unique(&self.output_dir, &safe_name).await?;

        let filename = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(safe_name);
        info!(
            "Wrote {} bytes ({}) to {}",
            bytes.len(),
            content_type,
            target.display()
        );

        Ok(SavedFile {
            path: target,
            filename,
            size: bytes.len() as u64,
        })
    }
}

/// Transient staging file, removed on drop unless committed.
struct StagedFile {
    path: PathBuf,
    committed: bool,
}

impl StagedFile {
    async fn write(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        let staged = StagedFile {
            path: dir.join(format!(".clipgrab-{}.part", Uuid::new_v4())),
            committed: false,
        };

        let mut file = tokio::fs::File::create(&staged.path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(staged)
    }

    /// Moves the staged bytes to the first free name among `name`,
    /// `stem (1).ext`, `stem (2).ext`, ...
    ///
    /// Each candidate is claimed with `create_new`, so two concurrent savers
    /// can never end up on the same name. The rename then replaces only the
    /// empty placeholder this call created.
    async fn commit_unique(mut self, dir: &Path, filename: &str) -> io::Result<PathBuf> {
        let (stem, ext) = split_extension(filename);
        let mut n = 0u32;
        let target = loop {
            let candidate = match (n, ext) {
                (0, _) => dir.join(filename),
                (_, Some(ext)) => dir.join(format!("{} ({}).{}", stem, n, ext)),
                (_, None) => dir.join(format!("{} ({})", stem, n)),
            };
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(_) => break candidate,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        };

        if let Err(e) = tokio::fs::rename(&self.path, &target).await {
            if let Err(cleanup) = tokio::fs::remove_file(&target).await {
                warn!("Failed to release {}: {}", target.display(), cleanup);
            }
            return Err(e);
        }
        self.committed = true;
        Ok(target)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed staging file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove staging file {}: {}", self.path.display(), e),
        }
    }
}

/// `clip.mp3` -> (`clip`, Some(`mp3`)); dotfiles and extensionless names keep the whole stem.
fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < filename.len() => {
            (&filename[..idx], Some(&filename[idx + 1..]))
        }
        _ => (filename, None),
    }
}
