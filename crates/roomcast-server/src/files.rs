//! Upload reception state and storage-path hygiene.
//!
//! Uploaded files land at `<root>/<clientName>/<filename>`; both name
//! tokens come off the wire and must each stay a single plain path
//! component. One upload may be in flight per connection; its state lives
//! with the owning connection's task and needs no locking.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};

use crate::error::ServerError;

/// Validate a client-supplied name as a single plain path component.
///
/// Rejects empty names, `.` and `..`, separators, and NUL: anything that
/// could address outside the storage root.
pub fn sanitize_component(field: &'static str, value: &str) -> Result<(), ServerError> {
    let unsafe_name = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);

    if unsafe_name {
        return Err(ServerError::InvalidName { field, value: value.to_string() });
    }
    Ok(())
}

/// Resolve the storage path for a client's file, validating both tokens.
pub fn upload_path(
    root: &Path,
    client_name: &str,
    filename: &str,
) -> Result<PathBuf, ServerError> {
    sanitize_component("clientName", client_name)?;
    sanitize_component("filename", filename)?;
    Ok(root.join(client_name).join(filename))
}

/// An upload in progress on one connection.
///
/// Created by `FileSize` handling, advanced by `FileChunk` frames, and
/// destroyed when `received` reaches `expected` or the connection closes.
/// On early destruction the partial file stays on disk.
#[derive(Debug)]
pub struct FileReception {
    file: fs::File,
    path: PathBuf,
    expected: u64,
    received: u64,
}

impl FileReception {
    /// Open the target file for writing, creating the client directory on
    /// demand.
    pub async fn open(
        root: &Path,
        client_name: &str,
        filename: &str,
        expected: u64,
    ) -> Result<Self, ServerError> {
        let path = upload_path(root, client_name, filename)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let file = fs::File::create(&path).await?;

        Ok(Self { file, path, expected, received: 0 })
    }

    /// Append one chunk; returns `true` when the upload is complete.
    ///
    /// Completion flushes the file. The caller destroys the state on
    /// `true` and on error alike.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<bool, ServerError> {
        self.file.write_all(chunk).await?;
        self.received += chunk.len() as u64;

        if self.is_complete() {
            self.file.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether all expected bytes have arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.received >= self.expected
    }

    /// Where the file is being written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes received so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Total bytes the client announced.
    #[must_use]
    pub fn expected(&self) -> u64 {
        self.expected
    }
}
