use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::sanitize::sanitize_filename;

use super::dedup::{content_digest, DedupTable};

/// Name attempts per attachment: the name itself plus `_1` through `_99`.
pub const MAX_NAMING_ATTEMPTS: usize = 100;

/// What happened to an attachment handed to [`AttachmentStore::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Bytes were written under a fresh name.
    Written { filename: String, path: PathBuf },
    /// The same content was already written during this scan.
    Duplicate { existing: String },
    /// Every candidate name was taken; nothing was written.
    Exhausted { filename: String },
}

/// Writes attachments into a single output directory without ever
/// overwriting an existing file.
pub struct AttachmentStore {
    output_directory: PathBuf,
}

impl AttachmentStore {
    pub fn new<P: AsRef<Path>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Stores `content` once per scan.
    ///
    /// Content already in `dedup` is skipped. Otherwise the filename gets the
    /// vendor prefix (if any), numbered variants are tried on collision, and
    /// the digest is recorded under the name actually written.
    pub fn store(
        &self,
        content: &[u8],
        filename: &str,
        service: Option<&str>,
        dedup: &mut DedupTable,
    ) -> Result<StoreOutcome, StorageError> {
        let digest = content_digest(content);
        if let Some(existing) = dedup.get(&digest) {
            debug!("Skipping duplicate content already saved as {}", existing);
            return Ok(StoreOutcome::Duplicate {
                existing: existing.to_string(),
            });
        }

        let filename = sanitize_filename(filename);
        let filename = match service {
            Some(tag) if !tag.is_empty() => prefixed_filename(tag, &filename),
            _ => filename,
        };

        self.ensure_directory()?;

        match self.write_exclusive(&filename, content)? {
            Some((written_name, path)) => {
                dedup.record(digest, written_name.clone());
                Ok(StoreOutcome::Written {
                    filename: written_name,
                    path,
                })
            }
            None => {
                debug!(
                    "No free name for {} after {} attempts, dropping",
                    filename, MAX_NAMING_ATTEMPTS
                );
                Ok(StoreOutcome::Exhausted { filename })
            }
        }
    }

    /// Tries `name`, `name_1`, ... with exclusive creation so an existing
    /// file is never truncated. Returns `None` when all attempts collide.
    fn write_exclusive(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<Option<(String, PathBuf)>, StorageError> {
        let (base, ext) = split_extension(filename);

        for attempt in 0..MAX_NAMING_ATTEMPTS {
            let try_filename = if attempt == 0 {
                filename.to_string()
            } else {
                format!("{}_{}{}", base, attempt, ext)
            };
            let try_path = self.output_directory.join(&try_filename);

            let mut options = std::fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o644);
            }

            match options.open(&try_path) {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(content) {
                        drop(file);
                        let _ = std::fs::remove_file(&try_path);
                        return Err(StorageError::WriteFile {
                            path: try_path,
                            source: e,
                        });
                    }
                    return Ok(Some((try_filename, try_path)));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Ok(None)
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        if self.output_directory.is_dir() {
            return Ok(());
        }

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }

        builder
            .create(&self.output_directory)
            .map_err(|e| StorageError::CreateDirectory {
                path: self.output_directory.clone(),
                source: e,
            })
    }
}

/// `{tag}_{basename}{ext}`.
pub fn prefixed_filename(tag: &str, filename: &str) -> String {
    let (base, ext) = split_extension(filename);
    format!("{}_{}{}", tag, base, ext)
}

/// Splits at the last dot; the extension keeps its dot.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    }
}
