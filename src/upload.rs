//! Multipart file ingestion with content sniffing, allow-list
//! enforcement, safe renaming, and bounded streaming copies.

use std::path::Path;

use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{UploadError, UploadErrorKind};
use crate::fs::ensure_dir;
use crate::naming::random_name;
use crate::sniff;

pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 1024 * 1024 * 1024;

/// How many leading bytes feed the content-type sniffer.
const SNIFF_LEN: usize = 512;

/// Length of generated destination names (before the extension).
const RENAMED_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Ceiling on the combined size of all file parts in one request.
    pub max_total_bytes: u64,
    /// Sniffed MIME types accepted for upload. Empty means allow all.
    pub allowed_content_types: Vec<String>,
    /// Replace each original filename with a random 32-character name,
    /// keeping the original extension.
    pub rename: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            allowed_content_types: Vec::new(),
            rename: true,
        }
    }
}

/// One persisted file part. Returned by value; the library keeps no
/// reference to it afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub new_file_name: String,
    pub original_file_name: String,
    pub file_size: u64,
}

/// Persists every file part of `multipart` under `upload_dir`, in
/// encounter order.
///
/// The batch is fail-fast: the first part that is rejected or fails to
/// write aborts the whole call. Parts persisted before the failure are
/// not removed; their records ride inside [`UploadError::uploaded`].
/// Callers that want independent per-file tolerance should call
/// [`upload_one_file`] once per request instead.
pub async fn upload_files(
    multipart: &mut Multipart,
    upload_dir: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<Vec<UploadedFile>, UploadError> {
    let upload_dir = upload_dir.as_ref();

    ensure_dir(upload_dir)
        .await
        .map_err(|e| UploadError::new(UploadErrorKind::Io(e)))?;

    let mut uploaded: Vec<UploadedFile> = Vec::new();
    let mut budget = config.max_total_bytes;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(UploadError::with_uploaded(
                    UploadErrorKind::Multipart(e.to_string()),
                    uploaded,
                ))
            }
        };

        // Only file parts are persisted; plain form fields are skipped.
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };

        match save_field(field, original, upload_dir, config, &mut budget).await {
            Ok(file) => uploaded.push(file),
            Err(kind) => return Err(UploadError::with_uploaded(kind, uploaded)),
        }
    }

    Ok(uploaded)
}

/// Convenience wrapper around [`upload_files`] for requests expected to
/// carry exactly one file part.
///
/// A request with no file part is rejected with
/// [`UploadErrorKind::MissingFile`]. Extra parts are persisted exactly as
/// `upload_files` would persist them; the first record is returned.
pub async fn upload_one_file(
    multipart: &mut Multipart,
    upload_dir: impl AsRef<Path>,
    config: &UploadConfig,
) -> Result<UploadedFile, UploadError> {
    let mut files = upload_files(multipart, upload_dir, config).await?;

    if files.is_empty() {
        return Err(UploadError::new(UploadErrorKind::MissingFile));
    }

    Ok(files.remove(0))
}

async fn save_field(
    mut field: Field<'_>,
    original: String,
    upload_dir: &Path,
    config: &UploadConfig,
    budget: &mut u64,
) -> Result<UploadedFile, UploadErrorKind> {
    // Buffer the sniff window instead of consuming it: every byte read
    // here is also written to disk below.
    let mut head: Vec<Bytes> = Vec::new();
    let mut head_len = 0usize;
    while head_len < SNIFF_LEN {
        match next_chunk(&mut field, budget).await? {
            Some(chunk) => {
                head_len += chunk.len();
                head.push(chunk);
            }
            None => break,
        }
    }

    let mut window = Vec::with_capacity(head_len.min(SNIFF_LEN));
    for chunk in &head {
        let take = (SNIFF_LEN - window.len()).min(chunk.len());
        window.extend_from_slice(&chunk[..take]);
        if window.len() == SNIFF_LEN {
            break;
        }
    }

    let detected = sniff::detect_content_type(&window);
    if !config.allowed_content_types.is_empty()
        && !config
            .allowed_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(detected))
    {
        warn!(
            original = %original,
            detected, "upload rejected: sniffed content type not in allow list"
        );
        return Err(UploadErrorKind::UnsupportedType(detected.to_string()));
    }

    let new_file_name = if config.rename {
        match Path::new(&original).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", random_name(RENAMED_LEN), ext),
            None => random_name(RENAMED_LEN),
        }
    } else {
        // The original filename is untrusted input. When it is used as a
        // path component it must be a bare file name.
        if !is_bare_file_name(&original) {
            return Err(UploadErrorKind::InvalidFileName(original));
        }
        original.clone()
    };

    // Stream into a temp file and rename into place, so a copy that
    // fails midway never leaves a partial file under the final name.
    let tmp_path = upload_dir.join(format!(".upload-{}.tmp", random_name(16)));
    let final_path = upload_dir.join(&new_file_name);

    let copy = async {
        let mut out = File::create(&tmp_path).await.map_err(UploadErrorKind::Io)?;
        let mut file_size = 0u64;

        for chunk in &head {
            out.write_all(chunk).await.map_err(UploadErrorKind::Io)?;
            file_size += chunk.len() as u64;
        }

        while let Some(chunk) = next_chunk(&mut field, budget).await? {
            out.write_all(&chunk).await.map_err(UploadErrorKind::Io)?;
            file_size += chunk.len() as u64;
        }

        out.flush().await.map_err(UploadErrorKind::Io)?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(UploadErrorKind::Io)?;

        Ok::<u64, UploadErrorKind>(file_size)
    };

    match copy.await {
        Ok(file_size) => {
            debug!(
                original = %original,
                stored = %new_file_name,
                file_size,
                "persisted uploaded file"
            );
            Ok(UploadedFile {
                new_file_name,
                original_file_name: original,
                file_size,
            })
        }
        Err(kind) => {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            Err(kind)
        }
    }
}

/// Pulls the next chunk of a part, charging it against the request-wide
/// byte budget.
async fn next_chunk(
    field: &mut Field<'_>,
    budget: &mut u64,
) -> Result<Option<Bytes>, UploadErrorKind> {
    let chunk = field
        .chunk()
        .await
        .map_err(|e| UploadErrorKind::Multipart(e.to_string()))?;

    if let Some(ref chunk) = chunk {
        let len = chunk.len() as u64;
        if len > *budget {
            return Err(UploadErrorKind::PayloadTooLarge);
        }
        *budget -= len;
    }

    Ok(chunk)
}

fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}
