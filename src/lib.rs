//! Bounded, validating HTTP I/O helpers for axum services.
//!
//! Three concerns, each usable on its own from a request handler:
//!
//! - receiving multipart file uploads with magic-byte content sniffing,
//!   an allow-list, safe renaming, and streaming copies to disk
//!   ([`upload_files`], [`upload_one_file`]);
//! - serving a file back as a forced download under a caller-chosen
//!   name ([`download_static_file`]);
//! - decoding JSON request bodies under a byte ceiling with strict
//!   unknown-field rejection and precise error causes, and encoding the
//!   standard `{error, message, data}` response envelope ([`read_json`],
//!   [`write_json`], [`error_json`]).
//!
//! Every operation runs synchronously inside one request/response cycle,
//! shares no mutable state, retries nothing, and surfaces every failure
//! to its immediate caller. Each error type implements `IntoResponse`,
//! so handlers can bubble them with `?`.

pub mod client;
pub mod download;
pub mod error;
pub mod fs;
pub mod json;
pub mod naming;
pub mod slug;
pub mod sniff;
pub mod upload;

pub use client::push_json_to_remote;
pub use download::download_static_file;
pub use error::{DownloadError, JsonError, PushError, SlugError, UploadError, UploadErrorKind};
pub use fs::ensure_dir;
pub use json::{error_json, read_json, write_json, JsonConfig, JsonEnvelope};
pub use naming::random_name;
pub use slug::slugify;
pub use upload::{upload_files, upload_one_file, UploadConfig, UploadedFile};
