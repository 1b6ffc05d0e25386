//! Magic-byte content classification for uploaded files.
//!
//! Classifies from the first bytes of the stream, never from the
//! client-supplied `Content-Type` header or the file extension.

/// Detect the MIME type of `head` (the first bytes of a file, 512 are
/// plenty) from its magic numbers. Unknown content falls back to
/// `application/octet-stream`.
///
/// Inputs shorter than any signature still classify: a printable head
/// such as `b"GIF"` reads as `text/plain; charset=utf-8` rather than
/// octet-stream, so allow-lists see truncated text fragments as text.
pub fn detect_content_type(head: &[u8]) -> &'static str {
    // JPEG: FF D8 FF
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if head.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }

    // GIF: GIF87a / GIF89a
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return "image/gif";
    }

    // WebP: RIFF ???? WEBP
    if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    if head.starts_with(b"BM") {
        return "image/bmp";
    }

    if head.starts_with(b"%PDF-") {
        return "application/pdf";
    }

    // Zip (also docx/xlsx/jar/...): PK 03 04 and the empty/spanned markers
    if head.starts_with(&[0x50, 0x4B, 0x03, 0x04])
        || head.starts_with(&[0x50, 0x4B, 0x05, 0x06])
        || head.starts_with(&[0x50, 0x4B, 0x07, 0x08])
    {
        return "application/zip";
    }

    if head.starts_with(&[0x1F, 0x8B]) {
        return "application/x-gzip";
    }

    if head.starts_with(b"OggS") {
        return "application/ogg";
    }

    // ID3-tagged MP3
    if head.starts_with(b"ID3") {
        return "audio/mpeg";
    }

    // MP4 family: ftyp box at offset 4
    if head.len() >= 12 && &head[4..8] == b"ftyp" {
        return "video/mp4";
    }

    // Printable text (allowing whitespace) is served as plain text, the
    // same fallback order the WHATWG sniffing algorithm uses.
    if !head.is_empty() && is_plain_text(head) {
        return "text/plain; charset=utf-8";
    }

    "application/octet-stream"
}

fn is_plain_text(head: &[u8]) -> bool {
    head.iter()
        .all(|&b| b == b'\t' || b == b'\n' || b == b'\r' || (0x20..0x7F).contains(&b) || b >= 0x80)
}
