//! Read a sales extract from disk, tolerating legacy single-byte encodings.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::types::DecodedText;

/// Decode raw bytes: strict UTF-8 first, Windows-1252 otherwise.
///
/// Windows-1252 maps every byte, so this never fails. A leading BOM is dropped.
pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Some(text) = encoding_rs::UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        return DecodedText {
            text: text.into_owned(),
            encoding: "utf-8",
        };
    }

    let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: "windows-1252",
    }
}

pub fn read_sales_file(path: impl AsRef<Path>) -> Result<DecodedText> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let decoded = decode_bytes(&bytes);
    if decoded.encoding != "utf-8" {
        warn!(path = %path.display(), encoding = decoded.encoding, "input is not valid UTF-8");
    } else {
        debug!(path = %path.display(), bytes = bytes.len(), "read sales file");
    }
    Ok(decoded)
}
