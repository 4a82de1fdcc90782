//! Binary payloads carried as strings.
//!
//! Files travel through records as base64, either bare or wrapped in a data
//! URI (`data:image/png;base64,iVBOR...`). The MIME type is taken from the URI
//! when present and sniffed from the leading bytes otherwise.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ValueError;

const OCTET_STREAM: &str = "application/octet-stream";

/// A parsed `data:<mime>[;<param>...][;base64],<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
  /// The media type without parameters, `text/plain` when omitted.
  pub mime: String,
  pub base64: bool,
  pub payload: String,
}

impl DataUri {
  pub fn parse(value: &str) -> Result<Self, ValueError> {
    let rest = value
      .strip_prefix("data:")
      .ok_or_else(|| ValueError::data_uri("missing `data:` scheme"))?;
    let (meta, payload) = rest
      .split_once(',')
      .ok_or_else(|| ValueError::data_uri("missing `,` separator"))?;

    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or_default().trim();
    let base64 = parts.any(|param| param.trim().eq_ignore_ascii_case("base64"));

    Ok(Self {
      mime: if mime.is_empty() {
        "text/plain".to_string()
      } else {
        mime.to_string()
      },
      base64,
      payload: payload.to_string(),
    })
  }

  /// The payload bytes. Percent-escapes in a non-base64 payload are kept
  /// as they are.
  pub fn decode(&self) -> Result<Vec<u8>, ValueError> {
    if self.base64 {
      decode_base64(&self.payload)
    } else {
      Ok(self.payload.as_bytes().to_vec())
    }
  }
}

/// Strip a data URI header, leaving the base64 payload.
pub fn trim_base64_mime(value: &str) -> &str {
  match value.rsplit_once(',') {
    Some((_, payload)) => payload,
    None => value,
  }
}

/// Decode a base64 string, tolerating a data URI header.
pub fn decode_base64(value: &str) -> Result<Vec<u8>, ValueError> {
  STANDARD
    .decode(trim_base64_mime(value).trim())
    .map_err(|source| ValueError::Base64 { source })
}

pub fn encode_base64(bytes: &[u8]) -> String {
  STANDARD.encode(bytes)
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
  format!("data:{mime};base64,{}", encode_base64(bytes))
}

/// The MIME type of a string-encoded file: declared by its data URI, or
/// sniffed from the decoded bytes. A data URI payload is not decoded.
pub fn mime_of(value: &str) -> Result<String, ValueError> {
  if value.starts_with("data:") {
    return Ok(DataUri::parse(value)?.mime);
  }
  Ok(detect_mime(&decode_base64(value)?).to_string())
}

/// Sniff the MIME type of raw bytes. Binary formats are recognised by
/// `infer`, which also looks inside ZIP containers for office documents;
/// anything else is classified as JSON, HTML, plain text or an octet stream.
pub fn detect_mime(bytes: &[u8]) -> &'static str {
  if let Some(kind) = infer::get(bytes) {
    return kind.mime_type();
  }

  match std::str::from_utf8(bytes) {
    Ok(text) => {
      let trimmed = text.trim_start();
      if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(text).is_ok()
      {
        return "application/json";
      }
      if trimmed.starts_with("<!DOCTYPE html") || trimmed.starts_with("<html") {
        return "text/html";
      }
      "text/plain"
    }
    Err(_) => OCTET_STREAM,
  }
}
