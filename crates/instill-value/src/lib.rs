//! Instill Value
//!
//! The dynamic record type every component consumes and produces, plus the
//! small helpers components use at that boundary:
//!
//! - [`Record`]: an ordered string-keyed map of JSON values.
//! - [`from_record`] / [`to_record`]: typed structs in and out of records.
//! - [`get_path`] / [`set_path`]: dotted field paths such as `authentication.token`.
//! - [`DataUri`], [`detect_mime`]: binary payloads carried as base64 strings.
//! - [`to_kebab`], [`to_snake`], [`to_camel`]: key naming conventions.

mod binary;
mod case;
mod convert;
mod error;
mod record;

pub use binary::{
  DataUri, decode_base64, detect_mime, encode_base64, encode_data_uri, mime_of, trim_base64_mime,
};
pub use case::{rename_keys, to_camel, to_kebab, to_snake};
pub use convert::{from_record, to_record};
pub use error::ValueError;
pub use record::{Record, get_path, kind_of, set_path};

pub use serde_json::Value;
