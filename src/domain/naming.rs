use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use unicode_normalization::UnicodeNormalization;

use crate::application::error::ApplicationError;

pub const ALLOWED_EXTENSIONS: [&str; 9] =
    ["png", "jpg", "jpeg", "gif", "mp3", "mp4", "pdf", "docx", "txt"];

const PREFIX_FORMAT: &str = "%Y%m%d_%H%M%S_";

/// Length of the `YYYYMMDD_HHMMSS_` prefix.
pub const PREFIX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Audio,
    Video,
    Pdf,
    Document,
    Generic,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Audio => "audio",
            FileCategory::Video => "video",
            FileCategory::Pdf => "pdf",
            FileCategory::Document => "document",
            FileCategory::Generic => "generic",
        }
    }
}

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`.
///
/// Text is NFKD-decomposed first so accented letters keep their base letter.
/// Separators turn into whitespace, whitespace runs collapse into a single `_`,
/// anything else outside the safe set is dropped and leading/trailing `.`/`_`
/// are trimmed. The result may be empty.
pub fn sanitize(original_name: &str) -> String {
    let spaced: String = original_name
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// Lower-cased text after the last `.`, if there is one.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_allowed(name: &str) -> bool {
    extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Builds the storage name for an upload received at `now`.
///
/// The prefix is sanitized together with the name, so a stem made only of
/// dropped characters still keeps its `.ext` (`文件.txt` stores as
/// `YYYYMMDD_HHMMSS_.txt`).
pub fn encode<Tz: TimeZone>(
    original_name: &str,
    now: &DateTime<Tz>,
) -> Result<String, ApplicationError>
where
    Tz::Offset: std::fmt::Display,
{
    let storage_name = sanitize(&format!("{}{}", now.format(PREFIX_FORMAT), original_name));
    let sanitized = storage_name.get(PREFIX_LEN..).unwrap_or_default();
    if sanitized.is_empty() {
        return Err(ApplicationError::EmptyName);
    }
    if !is_allowed(sanitized) {
        return Err(ApplicationError::UnsupportedType(sanitized.to_string()));
    }

    Ok(storage_name)
}

/// Strips the timestamp prefix when the character at index 15 is `_`.
///
/// This is a positional check, not a parse: any raw name longer than the prefix
/// with an underscore at index 15 loses its first 16 characters too.
pub fn decode_display_name(storage_name: &str) -> &str {
    let bytes = storage_name.as_bytes();
    if bytes.len() > PREFIX_LEN && bytes[PREFIX_LEN - 1] == b'_' {
        &storage_name[PREFIX_LEN..]
    } else {
        storage_name
    }
}

/// Upload time encoded in the prefix, interpreted in local time.
pub fn parse_upload_time(storage_name: &str) -> Option<DateTime<Local>> {
    let prefix = storage_name.get(..PREFIX_LEN)?;
    let naive = NaiveDateTime::parse_from_str(prefix, PREFIX_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

pub fn file_category(name: &str) -> FileCategory {
    let ext = extension(name).unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" => FileCategory::Image,
        "mp3" | "wav" => FileCategory::Audio,
        "mp4" | "avi" | "mov" => FileCategory::Video,
        "pdf" => FileCategory::Pdf,
        "docx" | "doc" | "txt" => FileCategory::Document,
        _ => FileCategory::Generic,
    }
}
