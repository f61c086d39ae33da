//! `업데이트` command: renders the newest entries of the patch-notes document.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

use crate::participants::CommandReply;

const NOTES_SHOWN: usize = 3;
const EMBED_FIELD_NAME_MAX_CHARS: usize = 256;
const EMBED_FIELD_VALUE_MAX_CHARS: usize = 1024;
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub const PATCH_NOTES_TITLE: &str = "📝 기니매니저 패치노트";
pub const PATCH_NOTES_DESCRIPTION: &str = "봇의 최근 변경사항 및 새 기능을 확인하세요.";
pub const PATCH_NOTES_FOOTER: &str = "최신 기능/버그 신고는 문의 또는 DM";
pub const PATCH_NOTES_THUMBNAIL_URL: &str = "https://kimberlyproject.wordpress.com/wp-content/uploads/2012/11/cropped-223917_246503182034861_7552313_n.jpg";
/// Gold.
pub const PATCH_NOTES_COLOUR: u32 = 0x00F1_C40F;

#[derive(Debug, Error)]
pub enum PatchNotesError {
    #[error("patch notes unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },
    #[error("patch notes document is not a list")]
    NotAList,
}

impl PatchNotesError {
    pub fn reply(&self) -> CommandReply {
        match self {
            Self::Unavailable { .. } => {
                CommandReply::public("업데이트 내역 파일을 찾을 수 없습니다.")
            }
            Self::NotAList => CommandReply::ephemeral("업데이트 내역 형식이 올바르지 않습니다."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchNote {
    pub date: String,
    pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchNoteField {
    pub name: String,
    pub value: String,
}

/// Embed-shaped rendering of the newest patch notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchNotesView {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub colour: u32,
    pub fields: Vec<PatchNoteField>,
    pub footer: String,
}

pub fn load_patch_notes(path: &Path) -> Result<Vec<PatchNote>, PatchNotesError> {
    let unavailable = |reason: String| PatchNotesError::Unavailable {
        path: path.display().to_string(),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|error| unavailable(error.to_string()))?;
    let document =
        serde_json::from_str::<Value>(&raw).map_err(|error| unavailable(error.to_string()))?;
    let Value::Array(items) = document else {
        return Err(PatchNotesError::NotAList);
    };
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| PatchNote {
            date: text_of(item.get("date")),
            desc: text_of(item.get("desc")),
        })
        .collect())
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parses a patch-note date; anything unrecognised sorts as the oldest possible date.
pub fn parse_note_date(raw: &str) -> NaiveDateTime {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NaiveDateTime::MIN;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return midnight;
            }
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return parsed;
        }
    }
    if let Ok(parsed) = trimmed.parse::<NaiveDateTime>() {
        return parsed;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.naive_local())
        .unwrap_or(NaiveDateTime::MIN)
}

pub fn render_patch_notes(notes: &[PatchNote]) -> PatchNotesView {
    let mut ordered = notes.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|note| std::cmp::Reverse(parse_note_date(&note.date)));
    let fields = ordered
        .into_iter()
        .take(NOTES_SHOWN)
        .map(|note| PatchNoteField {
            name: truncate_chars(&format!("📅 {}", note.date), EMBED_FIELD_NAME_MAX_CHARS),
            value: if note.desc.trim().is_empty() {
                "-".to_string()
            } else {
                truncate_chars(&note.desc, EMBED_FIELD_VALUE_MAX_CHARS)
            },
        })
        .collect();
    PatchNotesView {
        title: PATCH_NOTES_TITLE.to_string(),
        description: PATCH_NOTES_DESCRIPTION.to_string(),
        thumbnail_url: PATCH_NOTES_THUMBNAIL_URL.to_string(),
        colour: PATCH_NOTES_COLOUR,
        fields,
        footer: PATCH_NOTES_FOOTER.to_string(),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
