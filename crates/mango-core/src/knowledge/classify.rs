//! Provenance heuristics.
//!
//! The ingestion services stamp their chunks with header lines: scraped pages
//! carry `URL: <address>`, PDF chunks carry `Arquivo: <file>` and/or
//! `Tipo: PDF`. Anything else was typed in by hand.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::types::{KnowledgeDocument, SourceType};

pub const URL_MARKER: &str = "URL:";
pub const FILE_MARKER: &str = "Arquivo:";
pub const PDF_TYPE_MARKER: &str = "Tipo: PDF";

/// Group key shared by all hand-written documents.
pub const MANUAL_GROUP_KEY: &str = "Documentos manuais";
/// Prefix that keeps PDF file names apart from URLs and the manual key.
pub const PDF_KEY_PREFIX: &str = "pdf:";
pub const UNNAMED_PDF_KEY: &str = "pdf:sem-nome";
pub const UNNAMED_PDF_TITLE: &str = "Documento PDF";
pub const UNKNOWN_URL_KEY: &str = "URL não identificada";

static URL_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"URL:[ \t]*([^\r\n]*)").expect("static regex"));
static FILE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Arquivo:[ \t]*([^\r\n]*)").expect("static regex"));

/// Where a document belongs and how its group is labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub group_key: String,
    pub source_type: SourceType,
    pub title: String,
}

/// Classify a document by the markers in its text.
///
/// The URL marker wins over the PDF markers when both are present.
pub fn classify(doc: &KnowledgeDocument) -> Classification {
    let text = doc.text();

    if text.contains(URL_MARKER) {
        let key = capture(&URL_VALUE, text).unwrap_or(UNKNOWN_URL_KEY).to_owned();
        let title = host_of(&key).unwrap_or_else(|| key.clone());
        return Classification { group_key: key, source_type: SourceType::Website, title };
    }

    if text.contains(FILE_MARKER) || text.contains(PDF_TYPE_MARKER) {
        return match capture(&FILE_VALUE, text) {
            Some(file) => Classification {
                group_key: format!("{PDF_KEY_PREFIX}{file}"),
                source_type: SourceType::Pdf,
                title: strip_extension(file).to_owned(),
            },
            None => Classification {
                group_key: UNNAMED_PDF_KEY.to_owned(),
                source_type: SourceType::Pdf,
                title: UNNAMED_PDF_TITLE.to_owned(),
            },
        };
    }

    Classification {
        group_key: MANUAL_GROUP_KEY.to_owned(),
        source_type: SourceType::Manual,
        title: MANUAL_GROUP_KEY.to_owned(),
    }
}

/// First non-empty value following the marker, on the marker's own line.
fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|v| !v.is_empty())
}

fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw).ok()?.host_str().map(str::to_owned)
}

fn strip_extension(file: &str) -> &str {
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}
