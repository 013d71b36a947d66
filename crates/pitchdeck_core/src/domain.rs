//! crates/pitchdeck_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::catalog::SlideType;

/// The deck language. Controls slide display names, prompt wording and the
/// bullet symbol used in the rendered PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Norwegian,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Norwegian => "no",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::English),
            "no" => Some(Language::Norwegian),
            _ => None,
        }
    }

    /// Bullet symbol used when laying out slide body text.
    pub fn bullet(self) -> &'static str {
        match self {
            Language::English => "\u{2022}",
            Language::Norwegian => "-",
        }
    }
}

/// The per-project pipeline phase. Phases only move forward; storing a lower
/// phase than the current one is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    DocumentAnalysis,
    SlidePlanning,
    ContentGeneration,
    Review,
    Export,
}

impl Phase {
    pub fn index(self) -> i32 {
        match self {
            Phase::DocumentAnalysis => 0,
            Phase::SlidePlanning => 1,
            Phase::ContentGeneration => 2,
            Phase::Review => 3,
            Phase::Export => 4,
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Phase::DocumentAnalysis),
            1 => Some(Phase::SlidePlanning),
            2 => Some(Phase::ContentGeneration),
            3 => Some(Phase::Review),
            4 => Some(Phase::Export),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::DocumentAnalysis => "Document Analysis",
            Phase::SlidePlanning => "Slide Planning",
            Phase::ContentGeneration => "Content Generation",
            Phase::Review => "Review",
            Phase::Export => "Export",
        }
    }
}

/// A tenant's pitch-deck workspace.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Bearer credential presented by the client on every authenticated call.
    pub api_token: String,
    /// External LLM conversation handle. Created lazily if thread creation
    /// failed at project creation time.
    pub thread_id: Option<String>,
    pub phase: Phase,
    pub language: Language,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Metadata for an uploaded company document. The raw text itself lives in
/// the blob store under `storage_key`.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub id: Uuid,
    pub project_id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One section of generated pitch-deck text, keyed by type. Only the latest
/// content is kept; every store overwrites the previous version.
#[derive(Debug, Clone)]
pub struct Slide {
    pub slide_type: SlideType,
    pub content: String,
    pub language: Language,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_indices_round_trip() {
        for i in 0..=4 {
            let phase = Phase::from_index(i).unwrap();
            assert_eq!(phase.index(), i);
        }
        assert!(Phase::from_index(5).is_none());
        assert!(Phase::from_index(-1).is_none());
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::DocumentAnalysis < Phase::SlidePlanning);
        assert!(Phase::ContentGeneration < Phase::Export);
        assert_eq!(
            Phase::ContentGeneration.max(Phase::SlidePlanning),
            Phase::ContentGeneration
        );
    }

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("en"), Some(Language::English));
        assert_eq!(Language::from_code("no"), Some(Language::Norwegian));
        assert!(Language::from_code("sv").is_none());
        assert_eq!(Language::Norwegian.code(), "no");
    }
}
