//! Follow-up question suggestions for assistant answers.
//!
//! The engine scans an answer for the keywords of a [`Lexicon`] and proposes
//! the questions attached to every keyword it finds. When the answer matches
//! too little, two generic questions are appended so the user always has
//! something to click.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::SuggestionError;

/// Upper bound on the number of suggestions returned for one answer.
pub const MAX_SUGGESTIONS: usize = 3;

/// Below this many keyword hits the fallback questions are appended.
const MIN_BEFORE_FALLBACK: usize = 2;

/// Number of questions every lexicon entry (and the fallback) must carry.
const QUESTIONS_PER_ENTRY: usize = 2;

const BUILTIN_ENTRIES: &[(&str, [&str; 2])] = &[
    (
        "curso",
        [
            "Quais cursos estão disponíveis?",
            "Como faço para me inscrever em um curso?",
        ],
    ),
    (
        "matrícula",
        [
            "Quais documentos preciso para a matrícula?",
            "Qual é o prazo para fazer a matrícula?",
        ],
    ),
    (
        "professor",
        [
            "Como entro em contato com os professores?",
            "Onde vejo o horário de atendimento dos professores?",
        ],
    ),
    (
        "aula",
        [
            "Quando começam as aulas?",
            "Onde consulto o horário das aulas?",
        ],
    ),
    (
        "campus",
        [
            "Onde fica o campus?",
            "Quais serviços o campus oferece?",
        ],
    ),
];

const BUILTIN_FALLBACK: [&str; 2] = [
    "Pode me contar mais sobre isso?",
    "Como posso obter mais informações?",
];

/// One keyword and the questions it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LexiconEntry {
    pub keyword: String,
    pub questions: Vec<String>,
}

/// Ordered keyword table plus the generic fallback questions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub entries: Vec<LexiconEntry>,
    pub fallback: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            entries: BUILTIN_ENTRIES
                .iter()
                .map(|(keyword, questions)| LexiconEntry {
                    keyword: (*keyword).to_owned(),
                    questions: questions.iter().map(|q| (*q).to_owned()).collect(),
                })
                .collect(),
            fallback: BUILTIN_FALLBACK.iter().map(|q| (*q).to_owned()).collect(),
        }
    }
}

impl Lexicon {
    /// Parse and validate a lexicon from TOML text.
    ///
    /// ```toml
    /// fallback = ["Pode explicar melhor?", "Tem mais detalhes?"]
    ///
    /// [[entries]]
    /// keyword = "biblioteca"
    /// questions = ["Qual o horário da biblioteca?", "Como pego um livro emprestado?"]
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, SuggestionError> {
        let lexicon: Lexicon = toml::from_str(input)?;
        lexicon.validate()?;
        Ok(lexicon.normalized())
    }

    /// Read a lexicon file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SuggestionError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), SuggestionError> {
        if self.fallback.len() != QUESTIONS_PER_ENTRY {
            return Err(SuggestionError::InvalidLexicon {
                message: format!(
                    "fallback must have exactly {QUESTIONS_PER_ENTRY} questions (got {})",
                    self.fallback.len()
                ),
            });
        }
        for entry in &self.entries {
            if entry.keyword.trim().is_empty() {
                return Err(SuggestionError::InvalidLexicon {
                    message: "keyword must not be empty".into(),
                });
            }
            if entry.questions.len() != QUESTIONS_PER_ENTRY {
                return Err(SuggestionError::InvalidLexicon {
                    message: format!(
                        "keyword '{}' must have exactly {QUESTIONS_PER_ENTRY} questions (got {})",
                        entry.keyword,
                        entry.questions.len()
                    ),
                });
            }
        }
        Ok(())
    }

    // Keywords are matched against a lower-cased answer.
    fn normalized(mut self) -> Self {
        for entry in &mut self.entries {
            entry.keyword = entry.keyword.trim().to_lowercase();
        }
        self
    }
}

/// Derives follow-up questions from assistant answers.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    lexicon: Lexicon,
}

impl SuggestionEngine {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon: lexicon.normalized() }
    }

    /// Build an engine from an optional lexicon file.
    ///
    /// A missing path selects the built-in lexicon. A file that cannot be
    /// loaded is logged and the built-in lexicon is used instead, so a bad
    /// override never takes the chat down.
    pub fn from_optional_path(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Lexicon::load(path) {
            Ok(lexicon) => {
                debug!(path = %path.display(), entries = lexicon.entries.len(), "loaded suggestion lexicon");
                Self::new(lexicon)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid suggestion lexicon; using built-in one");
                Self::default()
            }
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Propose at most [`MAX_SUGGESTIONS`] follow-up questions for `answer`.
    ///
    /// Keywords are tried in lexicon order with a case-insensitive substring
    /// search; each hit contributes both of its questions. Questions shared
    /// by several keywords are kept once per hit.
    pub fn generate(&self, answer: &str) -> Vec<String> {
        let haystack = answer.to_lowercase();

        let mut found: Vec<&str> = Vec::new();
        for entry in &self.lexicon.entries {
            if haystack.contains(entry.keyword.as_str()) {
                found.extend(entry.questions.iter().map(String::as_str));
            }
        }

        if found.len() < MIN_BEFORE_FALLBACK {
            found.extend(self.lexicon.fallback.iter().map(String::as_str));
        }

        found
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(str::to_owned)
            .collect()
    }
}
