use crate::syntax::SourceLanguage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Indentation unit used by generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentationText {
    TwoSpaces,
    #[default]
    FourSpaces,
    EightSpaces,
    Tab,
}

impl IndentationText {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentationText::TwoSpaces => "  ",
            IndentationText::FourSpaces => "    ",
            IndentationText::EightSpaces => "        ",
            IndentationText::Tab => "\t",
        }
    }

    /// Width of one unit in columns, counting a tab as four.
    pub fn width(self) -> usize {
        match self {
            IndentationText::TwoSpaces => 2,
            IndentationText::FourSpaces | IndentationText::Tab => 4,
            IndentationText::EightSpaces => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NewLineKind {
    #[default]
    Lf,
    CrLf,
}

impl NewLineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewLineKind::Lf => "\n",
            NewLineKind::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteKind {
    #[default]
    Double,
    Single,
}

impl QuoteKind {
    pub fn as_char(self) -> char {
        match self {
            QuoteKind::Double => '"',
            QuoteKind::Single => '\'',
        }
    }
}

/// Formatting options shared by every manipulation in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ManipulationSettings {
    pub indentation: IndentationText,
    pub new_line: NewLineKind,
    pub quote_kind: QuoteKind,
    /// Roll back any edit whose reparse contains new syntax errors
    pub reject_syntax_errors: bool,
}

impl Default for ManipulationSettings {
    fn default() -> Self {
        Self {
            indentation: IndentationText::default(),
            new_line: NewLineKind::default(),
            quote_kind: QuoteKind::default(),
            reject_syntax_errors: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    pub language: SourceLanguage,
    /// File extensions without the leading dot; defaults per language
    pub extensions: Option<Vec<String>>,
    pub manipulation: ManipulationSettings,
}

impl ProjectConfig {
    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(list) => list.clone(),
            None => self
                .language
                .default_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    /// True if `path` has one of the configured extensions.
    pub fn covers(&self, path: &std::path::Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions().iter().any(|e| e == ext)
    }

    /// Every problem with the configuration, or `Ok` if there is none.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let Some(list) = &self.extensions else {
            return Ok(());
        };
        let mut issues: Vec<ValidationIssue> = list
            .iter()
            .filter_map(|ext| {
                if ext.trim().is_empty() {
                    Some(ValidationIssue::BlankExtension)
                } else if let Some(bare) = ext.strip_prefix('.') {
                    Some(ValidationIssue::DottedExtension {
                        extension: ext.clone(),
                        bare: bare.to_string(),
                    })
                } else {
                    None
                }
            })
            .collect();
        if list.is_empty() {
            issues.insert(0, ValidationIssue::NoExtensions);
        }

        match issues.is_empty() {
            true => Ok(()),
            false => Err(ValidationError { issues }),
        }
    }
}

/// One or more [`ValidationIssue`]s, shown one per line.
#[derive(Debug, Clone, Error)]
#[error("{}", lines(issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn lines(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("project config lists no file extensions")]
    NoExtensions,

    #[error("an extension in the project config is blank")]
    BlankExtension,

    #[error("extension '{extension}' has a leading dot; write '{bare}'")]
    DottedExtension { extension: String, bare: String },
}
