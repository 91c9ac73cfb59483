//! Static checker for `theme.txt` file references
//!
//! The descriptor grammar is not parsed. Quoted strings that look like asset
//! paths are treated as literal references, and quoted strings containing `*`
//! as glob patterns over a single directory.

use std::fmt;
use std::fs;

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::VerifyError;
use crate::layout::ThemeLayout;

lazy_static! {
    static ref LITERAL_REF_RE: Regex =
        Regex::new(r#""([^*"\n]+\.(?:png|jpg|jpeg|tga|pf2|ttf))""#).expect("literal regex is valid");
    static ref PATTERN_REF_RE: Regex =
        Regex::new(r#""([^"\n]*\*[^"\n]*)""#).expect("pattern regex is valid");
}

/// Quoted asset paths without wildcards, in file order
pub fn extract_literal_refs(content: &str) -> Vec<String> {
    LITERAL_REF_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Quoted strings containing `*`, in file order
pub fn extract_pattern_refs(content: &str) -> Vec<String> {
    PATTERN_REF_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Translate a file name glob into a regex matching whole names only
///
/// `*` matches any run of characters; everything else is literal.
pub fn glob_to_regex(glob: &str) -> Result<Regex, VerifyError> {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}$", body)).map_err(|source| VerifyError::Pattern {
        pattern: glob.to_string(),
        source,
    })
}

/// Why a reference did not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    /// Literal path does not exist
    File,
    /// No directory entry matched the pattern
    NoMatch,
    /// The pattern's directory does not exist
    DirMissing,
}

/// A reference that did not resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingReference {
    pub reference: String,
    pub kind: MissingKind,
}

impl fmt::Display for MissingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MissingKind::DirMissing => write!(f, "{} (dir missing)", self.reference),
            MissingKind::File | MissingKind::NoMatch => write!(f, "{}", self.reference),
        }
    }
}

/// Outcome of a full scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Literal references checked
    pub literal_refs: Vec<String>,
    /// Pattern references checked
    pub pattern_refs: Vec<String>,
    /// Unresolved references, literals first
    pub missing: Vec<MissingReference>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }

    /// Process exit code: 0 on pass, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Checks a theme descriptor against the files next to it
pub struct ThemeVerifier {
    layout: ThemeLayout,
}

impl ThemeVerifier {
    pub fn new(layout: ThemeLayout) -> Self {
        Self { layout }
    }

    /// Scan `theme.txt` and check every reference
    pub fn verify(&self) -> Result<VerificationReport, VerifyError> {
        let descriptor = self.layout.descriptor_path();
        if !descriptor.is_file() {
            return Err(VerifyError::DescriptorMissing(descriptor));
        }
        let content = fs::read_to_string(&descriptor)?;

        let mut report = VerificationReport {
            literal_refs: extract_literal_refs(&content),
            pattern_refs: extract_pattern_refs(&content),
            missing: Vec::new(),
        };
        log::debug!(
            "{}: {} literal and {} pattern references",
            descriptor.display(),
            report.literal_refs.len(),
            report.pattern_refs.len()
        );

        for reference in &report.literal_refs {
            if !self.layout.resolve(reference).exists() {
                report.missing.push(MissingReference {
                    reference: reference.clone(),
                    kind: MissingKind::File,
                });
            }
        }

        for pattern in &report.pattern_refs {
            if let Some(kind) = self.check_pattern(pattern)? {
                report.missing.push(MissingReference {
                    reference: pattern.clone(),
                    kind,
                });
            }
        }

        Ok(report)
    }

    fn check_pattern(&self, pattern: &str) -> Result<Option<MissingKind>, VerifyError> {
        let (dir, glob) = pattern.rsplit_once('/').unwrap_or(("", pattern));
        let search_dir = self.layout.resolve(dir);
        if !search_dir.is_dir() {
            return Ok(Some(MissingKind::DirMissing));
        }

        let regex = glob_to_regex(glob)?;
        for entry in fs::read_dir(&search_dir)? {
            if regex.is_match(&entry?.file_name().to_string_lossy()) {
                return Ok(None);
            }
        }

        log::info!(
            "Pattern {} (regex {}) not found in {}",
            pattern,
            regex.as_str(),
            search_dir.display()
        );
        Ok(Some(MissingKind::NoMatch))
    }
}
