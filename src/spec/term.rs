//! Parsed specification terms

/// One parsed unit of a highlight specification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A literal word (in regex mode the word itself is a regular expression)
    Literal { text: String },
    /// A slash-delimited pattern whose capture groups are highlighted
    Pattern {
        /// Pattern source with delimiters stripped
        source: String,
        /// The `/…/` fragment as it appeared in the specification
        raw: String,
    },
}

impl Term {
    pub fn literal(text: impl Into<String>) -> Self {
        Term::Literal { text: text.into() }
    }

    pub fn pattern(source: impl Into<String>) -> Self {
        let source = source.into();
        let raw = format!("/{}/", source);
        Term::Pattern { source, raw }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Term::Pattern { .. })
    }

    /// The form shown in the edit prompt: literal text, or the `/…/` fragment
    pub fn display(&self) -> &str {
        match self {
            Term::Literal { text } => text,
            Term::Pattern { raw, .. } => raw,
        }
    }
}

/// Join term display forms with single spaces
pub fn to_display_string(terms: &[Term]) -> String {
    terms
        .iter()
        .map(Term::display)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop repeated terms, keeping the first occurrence's position
pub fn dedup_terms(terms: Vec<Term>) -> Vec<Term> {
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
