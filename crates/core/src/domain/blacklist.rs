// Blacklist Filter - whole-word exclusion rules for titles and companies

use super::error::{DomainError, Result};
use regex::Regex;

/// One compiled exclusion rule
///
/// Built from a literal term: escaped, case-insensitive, anchored on word boundaries so
/// `AI` matches "AI Engineer" but not "Maintainer".
#[derive(Debug, Clone)]
pub struct BlacklistPattern {
    term: String,
    regex: Regex,
}

impl BlacklistPattern {
    pub fn compile(term: &str) -> Result<Self> {
        let term = term.trim();
        let regex = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term))).map_err(|e| {
            DomainError::InvalidBlacklistTerm {
                term: term.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            term: term.to_string(),
            regex,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compile literal terms into patterns, ignoring blank entries
pub fn compile(terms: &[String]) -> Result<Vec<BlacklistPattern>> {
    terms
        .iter()
        .filter(|term| !term.trim().is_empty())
        .map(|term| BlacklistPattern::compile(term))
        .collect()
}

/// True when any pattern matches the text
pub fn is_blacklisted(text: &str, patterns: &[BlacklistPattern]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(text))
}

/// Title and company pattern sets, applied independently
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    title_patterns: Vec<BlacklistPattern>,
    company_patterns: Vec<BlacklistPattern>,
}

impl Blacklist {
    pub fn compile(title_terms: &[String], company_terms: &[String]) -> Result<Self> {
        Ok(Self {
            title_patterns: compile(title_terms)?,
            company_patterns: compile(company_terms)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title_patterns.is_empty() && self.company_patterns.is_empty()
    }

    /// The first pattern matching either field, for logging
    pub fn matching_term(&self, title: &str, company: &str) -> Option<&str> {
        self.title_patterns
            .iter()
            .find(|p| p.is_match(title))
            .or_else(|| self.company_patterns.iter().find(|p| p.is_match(company)))
            .map(BlacklistPattern::term)
    }

    /// Rejected if the title matches a title pattern OR the company a company pattern
    pub fn is_blacklisted(&self, title: &str, company: &str) -> bool {
        is_blacklisted(title, &self.title_patterns) || is_blacklisted(company, &self.company_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_whole_word_match() {
        let patterns = compile(&terms(&["AI"])).unwrap();

        assert!(is_blacklisted("AI Engineer", &patterns));
        assert!(!is_blacklisted("Maintainer", &patterns));
    }

    #[test]
    fn test_case_insensitive() {
        let patterns = compile(&terms(&["senior"])).unwrap();

        assert!(is_blacklisted("SENIOR Backend Developer", &patterns));
        assert!(is_blacklisted("Backend Developer (Senior)", &patterns));
        assert!(!is_blacklisted("Seniority-free role", &patterns));
    }

    #[test]
    fn test_terms_are_escaped() {
        let patterns = compile(&terms(&["node.js"])).unwrap();

        assert!(is_blacklisted("Node.js Developer", &patterns));
        assert!(!is_blacklisted("Nodexjs Developer", &patterns));
    }

    #[test]
    fn test_blank_terms_are_ignored() {
        let patterns = compile(&terms(&["", "   "])).unwrap();
        assert!(patterns.is_empty());
        assert!(!is_blacklisted("anything", &patterns));
    }

    #[test]
    fn test_title_or_company() {
        let blacklist = Blacklist::compile(&terms(&["Intern"]), &terms(&["Acme"])).unwrap();

        assert!(blacklist.is_blacklisted("Intern Developer", "Globex"));
        assert!(blacklist.is_blacklisted("Rust Developer", "Acme Corp"));
        assert!(!blacklist.is_blacklisted("Rust Developer", "Globex"));
        // Title patterns are never applied to the company and vice versa
        assert!(!blacklist.is_blacklisted("Acme Developer", "Intern Corp"));
        assert_eq!(blacklist.matching_term("Rust Developer", "Acme Corp"), Some("Acme"));
    }
}
