use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFields {
    pub comment: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub id: String,
    pub text: String,
    pub fields: TermFields,
}

/// Body of a request to add a term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRequest {
    pub text: String,
    pub fields: TermFields,
}

impl TermRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: TermFields::default(),
        }
    }
}

/// Shared vocabulary workers insert into transcripts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Glossary {
    pub terms: Vec<GlossaryTerm>,
}

impl Glossary {
    pub fn new(terms: Vec<GlossaryTerm>) -> Self {
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms containing `query`, ignoring case. An empty query lists all.
    pub fn search(&self, query: &str) -> Vec<&GlossaryTerm> {
        let needle = query.to_lowercase();
        self.terms
            .iter()
            .filter(|t| t.text.to_lowercase().contains(&needle))
            .collect()
    }

    /// Whether `query` is new: non-empty and not an existing term verbatim.
    pub fn should_offer_add(&self, query: &str) -> bool {
        !query.is_empty() && !self.terms.iter().any(|t| t.text == query)
    }

    /// Adds `term`, replacing any term with the same id.
    pub fn insert(&mut self, term: GlossaryTerm) {
        match self.terms.iter_mut().find(|t| t.id == term.id) {
            Some(existing) => *existing = term,
            None => self.terms.push(term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn term(id: &str, text: &str) -> GlossaryTerm {
        GlossaryTerm {
            id: id.to_string(),
            text: text.to_string(),
            fields: TermFields::default(),
        }
    }

    fn glossary() -> Glossary {
        Glossary::new(vec![term("1", "Kubernetes"), term("2", "kubectl"), term("3", "Rust")])
    }

    #[rstest]
    #[case::empty("", 3)]
    #[case::case_insensitive("KUBE", 2)]
    #[case::substring("ust", 1)]
    #[case::no_match("python", 0)]
    fn test_search(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(glossary().search(query).len(), expected);
    }

    #[rstest]
    #[case::empty("", false)]
    #[case::existing("Rust", false)]
    #[case::different_case("rust", true)]
    #[case::new_term("Tokio", true)]
    fn test_should_offer_add(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(glossary().should_offer_add(query), expected);
    }

    #[test]
    fn test_insert_appends_or_replaces() {
        let mut g = glossary();
        g.insert(term("4", "Tokio"));
        assert_eq!(g.len(), 4);
        g.insert(term("3", "Rustc"));
        assert_eq!(g.len(), 4);
        assert_eq!(g.terms[2].text, "Rustc");
    }
}
