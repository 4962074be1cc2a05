use serde::{Deserialize, Serialize};

/// The taxon whose occurrences are requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonQuery {
    pub genus: String,
    pub species: String,
    /// Additional accepted names queried alongside the binomial
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl TaxonQuery {
    pub fn new(genus: impl Into<String>, species: impl Into<String>) -> Self {
        Self { genus: genus.into(), species: species.into(), synonyms: Vec::new() }
    }

    /// Add a synonym to query
    pub fn with_synonym(mut self, name: impl Into<String>) -> Self {
        self.synonyms.push(name.into());
        self
    }

    /// The binomial, e.g. "Taricha sierrae"
    pub fn binomial(&self) -> String {
        format!("{} {}", self.genus.trim(), self.species.trim())
    }

    /// Every name to query, binomial first, without repeats
    pub fn names(&self) -> Vec<String> {
        let mut names = vec![self.binomial()];
        for synonym in &self.synonyms {
            let synonym = synonym.trim();
            if !synonym.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(synonym)) {
                names.push(synonym.to_string());
            }
        }
        names
    }
}

impl Default for TaxonQuery {
    fn default() -> Self {
        Self::new("Taricha", "sierrae").with_synonym("Taricha torosa sierrae")
    }
}
