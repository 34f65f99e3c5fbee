use serde::{Deserialize, Serialize};

/// One queried element: trimmed visible text and its `href`, already absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: Option<String>,
}

impl Link {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            href: href.map(str::to_string),
        }
    }

    /// The href, treating an empty attribute as absent.
    pub fn target(&self) -> Option<&str> {
        self.href.as_deref().filter(|href| !href.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityRecord {
    pub category: String,
    pub name: String,
    pub url: String,
}

/// Row of the university table as consumed by the program scraper.
/// Only `name` and `url` are required; other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UniversityRow {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    pub university_name: String,
    pub university_url: String,
    pub program_name: String,
    pub program_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedUniversity {
    pub university_name: String,
    pub university_url: String,
}

impl From<&UniversityRow> for UnresolvedUniversity {
    fn from(row: &UniversityRow) -> Self {
        Self {
            university_name: row.name.clone(),
            university_url: row.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub universities: Vec<UniversityRecord>,
    pub categories_seen: usize,
    pub failed_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramReport {
    pub programs: Vec<ProgramRecord>,
    pub unresolved: Vec<UnresolvedUniversity>,
}

impl ProgramReport {
    pub fn mark_unresolved(&mut self, row: &UniversityRow) {
        self.unresolved.push(UnresolvedUniversity::from(row));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Rows or certificates produced.
    pub records: usize,
    /// Files written, in order.
    pub outputs: Vec<String>,
}
