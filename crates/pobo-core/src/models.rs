//! Core data types shared by the loader, the gateway, and the responder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of knowledge categories, used for optional query filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Experience,
    Skills,
    Projects,
    Education,
    Contact,
    Achievements,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Experience,
        Category::Skills,
        Category::Projects,
        Category::Education,
        Category::Contact,
        Category::Achievements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Experience => "experience",
            Category::Skills => "skills",
            Category::Projects => "projects",
            Category::Education => "education",
            Category::Contact => "contact",
            Category::Achievements => "achievements",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}': expected one of experience, skills, projects, education, contact, achievements",
                    s
                )
            })
    }
}

/// One atomic résumé fact, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Stable identifier, unique across the knowledge base (e.g. `"exp-cognizant"`).
    pub id: String,
    pub text: String,
    pub category: Category,
    /// Human-readable provenance label.
    pub source: String,
    /// RFC 3339 timestamp of when the record set was built.
    pub timestamp: String,
}

impl KnowledgeRecord {
    /// The metadata copy attached to this record's vector.
    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            text: self.text.clone(),
            category: self.category,
            source: self.source.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Typed metadata stored next to every vector so matches are self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub text: String,
    pub category: Category,
    pub source: String,
    pub timestamp: String,
}

/// A vector ready for upsert. `id` equals the originating record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

/// A query hit. `score` is the store's native similarity; higher is more relevant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    pub metadata: RecordMetadata,
}

/// Collection diagnostics reported by `describe_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub record_count: u64,
    pub dimension: usize,
}

/// Metadata predicate for vector queries.
///
/// Only category membership is supported; an empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub categories: Vec<Category>,
}

impl MetadataFilter {
    pub fn category(category: Category) -> Self {
        Self {
            categories: vec![category],
        }
    }

    pub fn matches(&self, metadata: &RecordMetadata) -> bool {
        self.categories.contains(&metadata.category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchange in a client-held conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }
}
