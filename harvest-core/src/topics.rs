use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed catalog at {location}: expected {expected}")]
    Shape { location: String, expected: &'static str },
}

/// One topic to crawl, with its 1-based position inside its subcategory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub category: String,
    pub subcategory: String,
    pub topic: String,
    pub index: usize,
}

/// `{"category": {"subcategory": ["topic", ...]}}`, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    entries: Vec<TopicEntry>,
}

impl TopicCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let root: Value = serde_json::from_str(json)?;
        let categories = root.as_object().ok_or(CatalogError::Shape {
            location: "root".to_string(),
            expected: "an object of categories",
        })?;

        let mut entries = Vec::new();
        for (category, subcategories) in categories {
            let subcategories = subcategories.as_object().ok_or_else(|| CatalogError::Shape {
                location: category.clone(),
                expected: "an object of subcategories",
            })?;

            for (subcategory, topics) in subcategories {
                let location = format!("{} > {}", category, subcategory);
                let topics = topics.as_array().ok_or_else(|| CatalogError::Shape {
                    location: location.clone(),
                    expected: "an array of topics",
                })?;

                for (i, topic) in topics.iter().enumerate() {
                    let topic = topic.as_str().ok_or_else(|| CatalogError::Shape {
                        location: format!("{} [{}]", location, i),
                        expected: "a topic string",
                    })?;
                    entries.push(TopicEntry {
                        category: category.clone(),
                        subcategory: subcategory.clone(),
                        topic: topic.to_string(),
                        index: i + 1,
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TopicEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of topics in the entry's subcategory
    pub fn subcategory_len(&self, entry: &TopicEntry) -> usize {
        self.entries
            .iter()
            .filter(|e| e.category == entry.category && e.subcategory == entry.subcategory)
            .count()
    }
}
