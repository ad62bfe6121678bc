//! Keyword taxonomy: an ordered mapping from category name to sub-keywords,
//! persisted as a flat YAML document.
//!
//! Category order is significant: the pipeline processes categories in the
//! order they appear here, and the dedup tie-break depends on that order.
//! The persisted file is human-editable; every mutation rewrites it in full.
//!
//! A missing or corrupt file falls back to [`Taxonomy::default`], the
//! built-in retailer/product/market-trend keyword sets.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by taxonomy mutations and persistence.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    /// A keyword mutation named a category that does not exist. This is a
    /// caller bug, not a data condition, so it is surfaced instead of
    /// silently ignored.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("failed to write taxonomy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize taxonomy: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One category: a name plus its ordered sub-keywords.
///
/// Keywords within a category are unique (exact match); the same keyword
/// may appear under several categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

/// The full keyword taxonomy, in persisted (insertion) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    pub categories: Vec<Category>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let defaults: &[(&str, &[&str])] = &[
            ("대형마트", &["홈플러스", "이마트", "롯데마트", "코스트코"]),
            ("편의점", &["GS25", "CU", "세븐일레븐", "이마트24"]),
            ("육가공", &["육가공", "햄", "소시지", "베이컨"]),
            ("간편식", &["HMR", "밀키트", "냉동식품", "즉석식품"]),
            ("시장동향", &["가격인상", "원가", "물가", "소비 트렌드"]),
            ("대체식품", &["대체육", "식물성 식품", "비건"]),
        ];

        Taxonomy {
            categories: defaults
                .iter()
                .map(|(name, keywords)| Category {
                    name: name.to_string(),
                    keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl Taxonomy {
    /// Look up a category by exact name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|category| category.name == name)
    }

    /// Every keyword across the whole taxonomy, flattened in category order.
    /// A keyword listed under several categories appears once per listing;
    /// the scoring pass counts each occurrence.
    pub fn flattened_keywords(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|category| category.keywords.iter().cloned())
            .collect()
    }

    /// Insert an empty category. Returns `true` if the taxonomy changed.
    pub fn add_category(&mut self, name: &str) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.categories.push(Category {
            name: name.to_string(),
            keywords: Vec::new(),
        });
        true
    }

    /// Remove a category if present. Returns `true` if the taxonomy changed.
    pub fn remove_category(&mut self, name: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|category| category.name != name);
        self.categories.len() != before
    }

    /// Append a keyword to an existing category, preserving insertion order.
    /// Returns `true` if the taxonomy changed.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::UnknownCategory`] if the category does not exist.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, TaxonomyError> {
        let entry = self
            .get_mut(category)
            .ok_or_else(|| TaxonomyError::UnknownCategory(category.to_string()))?;
        if entry.keywords.iter().any(|existing| existing == keyword) {
            return Ok(false);
        }
        entry.keywords.push(keyword.to_string());
        Ok(true)
    }

    /// Remove a keyword if present. An absent category or keyword is a
    /// no-op, not an error. Returns `true` if the taxonomy changed.
    pub fn remove_keyword(&mut self, category: &str, keyword: &str) -> bool {
        let Some(entry) = self.get_mut(category) else {
            return false;
        };
        let before = entry.keywords.len();
        entry.keywords.retain(|existing| existing != keyword);
        entry.keywords.len() != before
    }
}

// Persisted shape is a plain YAML mapping of name -> keyword list, which
// keeps the file hand-editable. Serde's derived map types would lose the
// category order, so (de)serialization goes through the entry list.
impl Serialize for Taxonomy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(&category.name, &category.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Taxonomy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TaxonomyVisitor;

        impl<'de> Visitor<'de> for TaxonomyVisitor {
            type Value = Taxonomy;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a mapping of category name to keyword list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Taxonomy, A::Error> {
                let mut categories = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, keywords)) = access.next_entry::<String, Vec<String>>()? {
                    categories.push(Category { name, keywords });
                }
                Ok(Taxonomy { categories })
            }
        }

        deserializer.deserialize_map(TaxonomyVisitor)
    }
}

/// File-backed store for the taxonomy.
///
/// There is a single operator and no concurrent writers; the only
/// discipline applied is a temp-file-plus-rename on save so a partial
/// write never replaces the previous file.
#[derive(Debug)]
pub struct TaxonomyStore {
    path: PathBuf,
}

impl TaxonomyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TaxonomyStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted taxonomy. A missing or unreadable file and a
    /// corrupt document both fall back to the built-in default; `load`
    /// never fails.
    pub fn load(&self) -> Taxonomy {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                info!(path = %self.path.display(), error = %e, "No taxonomy file; using built-in default");
                return Taxonomy::default();
            }
        };

        match serde_yaml::from_str::<Taxonomy>(&text) {
            Ok(taxonomy) => {
                info!(
                    path = %self.path.display(),
                    categories = taxonomy.categories.len(),
                    "Loaded taxonomy"
                );
                taxonomy
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt taxonomy file; using built-in default");
                Taxonomy::default()
            }
        }
    }

    /// Serialize the full taxonomy over the persisted file.
    pub fn save(&self, taxonomy: &Taxonomy) -> Result<(), TaxonomyError> {
        let yaml = serde_yaml::to_string(taxonomy)?;

        let tmp_path = self.path.with_extension("yaml.tmp");
        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &self.path)?;
        info!(path = %self.path.display(), categories = taxonomy.categories.len(), "Saved taxonomy");
        Ok(())
    }

    /// Insert an empty category and persist if anything changed.
    pub fn add_category(&self, taxonomy: &mut Taxonomy, name: &str) -> Result<(), TaxonomyError> {
        if taxonomy.add_category(name) {
            self.save(taxonomy)?;
        }
        Ok(())
    }

    /// Remove a category and persist if anything changed.
    pub fn remove_category(&self, taxonomy: &mut Taxonomy, name: &str) -> Result<(), TaxonomyError> {
        if taxonomy.remove_category(name) {
            self.save(taxonomy)?;
        }
        Ok(())
    }

    /// Append a keyword to a category and persist if anything changed.
    ///
    /// # Errors
    ///
    /// [`TaxonomyError::UnknownCategory`] if the category does not exist.
    pub fn add_keyword(
        &self,
        taxonomy: &mut Taxonomy,
        category: &str,
        keyword: &str,
    ) -> Result<(), TaxonomyError> {
        if taxonomy.add_keyword(category, keyword)? {
            self.save(taxonomy)?;
        }
        Ok(())
    }

    /// Remove a keyword from a category and persist if anything changed.
    pub fn remove_keyword(
        &self,
        taxonomy: &mut Taxonomy,
        category: &str,
        keyword: &str,
    ) -> Result<(), TaxonomyError> {
        if taxonomy.remove_keyword(category, keyword) {
            self.save(taxonomy)?;
        }
        Ok(())
    }
}
