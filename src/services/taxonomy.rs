use std::collections::HashSet;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::{Category, ExerciseTemplate, Modality};
use crate::storage::{Entity, WorkoutStore};

const DEFAULT_TAXONOMY: &str = include_str!("../../data/default_taxonomy.json");

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Vec<Category>,
    templates: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    id: Uuid,
    name: String,
    category: Uuid,
    modality: Modality,
}

/// Standard categories and exercise templates shipped with the app
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub categories: Vec<Category>,
    pub templates: Vec<ExerciseTemplate>,
}

impl Taxonomy {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: TaxonomyFile = serde_json::from_str(json)?;

        let templates = file
            .templates
            .into_iter()
            .map(|entry| ExerciseTemplate {
                id: entry.id,
                name: entry.name,
                category_id: Some(entry.category),
                modality: entry.modality,
                is_hidden: false,
                is_custom: false,
            })
            .collect();

        Ok(Self {
            categories: file.categories,
            templates,
        })
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }
}

pub fn default_taxonomy() -> Result<Taxonomy, serde_json::Error> {
    Taxonomy::from_json(DEFAULT_TAXONOMY)
}

/// Counts of records added by `seed_defaults`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub templates: usize,
}

/// Insert any standard category or template the store does not have yet,
/// then save once. Existing records (including user edits) are left alone.
pub fn seed_defaults<S: WorkoutStore>(store: &mut S) -> Result<SeedReport, StorageError> {
    let taxonomy =
        default_taxonomy().map_err(|e| StorageError::Serialization(e.to_string()))?;
    seed_taxonomy(store, taxonomy)
}

pub fn seed_taxonomy<S: WorkoutStore>(
    store: &mut S,
    taxonomy: Taxonomy,
) -> Result<SeedReport, StorageError> {
    let known_categories: HashSet<Uuid> =
        store.fetch_categories()?.into_iter().map(|c| c.id).collect();
    let known_templates: HashSet<Uuid> =
        store.fetch_templates()?.into_iter().map(|t| t.id).collect();

    let mut report = SeedReport::default();

    for category in taxonomy.categories {
        if !known_categories.contains(&category.id) {
            store.insert(Entity::Category(category));
            report.categories += 1;
        }
    }

    for template in taxonomy.templates {
        if !known_templates.contains(&template.id) {
            store.insert(Entity::Template(template));
            report.templates += 1;
        }
    }

    if report != SeedReport::default() {
        store.save()?;
        info!(
            "Seeded {} categories and {} templates",
            report.categories, report.templates
        );
    }

    Ok(report)
}
