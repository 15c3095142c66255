use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an exercise is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Weight x reps
    Repetition,
    /// Distance x time
    Endurance,
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Modality::Repetition => "repetition",
            Modality::Endurance => "endurance",
        })
    }
}

impl std::str::FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "repetition" | "reps" | "strength" => Ok(Modality::Repetition),
            "endurance" | "cardio" => Ok(Modality::Endurance),
            _ => Err(format!("Invalid modality: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// Reusable exercise definition referenced by logged exercises and goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub modality: Modality,
    pub is_hidden: bool,
    pub is_custom: bool,
}

impl ExerciseTemplate {
    /// Create a user-defined template
    pub fn new(name: String, category_id: Option<Uuid>, modality: Modality) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            category_id,
            modality,
            is_hidden: false,
            is_custom: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        !self.is_hidden
    }
}

/// Find a template by id, or by case-insensitive name when `key` is not a UUID
pub fn find_template<'a>(
    templates: &'a [ExerciseTemplate],
    key: &str,
) -> Option<&'a ExerciseTemplate> {
    if let Ok(id) = key.parse::<Uuid>() {
        return templates.iter().find(|t| t.id == id);
    }

    templates
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(key.trim()))
}
