//! Bootcamp model with its owned modules.

use serde::{Deserialize, Serialize};

use crate::db::Patch;
use crate::validation::{FieldViolation, Rule, Validate, Validator};

pub const BOOTCAMP_STATUSES: &[&str] = &["active", "upcoming", "completed"];

const TITLE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(200)];
const SUBTITLE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(300)];
const TEXT: &[Rule] = &[Rule::Required, Rule::Min(1)];
const DURATION: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(50)];
const LEVEL: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(100)];
const PRICE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(50)];
const REQUIRED_LIST: &[Rule] = &[Rule::Required, Rule::Min(1)];
const STATUS: &[Rule] = &[Rule::Required, Rule::OneOf(BOOTCAMP_STATUSES)];
const ENROLLED: &[Rule] = &[Rule::Gte(0)];
const RATING: &[Rule] = &[Rule::OmitEmpty, Rule::Gte(0), Rule::Lte(5)];

const OPT_TITLE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(200)];
const OPT_SUBTITLE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(300)];
const OPT_TEXT: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1)];
const OPT_DURATION: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(50)];
const OPT_LEVEL: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(100)];
const OPT_PRICE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(50)];
const OPT_LIST: &[Rule] = &[Rule::Min(1)];
const OPT_STATUS: &[Rule] = &[Rule::OneOf(BOOTCAMP_STATUSES)];
const OPT_ENROLLED: &[Rule] = &[Rule::Gte(0)];

/// A module of a bootcamp curriculum. Owned by exactly one bootcamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootcampModule {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub topics: Vec<String>,
}

impl Validate for BootcampModule {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("title", &self.title, TITLE)
            .field("description", &self.description, TEXT)
            .field("duration", &self.duration, DURATION)
            .field("topics", &self.topics, REQUIRED_LIST)
            .finish()
    }
}

/// A bootcamp as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bootcamp {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub long_description: String,
    pub tech_stack: Vec<String>,
    pub duration: String,
    pub level: String,
    pub price: String,
    pub highlights: Vec<String>,
    pub modules: Vec<BootcampModule>,
    pub project_features: Vec<String>,
    pub target_audience: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    pub status: String,
    pub enrolled_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a bootcamp.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateBootcampRequest {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub long_description: String,
    pub tech_stack: Vec<String>,
    pub duration: String,
    pub level: String,
    pub price: String,
    pub highlights: Vec<String>,
    pub modules: Vec<BootcampModule>,
    pub project_features: Vec<String>,
    pub target_audience: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub github_repo: Option<String>,
    pub demo_url: Option<String>,
    pub status: String,
    pub enrolled_count: i64,
    pub rating: Option<f64>,
}

impl Validate for CreateBootcampRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        let mut validator = Validator::new()
            .field("title", &self.title, TITLE)
            .field("subtitle", &self.subtitle, SUBTITLE)
            .field("description", &self.description, TEXT)
            .field("long_description", &self.long_description, TEXT)
            .field("tech_stack", &self.tech_stack, REQUIRED_LIST)
            .field("duration", &self.duration, DURATION)
            .field("level", &self.level, LEVEL)
            .field("price", &self.price, PRICE)
            .field("highlights", &self.highlights, REQUIRED_LIST)
            .field("modules", &self.modules, REQUIRED_LIST)
            .field("project_features", &self.project_features, REQUIRED_LIST)
            .field("target_audience", &self.target_audience, REQUIRED_LIST)
            .field("status", &self.status, STATUS)
            .field("enrolled_count", &self.enrolled_count, ENROLLED)
            .field("rating", &self.rating, RATING);

        for (i, module) in self.modules.iter().enumerate() {
            validator = validator.nested(&format!("modules[{}]", i), module.validate());
        }
        validator.finish()
    }
}

/// Request body for a partial bootcamp update. Absent fields are left untouched;
/// a present `modules` list replaces the whole module set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBootcampRequest {
    pub title: Patch<String>,
    pub subtitle: Patch<String>,
    pub description: Patch<String>,
    pub long_description: Patch<String>,
    pub tech_stack: Patch<Vec<String>>,
    pub duration: Patch<String>,
    pub level: Patch<String>,
    pub price: Patch<String>,
    pub highlights: Patch<Vec<String>>,
    pub modules: Patch<Vec<BootcampModule>>,
    pub project_features: Patch<Vec<String>>,
    pub target_audience: Patch<Vec<String>>,
    pub images: Patch<Vec<String>>,
    pub videos: Patch<Vec<String>>,
    pub github_repo: Patch<String>,
    pub demo_url: Patch<String>,
    pub status: Patch<String>,
    pub enrolled_count: Patch<i64>,
    pub rating: Patch<f64>,
}

impl Validate for UpdateBootcampRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        let mut validator = Validator::new()
            .field("title", &self.title, OPT_TITLE)
            .field("subtitle", &self.subtitle, OPT_SUBTITLE)
            .field("description", &self.description, OPT_TEXT)
            .field("long_description", &self.long_description, OPT_TEXT)
            .field("tech_stack", &self.tech_stack, OPT_LIST)
            .field("duration", &self.duration, OPT_DURATION)
            .field("level", &self.level, OPT_LEVEL)
            .field("price", &self.price, OPT_PRICE)
            .field("highlights", &self.highlights, OPT_LIST)
            .field("modules", &self.modules, OPT_LIST)
            .field("project_features", &self.project_features, OPT_LIST)
            .field("target_audience", &self.target_audience, OPT_LIST)
            .field("status", &self.status, OPT_STATUS)
            .field("enrolled_count", &self.enrolled_count, OPT_ENROLLED)
            .field("rating", &self.rating, RATING);

        if let Some(modules) = self.modules.as_option() {
            for (i, module) in modules.iter().enumerate() {
                validator = validator.nested(&format!("modules[{}]", i), module.validate());
            }
        }
        validator.finish()
    }
}
