use serde::{Deserialize, Serialize};

use crate::db::Patch;
use crate::validation::{FieldViolation, Rule, Validate, Validator};

const MEDIA: &[Rule] = &[Rule::Required, Rule::Min(1)];
const MIMETYPE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(100)];
const TITLE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(500)];
const DESCRIPTION: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(1000)];

const OPT_MEDIA: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1)];
const OPT_MIMETYPE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(100)];
const OPT_TITLE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(500)];
const OPT_DESCRIPTION: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(1000)];

/// A short media story (image or video with a caption).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub media: String,
    pub mimetype: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateStoryRequest {
    pub media: String,
    pub mimetype: String,
    pub title: String,
    pub description: String,
}

impl Validate for CreateStoryRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("media", &self.media, MEDIA)
            .field("mimetype", &self.mimetype, MIMETYPE)
            .field("title", &self.title, TITLE)
            .field("description", &self.description, DESCRIPTION)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStoryRequest {
    pub media: Patch<String>,
    pub mimetype: Patch<String>,
    pub title: Patch<String>,
    pub description: Patch<String>,
}

impl Validate for UpdateStoryRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("media", &self.media, OPT_MEDIA)
            .field("mimetype", &self.mimetype, OPT_MIMETYPE)
            .field("title", &self.title, OPT_TITLE)
            .field("description", &self.description, OPT_DESCRIPTION)
            .finish()
    }
}
