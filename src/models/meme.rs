use serde::{Deserialize, Serialize};

use crate::db::Patch;
use crate::validation::{FieldViolation, Rule, Validate, Validator};

pub const MEME_TYPES: &[&str] = &["img", "yt", "mp4", "webm"];

const NAME: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(100)];
const CATEGORY_ID: &[Rule] = &[Rule::Required];
const TYPE: &[Rule] = &[Rule::Required, Rule::OneOf(MEME_TYPES)];
const SRC: &[Rule] = &[Rule::Required, Rule::Min(1)];

const OPT_TYPE: &[Rule] = &[Rule::OneOf(MEME_TYPES)];
const OPT_SRC: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeCategory {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A category together with its memes, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeCategoryWithMemes {
    pub id: String,
    pub name: String,
    pub memes: Vec<Meme>,
    pub created_at: String,
}

impl MemeCategoryWithMemes {
    pub fn new(category: MemeCategory, memes: Vec<Meme>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            memes,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
    pub id: String,
    pub category_id: String,
    #[serde(rename = "type")]
    pub meme_type: String,
    pub src: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateMemeCategoryRequest {
    pub name: String,
}

impl Validate for CreateMemeCategoryRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new().field("name", &self.name, NAME).finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateMemeRequest {
    pub category_id: String,
    #[serde(rename = "type")]
    pub meme_type: String,
    pub src: String,
}

impl Validate for CreateMemeRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("category_id", &self.category_id, CATEGORY_ID)
            .field("type", &self.meme_type, TYPE)
            .field("src", &self.src, SRC)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMemeRequest {
    pub category_id: Patch<String>,
    #[serde(rename = "type")]
    pub meme_type: Patch<String>,
    pub src: Patch<String>,
}

impl Validate for UpdateMemeRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("type", &self.meme_type, OPT_TYPE)
            .field("src", &self.src, OPT_SRC)
            .finish()
    }
}
