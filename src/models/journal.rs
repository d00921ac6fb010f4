use serde::{Deserialize, Serialize};

use crate::db::Patch;
use crate::validation::{FieldViolation, Rule, Validate, Validator};

const TITLE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(500)];
const BODY: &[Rule] = &[Rule::Required, Rule::Min(1)];
const SUMMARY: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(1000)];
const PUBLISHED_ON: &[Rule] = &[Rule::Required, Rule::Date];
const CATEGORY: &[Rule] = &[Rule::OmitEmpty, Rule::Max(100)];
const AUTHOR: &[Rule] = &[Rule::OmitEmpty, Rule::Max(200)];
const READ_TIME: &[Rule] = &[Rule::OmitEmpty, Rule::Max(50)];

const OPT_TITLE: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(500)];
const OPT_BODY: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1)];
const OPT_SUMMARY: &[Rule] = &[Rule::OmitEmpty, Rule::Min(1), Rule::Max(1000)];
const OPT_PUBLISHED_ON: &[Rule] = &[Rule::Date];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub body: String,
    pub summary: String,
    pub published_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateJournalRequest {
    pub title: String,
    pub body: String,
    pub summary: String,
    pub published_on: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
}

impl Validate for CreateJournalRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("title", &self.title, TITLE)
            .field("body", &self.body, BODY)
            .field("summary", &self.summary, SUMMARY)
            .field("published_on", &self.published_on, PUBLISHED_ON)
            .field("category", &self.category, CATEGORY)
            .field("author", &self.author, AUTHOR)
            .field("read_time", &self.read_time, READ_TIME)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateJournalRequest {
    pub title: Patch<String>,
    pub body: Patch<String>,
    pub summary: Patch<String>,
    pub published_on: Patch<String>,
    pub category: Patch<String>,
    pub tags: Patch<Vec<String>>,
    pub author: Patch<String>,
    pub read_time: Patch<String>,
}

impl Validate for UpdateJournalRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("title", &self.title, OPT_TITLE)
            .field("body", &self.body, OPT_BODY)
            .field("summary", &self.summary, OPT_SUMMARY)
            .field("published_on", &self.published_on, OPT_PUBLISHED_ON)
            .field("category", &self.category, CATEGORY)
            .field("author", &self.author, AUTHOR)
            .field("read_time", &self.read_time, READ_TIME)
            .finish()
    }
}
