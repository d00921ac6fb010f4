use serde::{Deserialize, Serialize};

use crate::validation::{FieldViolation, Rule, Validate, Validator};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

const NAME: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(200)];
const EMAIL: &[Rule] = &[Rule::Required, Rule::Email];
const MESSAGE: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(5000)];
const SUBJECT: &[Rule] = &[Rule::OmitEmpty, Rule::Max(200)];

/// A contact form submission. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub subject: Option<String>,
}

impl Validate for CreateContactRequest {
    fn validate(&self) -> Vec<FieldViolation> {
        Validator::new()
            .field("name", &self.name, NAME)
            .field("email", &self.email, EMAIL)
            .field("message", &self.message, MESSAGE)
            .field("subject", &self.subject, SUBJECT)
            .finish()
    }
}

/// Raw `page` / `page_size` query parameters.
///
/// Kept as strings so that garbage falls back to the defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Resolved, in-range pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Clamp raw values to the allowed ranges, falling back to defaults.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let page_size = page_size
            .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    /// Rows to skip; saturates for pages far past the end.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Pagination::new(parse(&query.page), parse(&query.page_size))
    }
}

/// One page of contacts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl ContactPage {
    pub fn new(contacts: Vec<Contact>, total: i64, pagination: Pagination) -> Self {
        let total_pages = (total + pagination.page_size - 1) / pagination.page_size;
        Self {
            contacts,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages,
        }
    }
}
