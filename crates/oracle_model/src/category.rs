use std::collections::HashSet;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CategoryId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub responses: Vec<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, label: &str, responses: &[&str]) -> Self {
        Category {
            id: id.into(),
            label: Some(label.to_string()),
            responses: responses.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn display_name(&self) -> &str {
        if let Some(label) = self.label.as_ref() {
            return label;
        }
        self.id.as_str()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Unknown category `{0}`")]
    UnknownCategory(CategoryId),
    #[error("Category `{0}` has no responses")]
    EmptyCategory(CategoryId),
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Response table has no categories")]
    NoCategories,
    #[error("Category `{0}` is defined more than once")]
    DuplicateCategory(CategoryId),
}

/// Categories in presentation order, each with its candidate responses.
/// Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct ResponseTable(Vec<Category>);

impl ResponseTable {
    pub fn new(categories: Vec<Category>) -> Result<Self, TableError> {
        if categories.is_empty() {
            return Err(TableError::NoCategories);
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(&category.id) {
                return Err(TableError::DuplicateCategory(category.id.clone()));
            }
            if category.responses.is_empty() {
                warn!("Category `{}` has no responses", category.id);
            }
        }
        Ok(ResponseTable(categories))
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.0.iter().find(|c| &c.id == id)
    }

    pub fn contains(&self, id: &CategoryId) -> bool {
        self.get(id).is_some()
    }

    /// Never fails: a table always holds at least one category.
    pub fn first_category(&self) -> &CategoryId {
        &self.0[0].id
    }

    /// Uniformly random response from the given category.
    pub fn pick<R>(&self, id: &CategoryId, rng: &mut R) -> Result<&str, SelectionError>
    where
        R: Rng + ?Sized,
    {
        let category = self
            .get(id)
            .ok_or_else(|| SelectionError::UnknownCategory(id.clone()))?;
        category
            .responses
            .choose(rng)
            .map(String::as_str)
            .ok_or_else(|| SelectionError::EmptyCategory(id.clone()))
    }
}

impl TryFrom<Vec<Category>> for ResponseTable {
    type Error = TableError;

    fn try_from(value: Vec<Category>) -> Result<Self, Self::Error> {
        ResponseTable::new(value)
    }
}

impl From<ResponseTable> for Vec<Category> {
    fn from(value: ResponseTable) -> Self {
        value.0
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        ResponseTable(make_default_categories())
    }
}

fn make_default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "romance",
            "Romance",
            &[
                "Love is closer than you think.",
                "Someone is already thinking of you.",
                "Your heart knows the answer.",
                "Not yet. Be patient.",
                "Take the first step.",
                "An old flame may return.",
            ],
        ),
        Category::new(
            "wealth",
            "Wealth",
            &[
                "Fortune favors the bold.",
                "Save today, shine tomorrow.",
                "An unexpected gain is coming.",
                "Spend wisely this month.",
                "The coins are not aligned. Wait.",
                "Your investment will pay off.",
            ],
        ),
        Category::new(
            "career",
            "Career",
            &[
                "A new opportunity is on the horizon.",
                "Ask for what you deserve.",
                "Hard work will be noticed.",
                "Now is not the time to change.",
                "Learn something new.",
                "Trust your instincts at work.",
            ],
        ),
    ]
}
