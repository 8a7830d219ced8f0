use std::fmt::Display;

use serde::{Deserialize, Serialize};

pub mod category;
pub mod session;

/// Shown when a question is submitted blank.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// Shown when no response could be selected for the submitted category.
pub const SELECTION_FAILURE_MESSAGE: &str = "Unable to generate a response. Please try again.";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, Hash, Default)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        CategoryId(value)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        CategoryId(value.to_string())
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_id_is_a_plain_string_in_yaml() {
        let id: CategoryId = serde_yaml::from_str("romance").unwrap();
        assert_eq!(id, CategoryId::from("romance"));
        assert_eq!(serde_yaml::to_string(&id).unwrap().trim(), "romance");
    }
}
