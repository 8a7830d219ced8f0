use oracle_model::category::Category;
use oracle_model::CategoryId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiCategory {
    pub id: CategoryId,
    pub name: String,
}

impl From<&Category> for UiCategory {
    fn from(value: &Category) -> Self {
        UiCategory {
            id: value.id.clone(),
            name: value.display_name().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub available_categories: Vec<UiCategory>,
    pub selected_category: CategoryId,
    pub question: String,
    pub response: String,
    pub is_busy: bool,
}
