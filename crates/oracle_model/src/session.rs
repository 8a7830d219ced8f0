use crate::category::ResponseTable;
use crate::CategoryId;

/// Transient state of one widget instance. Never persisted.
#[derive(Clone, PartialEq, Debug)]
pub struct SessionState {
    pub question_text: String,
    /// Always a key of the table the session was created with.
    pub selected_category: CategoryId,
    pub last_response: String,
    pub is_busy: bool,
}

impl SessionState {
    /// Starts with `preferred` selected, or with the first category of the
    /// table when `preferred` is not one of its keys.
    pub fn new(table: &ResponseTable, preferred: &CategoryId) -> Self {
        let selected_category = if table.contains(preferred) {
            preferred.clone()
        } else {
            table.first_category().clone()
        };
        Self {
            question_text: Default::default(),
            selected_category,
            last_response: Default::default(),
            is_busy: false,
        }
    }

    /// Trimmed question, `None` when there is nothing to ask.
    pub fn question(&self) -> Option<&str> {
        let q = self.question_text.trim();
        if q.is_empty() {
            None
        } else {
            Some(q)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn table() -> ResponseTable {
        ResponseTable::new(vec![
            Category::new("romance", "Romance", &["Yes."]),
            Category::new("career", "Career", &["Go."]),
        ])
        .unwrap()
    }

    #[test]
    fn new_session_keeps_known_preferred_category() {
        let session = SessionState::new(&table(), &CategoryId::from("career"));
        assert_eq!(session.selected_category, CategoryId::from("career"));
        assert!(!session.is_busy);
        assert!(session.last_response.is_empty());
    }

    #[test]
    fn new_session_falls_back_to_first_category() {
        let session = SessionState::new(&table(), &CategoryId::from("health"));
        assert_eq!(session.selected_category, CategoryId::from("romance"));
    }

    #[test]
    fn blank_question_is_none() {
        let mut session = SessionState::new(&table(), &CategoryId::from("romance"));
        session.question_text = " \t\n ".into();
        assert_eq!(session.question(), None);
        session.question_text = "  Will I find love? ".into();
        assert_eq!(session.question(), Some("Will I find love?"));
    }
}
