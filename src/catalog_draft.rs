use serde::Serialize;

use crate::model::{Category, CategoryId};
use crate::slide_draft::now_timestamp;

/// Longest board title the API accepts
pub const MAX_BOARD_TITLE_LEN: usize = 30;
/// Longest board description the API accepts
pub const MAX_BOARD_DESCRIPTION_LEN: usize = 50;
/// Longest category title the API accepts
pub const MAX_CATEGORY_TITLE_LEN: usize = 30;

/// A board as typed by the user, for both creation and edits
#[derive(Debug, Clone)]
pub struct BoardDraft {
    pub title: String,
    pub description: String,
    pub category_id: CategoryId,
}

/// Request body for `POST /api/Boards` and `PUT /api/Boards/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardBody {
    pub board_title: String,
    pub board_description: String,
    pub category_id: CategoryId,
    pub board_status: bool,
}

impl BoardDraft {
    pub fn into_body(self) -> Result<BoardBody, String> {
        let title = self.title.trim();
        let description = self.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err("Board title and description are required".to_string());
        }
        if title.chars().count() > MAX_BOARD_TITLE_LEN {
            return Err(format!(
                "Board title must not exceed {} characters",
                MAX_BOARD_TITLE_LEN
            ));
        }
        if description.chars().count() > MAX_BOARD_DESCRIPTION_LEN {
            return Err(format!(
                "Board description must not exceed {} characters",
                MAX_BOARD_DESCRIPTION_LEN
            ));
        }
        Ok(BoardBody {
            board_title: title.to_string(),
            board_description: description.to_string(),
            category_id: self.category_id,
            board_status: true,
        })
    }
}

/// Request body for `POST /api/Categories` and `PUT /api/Categories/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub category_title: String,
    pub category_status: bool,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_date: String,
    pub updated_date: String,
}

fn check_category_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("Category title is required".to_string());
    }
    if title.chars().count() > MAX_CATEGORY_TITLE_LEN {
        return Err(format!(
            "Category title must not exceed {} characters",
            MAX_CATEGORY_TITLE_LEN
        ));
    }
    Ok(title.to_string())
}

/// Body for a new, active category
pub fn new_category(title: &str, author: Option<String>) -> Result<CategoryBody, String> {
    let title = check_category_title(title)?;
    let now = now_timestamp();
    Ok(CategoryBody {
        category_id: None,
        category_title: title,
        category_status: true,
        created_by: author.clone(),
        updated_by: author,
        created_date: now.clone(),
        updated_date: now,
    })
}

/// Body for an edit of `existing`; `None` keeps the stored title or status
pub fn category_update(
    existing: &Category,
    title: Option<&str>,
    status: Option<bool>,
    editor: Option<String>,
) -> Result<CategoryBody, String> {
    let title = check_category_title(title.unwrap_or(&existing.category_title))?;
    let now = now_timestamp();
    Ok(CategoryBody {
        category_id: Some(existing.category_id),
        category_title: title,
        category_status: status.unwrap_or(existing.category_status),
        created_by: existing.created_by.clone(),
        updated_by: editor,
        created_date: existing.created_date.clone().unwrap_or_else(|| now.clone()),
        updated_date: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(title: &str, description: &str) -> BoardDraft {
        BoardDraft {
            title: title.to_string(),
            description: description.to_string(),
            category_id: 2,
        }
    }

    #[test]
    fn test_board_body() {
        let body = board(" Lobby ", "Front desk screen").into_body().unwrap();
        assert_eq!(body.board_title, "Lobby");
        assert!(body.board_status);

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["boardTitle"], "Lobby");
        assert_eq!(json["categoryId"], 2);
    }

    #[test]
    fn test_board_limits() {
        assert!(board("", "desc").into_body().is_err());
        assert!(board("Lobby", "  ").into_body().is_err());
        assert!(board(&"t".repeat(MAX_BOARD_TITLE_LEN + 1), "desc")
            .into_body()
            .is_err());
        assert!(board("Lobby", &"d".repeat(MAX_BOARD_DESCRIPTION_LEN + 1))
            .into_body()
            .is_err());
        assert!(board(&"t".repeat(MAX_BOARD_TITLE_LEN), &"d".repeat(MAX_BOARD_DESCRIPTION_LEN))
            .into_body()
            .is_ok());
    }

    #[test]
    fn test_new_category() {
        let body = new_category("Operations", Some("5".to_string())).unwrap();
        assert!(body.category_status);
        assert_eq!(body.updated_by.as_deref(), Some("5"));

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("categoryId").is_none());
        assert_eq!(json["categoryTitle"], "Operations");

        assert!(new_category(" ", None).is_err());
        assert!(new_category(&"c".repeat(MAX_CATEGORY_TITLE_LEN + 1), None).is_err());
    }

    #[test]
    fn test_category_update_keeps_stored_fields() {
        let existing = Category {
            category_id: 9,
            category_title: "Ops".to_string(),
            category_status: true,
            created_by: Some("1".to_string()),
            updated_by: Some("1".to_string()),
            created_date: Some("2024-01-01T00:00:00Z".to_string()),
            updated_date: Some("2024-01-01T00:00:00Z".to_string()),
        };

        let body = category_update(&existing, None, Some(false), Some("4".to_string())).unwrap();
        assert_eq!(body.category_id, Some(9));
        assert_eq!(body.category_title, "Ops");
        assert!(!body.category_status);
        assert_eq!(body.created_by.as_deref(), Some("1"));
        assert_eq!(body.created_date, "2024-01-01T00:00:00Z");
        assert_eq!(body.updated_by.as_deref(), Some("4"));

        let renamed = category_update(&existing, Some("Operations"), None, None).unwrap();
        assert_eq!(renamed.category_title, "Operations");
        assert!(renamed.category_status);
    }
}
