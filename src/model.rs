use serde::{Deserialize, Serialize};

pub type SlideId = i64;
pub type BoardId = i64;
pub type CategoryId = i64;

/// A single timed content item within a board's rotation
///
/// Field names follow the wire format of the boards/slides API. The audit
/// fields are carried through untouched; nothing in the player reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub slide_id: SlideId,
    pub slide_title: String,
    pub url: String,
    /// Display duration in the configured unit (see `schedule::DurationUnit`)
    pub time: f64,
    pub slide_status: bool,
    pub board_id: BoardId,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub edited_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub edited_date: Option<String>,
}

impl Slide {
    pub fn is_enabled(&self) -> bool {
        self.slide_status
    }
}

/// A named collection of slides belonging to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub board_id: BoardId,
    pub board_title: String,
    #[serde(default)]
    pub board_description: String,
    pub category_id: CategoryId,
    #[serde(default = "default_status")]
    pub board_status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: CategoryId,
    pub category_title: String,
    #[serde(default = "default_status")]
    pub category_status: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default)]
    pub updated_date: Option<String>,
}

fn default_status() -> bool {
    true
}

/// Paginated envelope returned by `GET /api/Categories`
#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesPage {
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Paginated envelope returned by `GET /api/Boards`
#[derive(Debug, Deserialize)]
pub(crate) struct BoardsPage {
    #[serde(default)]
    pub boards: Vec<Board>,
}

/// Active categories paired with their boards, in API order
pub fn group_boards_by_category(
    categories: &[Category],
    boards: &[Board],
) -> Vec<(Category, Vec<Board>)> {
    categories
        .iter()
        .filter(|c| c.category_status)
        .map(|category| {
            let members = boards
                .iter()
                .filter(|b| b.category_id == category.category_id)
                .cloned()
                .collect();
            (category.clone(), members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_deserializes_wire_format() {
        let json = r#"{
            "slideId": 7,
            "slideTitle": "Sales",
            "url": "https://dash.example.com/sales",
            "time": 1.5,
            "slideStatus": true,
            "boardId": 3,
            "createdBy": "42",
            "createdDate": "2024-05-01T10:00:00Z"
        }"#;
        let slide: Slide = serde_json::from_str(json).unwrap();
        assert_eq!(slide.slide_id, 7);
        assert_eq!(slide.time, 1.5);
        assert!(slide.is_enabled());
        assert_eq!(slide.created_by.as_deref(), Some("42"));
        assert_eq!(slide.edited_by, None);
    }

    #[test]
    fn test_group_boards_skips_inactive_categories() {
        let categories = vec![
            Category {
                category_id: 1,
                category_title: "Ops".to_string(),
                category_status: true,
                created_by: None,
                updated_by: None,
                created_date: None,
                updated_date: None,
            },
            Category {
                category_id: 2,
                category_title: "Old".to_string(),
                category_status: false,
                created_by: None,
                updated_by: None,
                created_date: None,
                updated_date: None,
            },
        ];
        let board = |id, category_id| Board {
            board_id: id,
            board_title: format!("b{}", id),
            board_description: String::new(),
            category_id,
            board_status: true,
        };
        let boards = vec![board(10, 1), board(11, 2), board(12, 1)];

        let grouped = group_boards_by_category(&categories, &boards);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].0.category_id, 1);
        let ids: Vec<_> = grouped[0].1.iter().map(|b| b.board_id).collect();
        assert_eq!(ids, vec![10, 12]);
    }
}
