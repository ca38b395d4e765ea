use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use crate::catalog_draft::{BoardBody, CategoryBody};
use crate::config::ClientConfig;
use crate::constants::CATALOG_PAGE_SIZE;
use crate::model::{
    Board, BoardId, BoardsPage, CategoriesPage, Category, CategoryId, Slide, SlideId,
};
use crate::slide_draft::{NewSlide, SlideUpdate};

/// Errors returned by the boards/slides API client
#[derive(Debug)]
pub enum ApiError {
    /// The server denied the operation (HTTP 403)
    Forbidden,
    /// The request could not be completed or returned a non-success status
    TransientFetchFailure(String),
    /// The response body did not match the expected shape
    Decode(String),
    /// The client could not be built from the given settings
    InvalidConfig(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Forbidden => write!(f, "Forbidden: not allowed to perform this action"),
            ApiError::TransientFetchFailure(msg) => write!(f, "Request failed: {}", msg),
            ApiError::Decode(msg) => write!(f, "Unexpected response: {}", msg),
            ApiError::InvalidConfig(msg) => write!(f, "Invalid client configuration: {}", msg),
        }
    }
}

impl StdError for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::TransientFetchFailure(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Source of a board's slides, as seen by the rotation launcher
pub trait SlideSource {
    fn list_slides_by_board(&self, board_id: BoardId) -> Result<Vec<Slide>>;
}

/// Blocking client for the boards/slides API
///
/// Every request carries the bearer token issued by the external identity
/// service. A 403 is reported as `ApiError::Forbidden` so callers can show a
/// distinct message; every other failure is a `TransientFetchFailure`.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Self::with_settings(base_url, token, Duration::from_secs(30), false)
    }

    pub fn from_config(config: &ClientConfig, token: &str) -> Result<Self> {
        Self::with_settings(
            &config.api_url,
            token,
            Duration::from_secs(config.request_timeout_secs),
            config.accept_invalid_certs,
        )
    }

    fn with_settings(
        base_url: &str,
        token: &str,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.token).send()?;
        check_status(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);
        let response = self.send(self.http.get(&url).query(query))?;
        response
            .json::<T>()
            .map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
    }

    /// List every slide of a board, enabled or not, in API order
    pub fn list_slides_by_board(&self, board_id: BoardId) -> Result<Vec<Slide>> {
        self.get_json(
            "/api/Slides/List-Slide-by-board",
            &[("boardId", board_id.to_string())],
        )
    }

    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let page: CategoriesPage = self.get_json("/api/Categories", &catalog_page())?;
        Ok(page.categories)
    }

    pub fn list_boards(&self) -> Result<Vec<Board>> {
        let page: BoardsPage = self.get_json("/api/Boards", &catalog_page())?;
        Ok(page.boards)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.send(self.http.post(&url).json(body))?;
        response
            .json::<T>()
            .map_err(|e| ApiError::Decode(format!("{}: {}", url, e)))
    }

    fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!("PUT {}", url);
        self.send(self.http.put(&url).json(body))?;
        Ok(())
    }

    /// Create a slide; returns the record as stored by the API
    pub fn create_slide(&self, slide: &NewSlide) -> Result<Slide> {
        debug!("Creating slide on board {}", slide.board_id);
        self.post_json("/api/Slides", slide)
    }

    /// Replace a slide's fields with an edited version
    pub fn update_slide(&self, slide: &SlideUpdate) -> Result<()> {
        self.put_json(&format!("/api/Slides/{}", slide.slide_id), slide)
    }

    /// Enable or disable a slide
    ///
    /// The API exposes the status toggle on the DELETE verb with an
    /// `activate` flag; nothing is removed.
    pub fn set_slide_status(&self, slide_id: SlideId, activate: bool) -> Result<()> {
        let url = self.url(&format!("/api/Slides/{}", slide_id));
        debug!("DELETE {} activate={}", url, activate);
        self.send(
            self.http
                .delete(&url)
                .query(&[("activate", activate.to_string())]),
        )?;
        Ok(())
    }

    pub fn create_board(&self, board: &BoardBody) -> Result<Board> {
        self.post_json("/api/Boards", board)
    }

    pub fn update_board(&self, board_id: BoardId, board: &BoardBody) -> Result<()> {
        self.put_json(&format!("/api/Boards/{}", board_id), board)
    }

    /// Create a category; the API answers without a usable body
    pub fn create_category(&self, category: &CategoryBody) -> Result<()> {
        let url = self.url("/api/Categories");
        debug!("POST {}", url);
        self.send(self.http.post(&url).json(category))?;
        Ok(())
    }

    pub fn update_category(&self, category_id: CategoryId, category: &CategoryBody) -> Result<()> {
        self.put_json(&format!("/api/Categories/{}", category_id), category)
    }

    /// Flip a category between active and inactive
    ///
    /// Like slides, the toggle lives on the DELETE verb. The server decides the
    /// new state from the stored one.
    pub fn toggle_category(&self, category_id: CategoryId) -> Result<()> {
        let url = self.url(&format!("/api/Categories/{}", category_id));
        debug!("DELETE {}", url);
        self.send(self.http.delete(&url))?;
        Ok(())
    }
}

impl SlideSource for ApiClient {
    fn list_slides_by_board(&self, board_id: BoardId) -> Result<Vec<Slide>> {
        ApiClient::list_slides_by_board(self, board_id)
    }
}

fn catalog_page() -> [(&'static str, String); 2] {
    [
        ("pageNumber", "1".to_string()),
        ("pageSize", CATALOG_PAGE_SIZE.to_string()),
    ]
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        return Err(ApiError::Forbidden);
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        let body = body.trim();
        return Err(ApiError::TransientFetchFailure(if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body)
        }));
    }
    Ok(response)
}
