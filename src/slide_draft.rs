use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use url::Url;

use crate::model::{BoardId, Slide, SlideId};
use crate::schedule::validate_slide_time;

/// Longest slide title the API accepts
pub const MAX_TITLE_LEN: usize = 30;

/// Prefix `https://` when the user typed a bare host or path
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("https:") || trimmed.starts_with("http:") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Normalize and check a slide URL: http(s) with a dotted host or an IPv4 address
pub fn validate_url(raw: &str) -> Result<Url, String> {
    let normalized = normalize_url(raw);
    let parsed =
        Url::parse(&normalized).map_err(|e| format!("Invalid URL '{}': {}", raw.trim(), e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(format!("URL '{}' must use http or https", raw.trim()));
    }
    match parsed.host() {
        Some(url::Host::Domain(domain)) => {
            let tld = domain.rsplit('.').next().unwrap_or("");
            if !domain.contains('.') || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic())
            {
                return Err(format!("URL '{}' has no valid host name", raw.trim()));
            }
        }
        Some(url::Host::Ipv4(_)) => {}
        Some(url::Host::Ipv6(_)) | None => {
            return Err(format!("URL '{}' has no valid host name", raw.trim()));
        }
    }
    Ok(parsed)
}

/// A slide as typed by the user, before it is sent to the API
#[derive(Debug, Clone)]
pub struct SlideDraft {
    pub title: String,
    pub url: String,
    pub time: f64,
}

/// Request body for `POST /api/Slides`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSlide {
    pub slide_title: String,
    pub url: String,
    pub time: f64,
    pub board_id: BoardId,
    pub slide_status: bool,
    pub created_by: Option<String>,
    pub edited_by: Option<String>,
    pub created_date: String,
    pub edited_date: String,
}

/// Request body for `PUT /api/Slides/{id}`
///
/// Creation audit fields are carried over from the stored slide; the edit
/// fields name the current user and time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideUpdate {
    pub slide_id: SlideId,
    pub slide_title: String,
    pub url: String,
    pub time: f64,
    pub board_id: BoardId,
    pub slide_status: bool,
    pub created_by: Option<String>,
    pub created_date: String,
    pub edited_by: Option<String>,
    pub edited_date: String,
}

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl SlideDraft {
    /// Prefill a draft from a stored slide
    pub fn from_slide(slide: &Slide) -> Self {
        Self {
            title: slide.slide_title.clone(),
            url: slide.url.clone(),
            time: slide.time,
        }
    }

    /// Trimmed title and parsed URL, once every field checks out
    fn checked(&self) -> Result<(String, Url), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Slide title is required".to_string());
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!(
                "Slide title must not exceed {} characters",
                MAX_TITLE_LEN
            ));
        }
        if self.url.trim().is_empty() {
            return Err("Slide URL is required".to_string());
        }
        let url = validate_url(&self.url)?;
        validate_slide_time(self.time)?;
        Ok((title.to_string(), url))
    }

    /// Check every field and build the request body for a board
    pub fn into_new_slide(
        self,
        board_id: BoardId,
        author: Option<String>,
    ) -> Result<NewSlide, String> {
        let (title, url) = self.checked()?;
        let now = now_timestamp();
        Ok(NewSlide {
            slide_title: title,
            url: url.to_string(),
            time: self.time,
            board_id,
            slide_status: true,
            created_by: author.clone(),
            edited_by: author,
            created_date: now.clone(),
            edited_date: now,
        })
    }

    /// Check every field and build the edit of `existing`
    ///
    /// Board, status and creation audit fields stay as stored. A slide without
    /// a recorded creator is attributed to the editor.
    pub fn into_slide_update(
        self,
        existing: &Slide,
        editor: Option<String>,
    ) -> Result<SlideUpdate, String> {
        let (title, url) = self.checked()?;
        let now = now_timestamp();
        Ok(SlideUpdate {
            slide_id: existing.slide_id,
            slide_title: title,
            url: url.to_string(),
            time: self.time,
            board_id: existing.board_id,
            slide_status: existing.slide_status,
            created_by: existing.created_by.clone().or_else(|| editor.clone()),
            created_date: existing.created_date.clone().unwrap_or_else(|| now.clone()),
            edited_by: editor,
            edited_date: now,
        })
    }
}
