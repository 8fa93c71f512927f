//! Domain records exchanged with the news API.
//!
//! The API speaks camelCase JSON. Every record that can live in a paged or
//! threaded collection implements [`ListItem`], whose `id` is the only thing
//! the controllers use for identity.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ListItem
// ============================================================================

/// A record held by a paged collection or comment thread.
///
/// Two items are the same item when their ids are equal, regardless of any
/// other field.
pub trait ListItem: Clone + Send + Sync + 'static {
    /// Opaque server-assigned identifier.
    fn id(&self) -> &str;

    /// Creation time used for ordering in the UI.
    fn created_at(&self) -> DateTime<Utc>;
}

/// A list item that may carry nested replies as delivered by the server.
pub trait Threaded: ListItem {
    /// Id of the item this one replies to, if any.
    fn parent_id(&self) -> Option<&str>;

    /// Detach the nested replies so the thread can own them as entries.
    fn take_replies(&mut self) -> Vec<Self>;
}

// ============================================================================
// News
// ============================================================================

/// Category a news article is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub slug: String,
    pub name: String,
}

/// Author byline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// A published news article as listed on feed and category pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    pub published_at: DateTime<Utc>,
}

impl ListItem for NewsArticle {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

// ============================================================================
// Comments
// ============================================================================

/// A reader comment or a reply to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub news_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(alias = "content")]
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl ListItem for Comment {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Threaded for Comment {
    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn take_replies(&mut self) -> Vec<Self> {
        std::mem::take(&mut self.replies)
    }
}

// ============================================================================
// Envelopes
// ============================================================================

/// Pagination metadata reported alongside a page of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub has_next: bool,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of a remote list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "data")]
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    /// A page without pagination metadata.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pagination: None,
        }
    }

    /// A page with an explicit `hasNext` flag.
    pub fn with_has_next(items: Vec<T>, has_next: bool) -> Self {
        Self {
            items,
            pagination: Some(Pagination {
                has_next,
                ..Default::default()
            }),
        }
    }
}

/// Result body of a create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> CreateResponse<T> {
    pub fn created(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}
