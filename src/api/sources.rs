//! Adapters between [`ApiClient`] endpoints and the controller traits.
use super::client::{ApiClient, ApiError, NewsQuery};
use crate::controller::{CreateSink, PageSource};
use crate::model::{Author, Comment, CreateResponse, NewsArticle, Page};
use chrono::Utc;

/// News listing (home feed, category pages, search results).
#[derive(Debug, Clone)]
pub struct NewsSource {
    client: ApiClient,
}

impl NewsSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl PageSource for NewsSource {
    type Item = NewsArticle;
    type Filter = NewsQuery;
    type Error = ApiError;

    async fn fetch_page(
        &self,
        filter: &NewsQuery,
        page: u32,
        page_size: u32,
    ) -> Result<Page<NewsArticle>, ApiError> {
        self.client.list_news(filter, page, page_size).await
    }
}

/// Comments of one article: listing and creation.
#[derive(Debug, Clone)]
pub struct CommentSource {
    client: ApiClient,
    news_id: String,
    display_name: Option<String>,
}

impl CommentSource {
    pub fn new(client: ApiClient, news_id: impl Into<String>) -> Self {
        Self {
            client,
            news_id: news_id.into(),
            display_name: None,
        }
    }

    /// Name shown on pending entries until the server returns the real byline.
    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    pub fn news_id(&self) -> &str {
        &self.news_id
    }
}

impl PageSource for CommentSource {
    type Item = Comment;
    type Filter = ();
    type Error = ApiError;

    async fn fetch_page(
        &self,
        _filter: &(),
        page: u32,
        page_size: u32,
    ) -> Result<Page<Comment>, ApiError> {
        self.client
            .list_comments(&self.news_id, page, page_size)
            .await
    }
}

impl CreateSink for CommentSource {
    type Item = Comment;
    type Error = ApiError;

    fn provisional(&self, text: &str, parent_id: Option<&str>) -> Comment {
        Comment {
            id: String::new(),
            news_id: Some(self.news_id.clone()),
            parent_id: parent_id.map(str::to_owned),
            author: self.display_name.as_ref().map(|name| Author {
                id: None,
                name: name.clone(),
            }),
            text: text.to_owned(),
            created_at: Utc::now(),
            replies: Vec::new(),
        }
    }

    async fn create(
        &self,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<CreateResponse<Comment>, ApiError> {
        self.client
            .create_comment(&self.news_id, text, parent_id)
            .await
    }
}
