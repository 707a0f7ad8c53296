//! Fetch state for each screen: loading, then either an error message or data.

use uuid::Uuid;

use quill_shared::dto::{CategoryResponse, CommentResponse, PostDetailResponse, PostResponse};

use crate::api::BlogClient;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Loaded(T),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> ViewState<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self::Loaded(data),
            Err(e) => Self::Error(e.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Post listing, either everything or the results of a search.
#[derive(Debug, Default)]
pub struct PostListView {
    pub state: ViewState<Vec<PostResponse>>,
}

impl PostListView {
    pub async fn load(client: &BlogClient) -> Self {
        Self {
            state: ViewState::from_result(client.list_posts().await),
        }
    }

    pub async fn search(client: &BlogClient, query: &str) -> Self {
        Self {
            state: ViewState::from_result(client.search_posts(query).await),
        }
    }
}

#[derive(Debug, Default)]
pub struct CategoryListView {
    pub state: ViewState<Vec<CategoryResponse>>,
}

impl CategoryListView {
    pub async fn load(client: &BlogClient) -> Self {
        Self {
            state: ViewState::from_result(client.list_categories().await),
        }
    }
}

/// A single post with its comment thread.
#[derive(Debug)]
pub struct PostView {
    pub id: Uuid,
    pub state: ViewState<PostDetailResponse>,
}

impl PostView {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: ViewState::Loading,
        }
    }

    pub async fn load(client: &BlogClient, id: Uuid) -> Self {
        let mut view = Self::new(id);
        view.refresh(client).await;
        view
    }

    pub async fn refresh(&mut self, client: &BlogClient) {
        self.state = ViewState::Loading;
        self.state = ViewState::from_result(client.get_post(self.id).await);
    }

    /// Submit a comment and append the server's copy to the loaded post.
    ///
    /// The post is not refetched. A failed submission leaves the view untouched.
    pub async fn add_comment(
        &mut self,
        client: &BlogClient,
        content: &str,
    ) -> Result<&CommentResponse, ClientError> {
        let ViewState::Loaded(detail) = &mut self.state else {
            return Err(ClientError::InvalidState("Post is not loaded"));
        };

        let comment = client.add_comment(self.id, content).await?;
        detail.comments.push(comment);
        detail.post.comment_count = detail.comments.len();

        detail
            .comments
            .last()
            .ok_or(ClientError::InvalidState("Post is not loaded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_state_from_result() {
        let loaded: ViewState<u32> = ViewState::from_result(Ok(7));
        assert_eq!(loaded.data(), Some(&7));
        assert!(!loaded.is_loading());

        let failed: ViewState<u32> = ViewState::from_result(Err(ClientError::Api {
            status: 404,
            message: "Post not found".into(),
            errors: vec![],
        }));
        assert_eq!(failed.error(), Some("Post not found"));
        assert!(failed.data().is_none());
    }

    #[test]
    fn test_views_start_loading() {
        assert!(PostListView::default().state.is_loading());
        assert!(CategoryListView::default().state.is_loading());
        assert!(PostView::new(Uuid::new_v4()).state.is_loading());
    }

    #[tokio::test]
    async fn test_comment_on_unloaded_post_is_rejected() {
        let client = BlogClient::new("http://127.0.0.1:1");
        let mut view = PostView::new(Uuid::new_v4());

        let result = view.add_comment(&client, "hi").await;
        assert!(matches!(result, Err(ClientError::InvalidState(_))));
        assert!(view.state.is_loading());
    }
}
