//! Domain read models to wire DTOs.

use quill_core::domain::{Category, User};
use quill_core::services::{
    AuthorRef, CategoryRef, CommentAuthor, CommentView, PostDetail, PostSummary,
};
use quill_shared::dto::{
    AuthorSummary, CategoryResponse, CategorySummary, CommentAuthorResponse, CommentResponse,
    PostDetailResponse, PostResponse, UserResponse,
};

pub fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        avatar: user.avatar.clone(),
        role: user.role.to_string(),
        created_at: user.created_at,
    }
}

pub fn category_response(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        description: category.description.clone(),
        post_count: category.post_count,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

fn author_summary(author: &AuthorRef) -> AuthorSummary {
    AuthorSummary {
        id: author.id,
        name: author.name.clone(),
        email: author.email.clone(),
    }
}

fn category_summary(category: &CategoryRef) -> CategorySummary {
    CategorySummary {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
    }
}

fn comment_author(user: &CommentAuthor) -> CommentAuthorResponse {
    CommentAuthorResponse {
        id: user.id,
        name: user.name.clone(),
        avatar: user.avatar.clone(),
    }
}

pub fn post_response(summary: &PostSummary) -> PostResponse {
    let post = &summary.post;
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        excerpt: post.excerpt.clone(),
        tags: post.tags.clone(),
        author: summary.author.as_ref().map(author_summary),
        category: summary.category.as_ref().map(category_summary),
        view_count: post.view_count,
        comment_count: post.comments.len(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub fn comment_response(view: &CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        content: view.comment.content.clone(),
        user: view.user.as_ref().map(comment_author),
        created_at: view.comment.created_at,
    }
}

pub fn post_detail_response(detail: &PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post_response(&detail.summary),
        comments: detail.comments.iter().map(comment_response).collect(),
    }
}
