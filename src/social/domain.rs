// Domain types and input validation - pure, no database access
use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{AppError, AppResult};

/// Raw submission as it arrives from a form, JSON body or GraphQL input.
///
/// Tags are always given by *name*. Older clients send them under `tagIds`,
/// which is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitPostInput {
    pub content: String,
    pub media_ids: Vec<String>,
    #[serde(alias = "tagIds")]
    pub tag_names: Vec<String>,
}

/// A submission that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub media_ids: Vec<String>,
    pub tag_names: Vec<String>,
}

impl PostDraft {
    pub fn parse(input: SubmitPostInput, max_attachments: usize) -> AppResult<Self> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::validation("content", "Content is required"));
        }

        let media_ids = distinct(
            input
                .media_ids
                .iter()
                .map(|id| id.trim().to_string())
                .collect(),
        );
        if media_ids.iter().any(|id| id.is_empty()) {
            return Err(AppError::validation("mediaIds", "Media ids cannot be empty"));
        }
        if media_ids.len() > max_attachments {
            return Err(AppError::validation(
                "mediaIds",
                format!("Cannot have more than {} attachments", max_attachments),
            ));
        }

        let tag_names: Vec<String> = input
            .tag_names
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        if tag_names.iter().any(|name| name.is_empty()) {
            return Err(AppError::validation("tagNames", "Tag names cannot be empty"));
        }

        Ok(Self {
            content: content.to_string(),
            media_ids,
            tag_names: distinct(tag_names),
        })
    }
}

/// Everything needed to insert a post and connect its relations.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub media_ids: Vec<String>,
    pub tag_ids: Vec<String>,
}

impl NewPost {
    pub fn new(user_id: &str, content: String, media_ids: Vec<String>, tag_ids: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            user_id: user_id.to_string(),
            content,
            media_ids,
            tag_ids,
        }
    }
}

/// Drop repeated values, keeping the first occurrence of each.
pub fn distinct(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
