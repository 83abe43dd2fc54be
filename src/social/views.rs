use async_graphql::{ComplexObject, SimpleObject};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::db::models::{Media, Tag};

/// Author data as shown next to a post, personalised for the viewer.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub follower_count: i64,
    pub post_count: i64,
    /// Whether the viewer follows this user. Always false without a viewer.
    pub is_followed_by_user: bool,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub content: String,
    pub created_at: String,
    pub created_ago: String,
    pub user: UserData,
    pub attachments: Vec<Media>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
#[graphql(complex)]
pub struct TagFeed {
    pub tag: Tag,
    pub posts: Vec<PostView>,
}

impl TagFeed {
    pub fn title(&self) -> String {
        format!("Posts for Tag: {}", self.tag.name)
    }
}

#[ComplexObject]
impl TagFeed {
    /// Page title for the tag page
    #[graphql(name = "title")]
    async fn page_title(&self) -> String {
        self.title()
    }
}

/// The "about this user" sidebar.
#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: UserData,
    /// False when there is no viewer or the viewer is looking at themselves.
    pub show_follow_button: bool,
}

pub fn parse_and_format_time(db_time: &str) -> String {
    NaiveDateTime::parse_from_str(db_time, "%Y-%m-%d %H:%M:%S")
        .map(|dt| format_relative_time(&dt))
        .unwrap_or_else(|_| db_time.to_string())
}

pub fn format_relative_time(dt: &NaiveDateTime) -> String {
    let now = Utc::now().naive_utc();
    let diff = now.signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}
