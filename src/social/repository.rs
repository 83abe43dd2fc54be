// Repository pattern - isolates all database side effects
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::{Media, MediaKind, Tag};
use crate::social::domain::NewPost;
use crate::social::views::{parse_and_format_time, PostView, UserData, UserProfile};
use crate::state::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unknown media: {0:?}")]
    MissingMedia(Vec<String>),
}

/// Repository trait - all database operations
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All tags whose name is in `names`
    async fn find_tags_by_names(&self, names: &[String]) -> Result<Vec<Tag>, RepositoryError>;

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError>;

    async fn find_tag(&self, id: &str) -> Result<Option<Tag>, RepositoryError>;

    /// Insert a tag. Fails with `Conflict` if the name is already taken.
    async fn create_tag(&self, name: &str) -> Result<Tag, RepositoryError>;

    /// Ids from `ids` with no media row, in input order
    async fn find_missing_media(&self, ids: &[String]) -> Result<Vec<String>, RepositoryError>;

    /// Atomically insert a post and connect its media and tags
    async fn create_post(&self, post: &NewPost) -> Result<(), RepositoryError>;

    async fn find_post(
        &self,
        id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<PostView>, RepositoryError>;

    /// Posts carrying the tag, newest first
    async fn find_posts_by_tag(
        &self,
        tag_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<PostView>, RepositoryError>;

    async fn find_user_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<UserProfile>, RepositoryError>;
}

/// SQLite implementation
pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "
    p.id, p.content, p.created_at,
    u.id, u.username, u.display_name, u.avatar_url, u.bio, u.created_at,
    (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id),
    (SELECT COUNT(*) FROM posts up WHERE up.user_id = u.id),
    EXISTS(SELECT 1 FROM follows f WHERE f.following_id = u.id AND f.follower_id = ?1)";

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn user_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<UserData> {
    Ok(UserData {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        display_name: row.get(offset + 2)?,
        avatar_url: row.get(offset + 3)?,
        bio: row.get(offset + 4)?,
        created_at: row.get(offset + 5)?,
        follower_count: row.get(offset + 6)?,
        post_count: row.get(offset + 7)?,
        is_followed_by_user: row.get(offset + 8)?,
    })
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostView> {
    let created_at: String = row.get(2)?;
    Ok(PostView {
        id: row.get(0)?,
        content: row.get(1)?,
        created_ago: parse_and_format_time(&created_at),
        created_at,
        user: user_from_row(row, 3)?,
        attachments: Vec::new(),
        tags: Vec::new(),
    })
}

/// Fill in attachments and tags for already-loaded posts
fn load_relations(conn: &Connection, posts: &mut [PostView]) -> rusqlite::Result<()> {
    let mut media_stmt = conn.prepare(
        "SELECT m.id, m.url, m.kind FROM post_media pm
         JOIN media m ON m.id = pm.media_id
         WHERE pm.post_id = ?1
         ORDER BY pm.position",
    )?;
    let mut tag_stmt = conn.prepare(
        "SELECT t.id, t.name FROM post_tags pt
         JOIN tags t ON t.id = pt.tag_id
         WHERE pt.post_id = ?1
         ORDER BY t.name",
    )?;

    for post in posts.iter_mut() {
        post.attachments = media_stmt
            .query_map(params![post.id], |row| {
                let kind: String = row.get(2)?;
                Ok(Media {
                    id: row.get(0)?,
                    url: row.get(1)?,
                    kind: MediaKind::from_db(&kind),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        post.tags = tag_stmt
            .query_map(params![post.id], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
    }

    Ok(())
}

fn missing_media(conn: &Connection, ids: &[String]) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT COUNT(*) > 0 FROM media WHERE id = ?1")?;
    let mut missing = Vec::new();
    for id in ids {
        let exists: bool = stmt.query_row(params![id], |row| row.get(0))?;
        if !exists {
            missing.push(id.clone());
        }
    }
    Ok(missing)
}

fn find_tag_by(conn: &Connection, column: &str, value: &str) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        &format!("SELECT id, name FROM tags WHERE {} = ?1", column),
        params![value],
        |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn find_tags_by_names(&self, names: &[String]) -> Result<Vec<Tag>, RepositoryError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.pool.get()?;
        let placeholders = vec!["?"; names.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, name FROM tags WHERE name IN ({})",
            placeholders
        ))?;

        let tags = stmt
            .query_map(params_from_iter(names.iter()), |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, RepositoryError> {
        let conn = self.pool.get()?;
        Ok(find_tag_by(&conn, "name", name)?)
    }

    async fn find_tag(&self, id: &str) -> Result<Option<Tag>, RepositoryError> {
        let conn = self.pool.get()?;
        Ok(find_tag_by(&conn, "id", id)?)
    }

    async fn create_tag(&self, name: &str) -> Result<Tag, RepositoryError> {
        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();

        match conn.execute(
            "INSERT INTO tags (id, name) VALUES (?1, ?2)",
            params![id, name],
        ) {
            Ok(_) => Ok(Tag {
                id,
                name: name.to_string(),
            }),
            Err(e) if is_unique_violation(&e) => {
                Err(RepositoryError::Conflict(format!("tag '{}' already exists", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_missing_media(&self, ids: &[String]) -> Result<Vec<String>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.pool.get()?;
        Ok(missing_media(&conn, ids)?)
    }

    async fn create_post(&self, post: &NewPost) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;

        // ATOMIC TRANSACTION - the post and all of its connections, or nothing
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: Result<(), RepositoryError> = (|| {
            // Media may have been removed since the caller checked
            let missing = missing_media(&conn, &post.media_ids)?;
            if !missing.is_empty() {
                return Err(RepositoryError::MissingMedia(missing));
            }

            conn.execute(
                "INSERT INTO posts (id, user_id, content) VALUES (?1, ?2, ?3)",
                params![post.id, post.user_id, post.content],
            )?;

            for (position, media_id) in post.media_ids.iter().enumerate() {
                conn.execute(
                    "INSERT INTO post_media (post_id, media_id, position) VALUES (?1, ?2, ?3)",
                    params![post.id, media_id, position as i64],
                )?;
            }

            for tag_id in &post.tag_ids {
                conn.execute(
                    "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2)",
                    params![post.id, tag_id],
                )?;
            }

            Ok(())
        })();

        let result = result.and_then(|()| {
            conn.execute("COMMIT", [])?;
            Ok(())
        });
        if let Err(e) = &result {
            if let Err(rollback) = conn.execute("ROLLBACK", []) {
                tracing::error!(post = %post.id, "Rollback failed: {} (original error: {})", rollback, e);
            }
        }
        result
    }

    async fn find_post(
        &self,
        id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<PostView>, RepositoryError> {
        let conn = self.pool.get()?;
        let uid = viewer_id.unwrap_or("");

        let post = conn
            .query_row(
                &format!(
                    "SELECT {} FROM posts p JOIN users u ON u.id = p.user_id WHERE p.id = ?2",
                    POST_COLUMNS
                ),
                params![uid, id],
                post_from_row,
            )
            .optional()?;

        match post {
            Some(mut post) => {
                load_relations(&conn, std::slice::from_mut(&mut post))?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn find_posts_by_tag(
        &self,
        tag_id: &str,
        viewer_id: Option<&str>,
    ) -> Result<Vec<PostView>, RepositoryError> {
        let conn = self.pool.get()?;
        let uid = viewer_id.unwrap_or("");

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM posts p
             JOIN users u ON u.id = p.user_id
             JOIN post_tags pt ON pt.post_id = p.id
             WHERE pt.tag_id = ?2
             ORDER BY p.created_at DESC, p.rowid DESC",
            POST_COLUMNS
        ))?;

        let mut posts = stmt
            .query_map(params![uid, tag_id], post_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        load_relations(&conn, &mut posts)?;
        Ok(posts)
    }

    async fn find_user_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        let conn = self.pool.get()?;
        let uid = viewer_id.unwrap_or("");

        let user = conn
            .query_row(
                "SELECT u.id, u.username, u.display_name, u.avatar_url, u.bio, u.created_at,
                        (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id),
                        (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id),
                        EXISTS(SELECT 1 FROM follows f WHERE f.following_id = u.id AND f.follower_id = ?1)
                 FROM users u WHERE u.username = ?2",
                params![uid, username],
                |row| user_from_row(row, 0),
            )
            .optional()?;

        Ok(user.map(|user| {
            let show_follow_button = viewer_id.is_some_and(|viewer| viewer != user.id);
            UserProfile {
                user,
                show_follow_button,
            }
        }))
    }
}

/// Type alias for Arc-wrapped repository (for AppState)
pub type DynPostRepository = Arc<dyn PostRepository>;
