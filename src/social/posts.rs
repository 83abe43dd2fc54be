use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::social::domain::{NewPost, PostDraft, SubmitPostInput};
use crate::social::repository::{PostRepository, RepositoryError};
use crate::social::tags::resolve_tags;
use crate::social::views::PostView;

/// Validate, resolve tags, and persist a new post owned by `viewer`.
///
/// Returns the stored post decorated for the author. Nothing is written when
/// the caller is anonymous, the input is malformed or a media id is unknown.
pub async fn submit_post(
    repo: &dyn PostRepository,
    viewer: Option<&CurrentUser>,
    input: SubmitPostInput,
    max_attachments: usize,
) -> AppResult<PostView> {
    let user = viewer.ok_or(AppError::Unauthorized)?;
    let draft = PostDraft::parse(input, max_attachments)?;

    // Reject unknown media before any tag is created
    let missing = repo.find_missing_media(&draft.media_ids).await?;
    if !missing.is_empty() {
        return Err(RepositoryError::MissingMedia(missing).into());
    }

    let tags = resolve_tags(repo, &draft.tag_names).await?;
    let post = NewPost::new(
        &user.id,
        draft.content,
        draft.media_ids,
        tags.into_iter().map(|tag| tag.id).collect(),
    );
    repo.create_post(&post).await?;

    tracing::info!(
        post = %post.id,
        user = %user.username,
        tags = post.tag_ids.len(),
        attachments = post.media_ids.len(),
        "Post submitted"
    );

    repo.find_post(&post.id, Some(&user.id))
        .await?
        .ok_or_else(|| AppError::Internal(format!("post {} missing after insert", post.id)))
}
