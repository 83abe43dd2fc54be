use futures::future::try_join_all;
use std::collections::HashMap;

use crate::db::models::Tag;
use crate::social::domain::distinct;
use crate::social::repository::{PostRepository, RepositoryError};

/// Find-or-create one tag per distinct name.
///
/// Names are deduplicated before the existence check, so a name repeated in
/// the input never produces two inserts. Missing tags are created
/// concurrently; if any creation fails the whole resolution fails. A
/// uniqueness conflict means another request created the tag first, in which
/// case the existing row is fetched instead. The result follows the order in
/// which names first appear in the input.
pub async fn resolve_tags(
    repo: &dyn PostRepository,
    names: &[String],
) -> Result<Vec<Tag>, RepositoryError> {
    let names = distinct(names.to_vec());
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_name: HashMap<String, Tag> = repo
        .find_tags_by_names(&names)
        .await?
        .into_iter()
        .map(|tag| (tag.name.clone(), tag))
        .collect();

    let missing: Vec<&String> = names
        .iter()
        .filter(|name| !by_name.contains_key(*name))
        .collect();

    if !missing.is_empty() {
        tracing::debug!("Creating {} new tag(s)", missing.len());
        let created = try_join_all(missing.into_iter().map(|name| create_or_fetch(repo, name))).await?;
        by_name.extend(created.into_iter().map(|tag| (tag.name.clone(), tag)));
    }

    names
        .iter()
        .map(|name| {
            by_name.remove(name).ok_or_else(|| {
                RepositoryError::Conflict(format!("tag '{}' vanished during resolution", name))
            })
        })
        .collect()
}

async fn create_or_fetch(repo: &dyn PostRepository, name: &str) -> Result<Tag, RepositoryError> {
    match repo.create_tag(name).await {
        Ok(tag) => {
            tracing::info!(tag = %tag.name, id = %tag.id, "Created tag");
            Ok(tag)
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::debug!(tag = %name, "Tag created concurrently, re-fetching");
            repo.find_tag_by_name(name).await?.ok_or_else(|| {
                RepositoryError::Conflict(format!("tag '{}' conflicted but does not exist", name))
            })
        }
        Err(e) => Err(e),
    }
}
