use async_graphql::*;

use crate::social::SubmitPostInput;

/// Input for creating a post
#[derive(InputObject, Debug, Clone)]
pub struct NewPostInput {
    /// Post body (required, trimmed)
    pub content: String,

    /// Ids of media uploaded beforehand
    #[graphql(default)]
    pub media_ids: Vec<String>,

    /// Tag names; unknown names are created
    #[graphql(default)]
    pub tag_names: Vec<String>,
}

impl From<NewPostInput> for SubmitPostInput {
    fn from(input: NewPostInput) -> Self {
        SubmitPostInput {
            content: input.content,
            media_ids: input.media_ids,
            tag_names: input.tag_names,
        }
    }
}
