use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_db(kind: &str) -> Self {
        match kind {
            "video" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Media {
    pub id: String,
    pub url: String,
    pub kind: MediaKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_parses_db_values() {
        assert_eq!(MediaKind::from_db("image"), MediaKind::Image);
        assert_eq!(MediaKind::from_db("video"), MediaKind::Video);
    }

    #[test]
    fn media_kind_serializes_lowercase() {
        let json = serde_json::to_string(&MediaKind::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }
}
