pub mod domain;
pub mod feed;
pub mod posts;
pub mod repository;
pub mod scope;
pub mod tags;
pub mod views;

pub use domain::SubmitPostInput;
pub use feed::{fetch_tag_feed, fetch_user_profile, tag_page_title};
pub use posts::submit_post;
pub use scope::RequestScope;
pub use tags::resolve_tags;
