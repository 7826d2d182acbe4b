//! Database models. Each struct maps to one table and exposes the
//! queries the handlers and the scraper need.

pub mod feed;
pub mod feed_follow;
pub mod post;
pub mod user;

pub use feed::Feed;
pub use feed_follow::FeedFollow;
pub use post::{NewPost, Post};
pub use user::User;
