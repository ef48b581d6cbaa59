pub mod channel;
pub mod feed;
pub mod item;
pub mod pull_request;
pub mod release_note;
pub mod title;
