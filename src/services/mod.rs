pub mod clock;
pub mod source_host;

pub use clock::Clock;
pub use source_host::{PageQuery, PullRequestPage, SearchQuery, SourceHost};
