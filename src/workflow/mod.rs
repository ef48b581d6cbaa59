pub mod changelog_page;
pub mod fanout;
pub mod snapshot;
