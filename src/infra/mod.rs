pub mod clock;
#[cfg(test)]
pub mod fake;
pub mod github;
