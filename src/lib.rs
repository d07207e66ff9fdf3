//! This is the library of the review helper: a webhook service that squashes fixup commits
//! and tracks peer reviews of pull requests.
pub mod github;
pub mod review;
pub mod utils;

#[cfg(test)]
mod tests;
