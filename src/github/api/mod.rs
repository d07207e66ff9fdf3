use anyhow::Context;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};

pub mod client;

pub use client::GithubClient;

fn base_github_url() -> &'static str {
    "https://api.github.com"
}

/// Creates an API client authenticated with a personal access token.
pub fn create_github_client(
    github_url: Option<String>,
    access_token: SecretString,
) -> anyhow::Result<Octocrab> {
    Octocrab::builder()
        .base_uri(github_url.as_deref().unwrap_or(base_github_url()))?
        .personal_token(access_token.expose_secret().clone())
        .build()
        .context("Could not create octocrab builder")
}
