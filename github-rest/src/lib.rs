mod client;
mod models;

pub use client::GithubClient;
pub use client::GithubError;
pub use models::*;
