//! Repository star-count widgets.
//!
//! This crate provides:
//! - [`providers`] — GitHub and GitLab repository metadata endpoints
//! - [`StarClient`] — fetches star counts over HTTP
//! - [`inject_star_counts`] — writes counts into the page's widget elements

pub mod client;
pub mod providers;

pub use client::{StarClient, StarCount, StarFetch, inject_star_counts};
pub use providers::{GitHubProvider, GitLabProvider, StarProvider, providers_from_config};
