//! Repository identity and the remote data sources metrics are computed from
//!
//! Input URLs name either an npm package page or a GitHub repository. The
//! [`Resolver`] turns each one into a [`RepoIdentity`], following the package's
//! registry metadata for npm URLs. Everything after that talks to the GitHub REST API
//! through a single [`github::Client`], which throttles concurrent requests, retries
//! transient failures, and waits out short rate-limit windows.

pub mod github;
pub(crate) mod resilient_http;
mod repo_identity;
mod repo_spec;
mod resolver;
pub(crate) mod throttler;
mod url_list;

pub use repo_identity::RepoIdentity;
pub use repo_spec::RepoSpec;
pub use resolver::{DEFAULT_NPM_REGISTRY_URL, ResolutionError, Resolver};
pub use url_list::read_url_list;
