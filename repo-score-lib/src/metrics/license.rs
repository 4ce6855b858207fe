//! Compatibility of the repository license with LGPL-2.1.

use super::MetricContext;
use crate::Result;
use crate::facts::RepoIdentity;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ohno::{IntoAppError, app_err};
use serde::Deserialize;

const LOG_TARGET: &str = "   license";

/// SPDX identifiers accepted as compatible.
const COMPATIBLE_LICENSES: &[&str] = &[
    "LGPL-2.1",
    "LGPL-2.1-only",
    "LGPL-2.1-or-later",
    "GPL-2.0",
    "GPL-2.0-only",
    "GPL-2.0-or-later",
    "MIT",
    "Apache-2.0",
    "BSD-3-Clause",
    "BSD-2-Clause",
];

/// License families recognized in README text, lowercase.
const README_LICENSE_FAMILIES: &[&str] = &["lgpl", "gpl", "mit", "apache", "bsd"];

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    license: Option<LicenseInfo>,
}

#[derive(Debug, Deserialize)]
struct LicenseInfo {
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    content: String,
}

pub async fn compute(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<f64>> {
    match fetch_spdx_id(ctx, identity).await {
        Ok(Some(spdx_id)) => {
            log::debug!(target: LOG_TARGET, "'{identity}' declares license '{spdx_id}'");
            return Ok(Some(spdx_score(&spdx_id)));
        }
        Ok(None) => log::debug!(target: LOG_TARGET, "'{identity}' has no license metadata, checking README"),
        Err(e) => log::info!(target: LOG_TARGET, "Error fetching license information for '{identity}', checking README: {e:#}"),
    }

    let score = match fetch_readme(ctx, identity).await {
        Ok(readme) => readme_score(&readme),
        Err(e) => {
            log::debug!(target: LOG_TARGET, "Could not read README for '{identity}': {e:#}");
            0.0
        }
    };

    Ok(Some(score))
}

/// SPDX identifier from the license endpoint; `NOASSERTION` counts as absent.
async fn fetch_spdx_id(ctx: &MetricContext, identity: &RepoIdentity) -> Result<Option<String>> {
    let url = ctx.client.repo_url(identity.spec(), "/license");
    let response = ctx.client.get_json::<LicenseResponse>(&url).await.into_result("license")?;

    Ok(response
        .and_then(|r| r.license)
        .and_then(|l| l.spdx_id)
        .filter(|id| !id.is_empty() && id != "NOASSERTION"))
}

async fn fetch_readme(ctx: &MetricContext, identity: &RepoIdentity) -> Result<String> {
    let url = ctx.client.repo_url(identity.spec(), "/readme");
    let readme = ctx
        .client
        .get_json::<ReadmeResponse>(&url)
        .await
        .into_result("README")?
        .ok_or_else(|| app_err!("repository has no README"))?;

    decode_content(&readme.content)
}

/// Decode the base64 payload of a contents response, which GitHub wraps across lines.
fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact).into_app_err("decoding base64 README content")?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[must_use]
pub fn spdx_score(spdx_id: &str) -> f64 {
    if COMPATIBLE_LICENSES.contains(&spdx_id) { 1.0 } else { 0.0 }
}

/// 1 when the README mentions a license together with a compatible license family.
#[must_use]
pub fn readme_score(readme: &str) -> f64 {
    let text = readme.to_lowercase();
    let mentions_family = README_LICENSE_FAMILIES.iter().any(|family| text.contains(family));

    if text.contains("license") && mentions_family { 1.0 } else { 0.0 }
}
