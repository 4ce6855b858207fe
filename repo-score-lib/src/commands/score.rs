use super::Host;
use super::common::{CommonArgs, init_logging};
use super::config::Config;
use crate::Result;
use crate::facts::github::Client;
use crate::facts::{RepoIdentity, Resolver, read_url_list};
use crate::metrics::{Evaluation, MetricContext};
use crate::reports::generate_ndjson;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::app_err;
use std::io::Write;

const LOG_TARGET: &str = "     score";

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// File listing one npm package or GitHub repository URL per line
    #[arg(value_name = "URL_FILE")]
    pub url_file: Utf8PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Skip the reachability check performed before resolving each URL
    #[arg(long)]
    pub no_url_check: bool,

    /// Abort at the first URL that cannot be resolved instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

/// Score every URL in the input file, writing one NDJSON line per resolved repository.
pub async fn score_urls<H: Host>(host: &mut H, args: &ScoreArgs) -> Result<()> {
    init_logging(args.common.log_level, args.common.log_file.as_ref())?;

    let config = Config::load(Utf8Path::new("."), args.common.config.as_ref())?;

    let token = args
        .common
        .github_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| app_err!("GitHub token not provided; set GITHUB_TOKEN or pass --github-token"))?;

    let client = Client::new(token, args.common.api_url.as_deref(), config.client_options())?;
    client.verify_token().await?;

    let urls = read_url_list(&args.url_file)?;
    log::info!(target: LOG_TARGET, "Read {} URL(s) from '{}'", urls.len(), args.url_file);

    let resolver = Resolver::new(args.common.npm_registry_url.as_deref(), !args.no_url_check, config.request_timeout)?;
    let identities = resolve_all(host, &resolver, &urls, args.strict).await?;

    let ctx = MetricContext::new(client, config.metric_settings());
    for identity in identities {
        let evaluation = Evaluation::evaluate(&ctx, &config.weights, identity).await;

        let mut line = String::new();
        generate_ndjson(&evaluation, &mut line)?;

        let mut out = host.output();
        out.write_all(line.as_bytes())?;
        out.flush()?;
    }

    Ok(())
}

/// Resolve URLs in input order, skipping failures unless `strict` is set.
async fn resolve_all<H: Host>(host: &mut H, resolver: &Resolver, urls: &[String], strict: bool) -> Result<Vec<RepoIdentity>> {
    let mut identities = Vec::with_capacity(urls.len());

    for url in urls {
        match resolver.resolve(url).await {
            Ok(identity) => identities.push(identity),
            Err(e) if strict => {
                return Err(app_err!("could not resolve '{url}': {e}"));
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not resolve '{url}': {e}");
                let _ = writeln!(host.error(), "Could not resolve '{url}': {e}");
            }
        }
    }

    Ok(identities)
}
