use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;

/// Read a newline-separated list of URLs, trimming each line and dropping blank ones.
///
/// Order is preserved so output records line up with the input file.
pub fn read_url_list(path: &Utf8Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).into_app_err_with(|| format!("reading URL list '{path}'"))?;
    Ok(parse_url_list(&text))
}

fn parse_url_list(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).map(String::from).collect()
}
