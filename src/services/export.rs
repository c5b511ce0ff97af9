use crate::models::CheckResult;

/// Newline-joined URLs of working results, in result order
pub fn working_links_text(results: &[CheckResult]) -> String {
    results
        .iter()
        .filter(|r| r.is_working)
        .map(|r| r.url.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
