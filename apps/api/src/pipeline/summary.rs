use tracing::debug;

use crate::llm_client::prompts::{repo_summary_prompt, REPO_SUMMARY_SYSTEM};
use crate::llm_client::LlmClient;

const SUMMARY_MAX_CHARS: usize = 150;

/// Produces one-line repository summaries. Uses the LLM when a key is
/// configured and falls back to `simple_summary` otherwise or on failure.
#[derive(Clone, Default)]
pub struct Summarizer {
    llm: Option<LlmClient>,
}

impl Summarizer {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn uses_ai(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn summarize(&self, readme: Option<&str>, repo_name: &str) -> Option<String> {
        let readme = readme?;
        if let Some(llm) = &self.llm {
            let prompt = repo_summary_prompt(repo_name, readme);
            match llm.complete(REPO_SUMMARY_SYSTEM, &prompt).await {
                Ok(summary) => return Some(summary),
                Err(e) => debug!("AI summary for {repo_name} failed, using simple summary: {e}"),
            }
        }
        simple_summary(Some(readme), repo_name)
    }
}

/// Summary without an LLM: the first README line that reads like prose.
pub fn simple_summary(readme: Option<&str>, repo_name: &str) -> Option<String> {
    let readme = readme?;

    let first = readme.lines().map(str::trim).find(|line| is_prose_line(line));

    match first {
        Some(line) => {
            let cleaned = line.replace("**", "").replace(['*', '`'], "");
            if cleaned.chars().count() > SUMMARY_MAX_CHARS {
                let cut: String = cleaned.chars().take(SUMMARY_MAX_CHARS - 3).collect();
                Some(format!("{cut}..."))
            } else {
                Some(cleaned)
            }
        }
        None => Some(format!("A project called {repo_name}")),
    }
}

fn is_prose_line(line: &str) -> bool {
    line.chars().count() > 20
        && !line.starts_with('#')
        && !line.starts_with("![")
        && !line.starts_with("[!")
        && !line.starts_with("```")
        && !is_bare_link(line)
        && !line.starts_with('-')
        && !line.starts_with('*')
}

/// `[text](url)` occupying the whole line.
fn is_bare_link(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(')') && line.contains("](")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_readme_no_summary() {
        assert_eq!(simple_summary(None, "repo"), None);
    }

    #[test]
    fn test_skips_headers_badges_and_lists() {
        let readme = "# Mantle Swap\n\
            ![build](https://img.shields.io/badge.svg)\n\
            [Docs and more links here](https://docs.example.com)\n\
            - a list item that is long enough to count\n\
            short line\n\
            A **minimal** swap router for the `Mantle` network with MEV protection.\n\
            Second paragraph that should be ignored entirely.";
        assert_eq!(
            simple_summary(Some(readme), "mantle-swap").as_deref(),
            Some("A minimal swap router for the Mantle network with MEV protection.")
        );
    }

    #[test]
    fn test_falls_back_to_project_name() {
        let readme = "# Title\n\n```\ncode\n```\n";
        assert_eq!(
            simple_summary(Some(readme), "tiny").as_deref(),
            Some("A project called tiny")
        );
    }

    #[test]
    fn test_truncates_long_lines() {
        let readme = "word ".repeat(60);
        let summary = simple_summary(Some(&readme), "long").unwrap();
        assert_eq!(summary.chars().count(), 150);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn test_summarizer_without_key_uses_simple_summary() {
        let summarizer = Summarizer::default();
        assert!(!summarizer.uses_ai());
        let summary = summarizer
            .summarize(Some("This repository deploys contracts to Mantle."), "deployer")
            .await;
        assert_eq!(
            summary.as_deref(),
            Some("This repository deploys contracts to Mantle.")
        );
        assert_eq!(summarizer.summarize(None, "deployer").await, None);
    }
}
