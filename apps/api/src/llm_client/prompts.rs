/// System prompt for one-line repository summaries.
pub const REPO_SUMMARY_SYSTEM: &str = "You are a helpful assistant that summarizes GitHub repositories. \
    Create a concise 1-2 sentence summary of what the project does based on the README. \
    Focus on the main purpose and technology used. Keep it under 150 characters.";

/// User prompt for a repository summary. `{repo_name}` and `{readme}` are substituted.
pub const REPO_SUMMARY_PROMPT: &str = "Summarize this GitHub repository \"{repo_name}\":\n\n{readme}";

pub fn repo_summary_prompt(repo_name: &str, readme: &str) -> String {
    REPO_SUMMARY_PROMPT
        .replace("{repo_name}", repo_name)
        .replace("{readme}", readme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_summary_prompt_substitutes_both_fields() {
        let prompt = repo_summary_prompt("mantle-bridge", "# Bridge\nMoves MNT.");
        assert!(prompt.starts_with("Summarize this GitHub repository \"mantle-bridge\":"));
        assert!(prompt.ends_with("# Bridge\nMoves MNT."));
    }
}
