use thiserror::Error;

// ---------------------------------------------------------------------------
// User-facing error states
// ---------------------------------------------------------------------------

/// The three recoverable states the dashboard reports to the user.
///
/// None of these abort the session: each is shown in the status line (or in
/// place of the chart) and clears as soon as the user changes the offending
/// input. All are deterministic given the same dataset and selections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExploreError {
    /// The uploaded bytes could not be read as delimited text, or parsed to
    /// zero rows/columns. Terminal for the current interaction.
    #[error("Could not load CSV: {0}")]
    LoadFailure(String),

    /// Zero rows survive the active filters. Charts, summaries and previews
    /// show a prompt to loosen filters instead of rendering.
    #[error("No data after filtering: loosen the active filters")]
    EmptyResult,

    /// The chosen X/Y columns do not satisfy any chart rule for the selected
    /// relationship mode. The message names which column needs to change.
    #[error("Unsupported column combination: {0}")]
    UnsupportedCombination(String),
}

impl ExploreError {
    pub fn load(err: impl std::fmt::Display) -> Self {
        ExploreError::LoadFailure(format!("{err:#}"))
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        ExploreError::UnsupportedCombination(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages_use_plain_punctuation() {
        let messages = [
            ExploreError::LoadFailure("bad bytes".into()).to_string(),
            ExploreError::EmptyResult.to_string(),
            ExploreError::unsupported("pick a numeric Y").to_string(),
        ];
        for msg in messages {
            assert!(msg.is_ascii(), "{msg}");
        }
    }
}
