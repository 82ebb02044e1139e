//! Tag-message prompting.
//!
//! The annotated tag message is the only interactive input the flows
//! take, so it sits behind a trait: the binary wires in [StdinPrompt],
//! tests wire in [FixedPrompt].

use std::io::{self, Write};

use crate::error::{ReleaseError, Result};

/// Provides the annotated tag's message.
pub trait TagMessagePrompt {
    /// Ask for the message to attach to the annotated tag.
    fn tag_message(&mut self) -> Result<String>;
}

/// Interactive prompt reading a single free-text line from stdin.
///
/// No default and no validation; whatever the user types (trimmed of
/// the trailing newline) becomes the tag message.
pub struct StdinPrompt;

impl TagMessagePrompt for StdinPrompt {
    fn tag_message(&mut self) -> Result<String> {
        print!("tag message: ");
        io::stdout()
            .flush()
            .map_err(|e| ReleaseError::prompt(e.to_string()))?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| ReleaseError::prompt(e.to_string()))?;

        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Test prompt returning a fixed message.
pub struct FixedPrompt {
    message: String,
}

impl FixedPrompt {
    pub fn new(message: impl Into<String>) -> Self {
        FixedPrompt {
            message: message.into(),
        }
    }
}

impl TagMessagePrompt for FixedPrompt {
    fn tag_message(&mut self) -> Result<String> {
        Ok(self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_prompt_returns_message() {
        let mut prompt = FixedPrompt::new("release 1.2.3");
        assert_eq!(prompt.tag_message().unwrap(), "release 1.2.3");
        // Reusable across calls
        assert_eq!(prompt.tag_message().unwrap(), "release 1.2.3");
    }
}
