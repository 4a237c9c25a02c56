use std::io::{self, BufRead, Write};

use crate::errors::DemoError;

/// Blocking operator console. The binary reads stdin; tests script answers.
pub trait Prompt: Send + Sync {
    fn prompt_line(&self, question: &str) -> io::Result<String>;
}

/// Stdin-backed prompt for interactive runs.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn prompt_line(&self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{question}")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Asks the console for a count. An unparsable answer is a usage error and
/// ends the run; the operator can simply start over.
pub fn prompt_count(prompt: &dyn Prompt, question: &str) -> Result<u32, DemoError> {
    let line = prompt.prompt_line(question).map_err(DemoError::Console)?;
    let input = line.trim();
    input
        .parse()
        .map_err(|source| DemoError::InvalidCount {
            input: input.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(&'static str);

    impl Prompt for Scripted {
        fn prompt_line(&self, _question: &str) -> io::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn counts_parse_with_surrounding_whitespace() {
        assert_eq!(prompt_count(&Scripted("  7\n"), "how many?").unwrap(), 7);
    }

    #[test]
    fn non_numeric_answers_are_usage_errors() {
        let err = prompt_count(&Scripted("lots\n"), "how many?").unwrap_err();
        assert!(matches!(err, DemoError::InvalidCount { input, .. } if input == "lots"));
    }

    #[test]
    fn negative_answers_are_rejected() {
        let err = prompt_count(&Scripted("-3\n"), "how many?").unwrap_err();
        assert!(matches!(err, DemoError::InvalidCount { .. }));
    }
}
