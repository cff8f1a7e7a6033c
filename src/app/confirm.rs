use std::io::{BufRead, Write};

use crate::domain::TestRunConfig;
use crate::error::{AppError, AppResult, ValidationError};

const SAFETY_NOTICE: [&str; 4] = [
    "Only test systems you own or are explicitly authorized to test.",
    "Prefer staging or test environments over production.",
    "Load tests can degrade or take down the target server.",
    "Use this tool responsibly.",
];

/// Prints the safety notice and run parameters, then reads one answer line.
/// Returns `true` only for `yes` (case-insensitive).
///
/// # Errors
///
/// Returns an error if the prompt cannot be written or the answer cannot be read.
pub(crate) fn confirm_run<R, W>(
    mut input: R,
    mut output: W,
    config: &TestRunConfig,
) -> AppResult<bool>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "WARNING:")?;
    for line in SAFETY_NOTICE {
        writeln!(output, "  - {}", line)?;
    }
    writeln!(output)?;
    writeln!(output, "Target: {}", config.url())?;
    writeln!(output, "Requests: {}", config.total_requests().get())?;
    writeln!(output, "Concurrency: {}", config.concurrency().get())?;
    writeln!(output, "Timeout: {:?}", config.timeout())?;
    write!(output, "Continue? (yes/no): ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|source| AppError::validation(ValidationError::ConfirmationRead { source }))?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    fn config() -> Result<TestRunConfig, String> {
        TestRunConfig::new("http://localhost:8080/", 20, 5, Duration::from_secs(3))
            .map_err(|err| err.to_string())
    }

    #[test]
    fn affirmative_answers() -> Result<(), String> {
        for answer in ["yes", "YES", " yes\n", "Yes\r\n"] {
            if !is_affirmative(answer) {
                return Err(format!("Expected '{}' to confirm", answer.escape_debug()));
            }
        }
        for answer in ["", "y", "Y", "no", "n", "yess", "ok"] {
            if is_affirmative(answer) {
                return Err(format!("Expected '{}' to decline", answer));
            }
        }
        Ok(())
    }

    #[test]
    fn confirm_run_prints_notice_and_parameters() -> Result<(), String> {
        let config = config()?;
        let mut output = Vec::new();
        let confirmed = confirm_run(Cursor::new("YES\n"), &mut output, &config)
            .map_err(|err| err.to_string())?;
        if !confirmed {
            return Err("Expected confirmation".to_owned());
        }
        let text = String::from_utf8(output).map_err(|err| err.to_string())?;
        for expected in [
            "authorized",
            "Target: http://localhost:8080/",
            "Requests: 20",
            "Concurrency: 5",
            "Continue? (yes/no)",
        ] {
            if !text.contains(expected) {
                return Err(format!("Missing '{}' in prompt:\n{}", expected, text));
            }
        }
        Ok(())
    }

    #[test]
    fn confirm_run_declines_on_eof() -> Result<(), String> {
        let config = config()?;
        let confirmed = confirm_run(Cursor::new(""), Vec::new(), &config)
            .map_err(|err| err.to_string())?;
        if confirmed {
            return Err("Empty input must not confirm".to_owned());
        }
        Ok(())
    }
}
