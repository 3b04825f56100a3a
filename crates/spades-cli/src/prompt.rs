use std::io::{self, BufRead, Write};

use spades_core::game::confirm::{ActionSummary, ConfirmationGate};
use tracing::warn;

/// Shows the summary on `output` and waits for a yes/no answer on `input`.
/// Anything but an explicit yes declines, including end of input.
pub struct PromptGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, summary: &ActionSummary) -> io::Result<bool> {
        write!(self.output, "{summary}Proceed? [y/N] ")?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for PromptGate<R, W> {
    fn confirm(&mut self, summary: &ActionSummary) -> bool {
        match self.ask(summary) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(%err, "confirmation prompt failed; treating as declined");
                false
            }
        }
    }
}

/// The gate the binary hands to the match: an interactive prompt, or
/// automatic approval with the summary still printed.
pub enum CliGate {
    Prompt(PromptGate<io::StdinLock<'static>, io::Stderr>),
    Auto,
}

impl CliGate {
    pub fn new(auto_confirm: bool) -> Self {
        if auto_confirm {
            CliGate::Auto
        } else {
            CliGate::Prompt(PromptGate::new(io::stdin().lock(), io::stderr()))
        }
    }
}

impl ConfirmationGate for CliGate {
    fn confirm(&mut self, summary: &ActionSummary) -> bool {
        match self {
            CliGate::Prompt(prompt) => prompt.confirm(summary),
            CliGate::Auto => {
                eprint!("{summary}");
                true
            }
        }
    }
}
