use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    SubmitBids,
    SubmitTricks,
    ConfirmYellowCards,
    FinalizeRound,
    EditHistory,
    ResetGame,
    ResetEverything,
}

impl ActionKind {
    pub const fn title(self) -> &'static str {
        match self {
            ActionKind::SubmitBids => "Confirm bids",
            ActionKind::SubmitTricks => "Confirm tricks",
            ActionKind::ConfirmYellowCards => "Confirm yellow cards",
            ActionKind::FinalizeRound => "Round summary",
            ActionKind::EditHistory => "Update history",
            ActionKind::ResetGame => "Reset game (names are kept)",
            ActionKind::ResetEverything => "Reset everything",
        }
    }
}

/// What a state-changing action is about to commit, shown before it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSummary {
    pub kind: ActionKind,
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
}

impl ActionSummary {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

impl fmt::Display for ActionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.kind.title())?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}

/// Decides whether a summarized action may commit. Declining leaves the match
/// untouched.
pub trait ConfirmationGate {
    fn confirm(&mut self, summary: &ActionSummary) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(&ActionSummary) -> bool,
{
    fn confirm(&mut self, summary: &ActionSummary) -> bool {
        self(summary)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ConfirmationGate for AutoApprove {
    fn confirm(&mut self, _summary: &ActionSummary) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl ConfirmationGate for AutoDecline {
    fn confirm(&mut self, _summary: &ActionSummary) -> bool {
        false
    }
}
