use conch_tools::{CommandCandidate, safety};

/// A proposed command rejected by a deny rule. Never eligible for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedCommand {
    pub command: String,
    /// Name of the first deny rule that matched.
    pub rule: &'static str,
}

/// Commands from one assistant reply, partitioned by the safety rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proposal {
    pub safe: Vec<String>,
    pub blocked: Vec<BlockedCommand>,
}

impl Proposal {
    /// Split candidates into safe and blocked lists, preserving order within each.
    #[must_use]
    pub fn classify(candidates: Vec<CommandCandidate>) -> Self {
        let mut proposal = Self::default();
        for candidate in candidates {
            match safety::first_match(&candidate.text) {
                Some(rule) => {
                    tracing::info!(
                        command = %candidate.text,
                        rule = rule.name,
                        "blocked unsafe command"
                    );
                    proposal.blocked.push(BlockedCommand {
                        command: candidate.text,
                        rule: rule.name,
                    });
                }
                None => proposal.safe.push(candidate.text),
            }
        }
        proposal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Empty input (or EOF) at the selection prompt.
    UserCancelled,
    /// Input that was neither "y"/"a" nor a list of in-range indices.
    InvalidSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Run(Vec<String>),
    Cancelled(CancelReason),
}

/// Resolve the user's answer against the numbered safe commands.
///
/// `y`/`a` (any case) selects everything, empty input cancels, and otherwise
/// every whitespace-separated token must be a 1-based index into `safe`.
/// Indices are honoured in the order typed; repeats run repeatedly.
#[must_use]
pub fn select(input: &str, safe: &[String]) -> Selection {
    let input = input.trim();
    if input.is_empty() {
        return Selection::Cancelled(CancelReason::UserCancelled);
    }
    if input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("a") {
        return Selection::Run(safe.to_vec());
    }

    let picked: Option<Vec<String>> = input
        .split_whitespace()
        .map(|token| {
            let index = token.parse::<usize>().ok()?;
            safe.get(index.checked_sub(1)?).cloned()
        })
        .collect();

    match picked {
        Some(commands) if !commands.is_empty() => Selection::Run(commands),
        _ => Selection::Cancelled(CancelReason::InvalidSelection),
    }
}
