const OPEN_TAG: &str = "<command>";
const CLOSE_TAG: &str = "</command>";

/// One shell command line proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCandidate {
    pub text: String,
    /// Zero-based index of the `<command>` block the line came from.
    pub origin_block: usize,
}

/// Extract command lines from every `<command>...</command>` block in `text`.
///
/// Blocks are scanned left to right without overlap; an unclosed trailing tag
/// is ignored. Each block is split into lines, trimmed, and blank lines are
/// dropped. An empty result means the model proposed nothing to run.
#[must_use]
pub fn extract_commands(text: &str) -> Vec<CommandCandidate> {
    let mut candidates = Vec::new();
    let mut rest = text;
    let mut block = 0;

    while let Some(start) = rest.find(OPEN_TAG) {
        let after = &rest[start + OPEN_TAG.len()..];
        let Some(end) = after.find(CLOSE_TAG) else {
            break;
        };
        candidates.extend(
            after[..end]
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| CommandCandidate {
                    text: line.to_owned(),
                    origin_block: block,
                }),
        );
        block += 1;
        rest = &after[end + CLOSE_TAG.len()..];
    }

    candidates
}
