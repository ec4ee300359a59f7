//! Reasoning-block removal for thinking models.
//!
//! Reasoning models such as DeepSeek R1 may prefix their answer with a
//! `<think>...</think>` block. Only the text outside those blocks is note
//! material.

const OPEN_TAG: &str = "<think>";
const CLOSE_TAG: &str = "</think>";

/// Remove every `<think>...</think>` block from a model response.
///
/// An unclosed opening tag swallows the rest of the response, since the
/// model never reached its answer.
///
/// ```
/// use notesai_inference::thinking::strip_thinking;
///
/// let raw = "<think>The user wants a list.</think>Milk, eggs, bread.";
/// assert_eq!(strip_thinking(raw), "Milk, eggs, bread.");
/// ```
pub fn strip_thinking(response: &str) -> String {
    let mut answer = String::with_capacity(response.len());
    let mut rest = response;

    while let Some(start) = rest.find(OPEN_TAG) {
        answer.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN_TAG.len()..];
        match after_open.find(CLOSE_TAG) {
            Some(end) => rest = &after_open[end + CLOSE_TAG.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    answer.push_str(rest);
    answer
}
