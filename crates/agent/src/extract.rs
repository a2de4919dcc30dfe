//! Tool-call extraction from free-form model output.
//!
//! Delimiter pairs are located first; each captured span is then decoded on
//! its own, so one malformed block never hides the ones around it.

use orangutan_core::tool::ToolCall;
use tracing::debug;

const OPEN: &str = "<tool>";
const CLOSE: &str = "</tool>";

/// Outcome of decoding one `<tool>` span.
#[derive(Debug, PartialEq)]
enum Block {
    Call(ToolCall),
    Skip(String),
}

fn decode(inner: &str) -> Block {
    match serde_json::from_str::<ToolCall>(inner.trim()) {
        Ok(call) if call.tool.trim().is_empty() => Block::Skip("empty tool name".into()),
        Ok(call) => Block::Call(call),
        Err(e) => Block::Skip(e.to_string()),
    }
}

/// Byte ranges of the inner text of every `<tool>...</tool>` pair, left to
/// right, non-overlapping. Each span opens at the last `<tool>` before its
/// closing tag, so a stray opener in prose never swallows the block after it.
/// An unterminated opener ends the scan.
fn spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    while let Some(close) = text[cursor..].find(CLOSE) {
        let end = cursor + close;
        if let Some(open) = text[cursor..end].rfind(OPEN) {
            spans.push((cursor + open + OPEN.len(), end));
        }
        cursor = end + CLOSE.len();
    }
    spans
}

/// Extract every well-formed tool call from `text`, in document order.
///
/// Blocks whose body is not a JSON object with a non-empty string `tool`
/// (and, if present, an object `params`) are skipped silently.
pub fn extract_tool_calls(text: &str) -> Vec<ToolCall> {
    spans(text)
        .into_iter()
        .enumerate()
        .filter_map(|(index, (start, end))| match decode(&text[start..end]) {
            Block::Call(call) => Some(call),
            Block::Skip(reason) => {
                debug!(index, %reason, "Skipping malformed tool block");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(calls: &[ToolCall]) -> Vec<&str> {
        calls.iter().map(|c| c.tool.as_str()).collect()
    }

    #[test]
    fn plain_text_has_no_calls() {
        let text = "I looked at the code and everything is fine.";
        assert!(extract_tool_calls(text).is_empty());
        assert!(extract_tool_calls("").is_empty());
    }

    #[test]
    fn single_block_with_surrounding_prose() {
        let text = "Let me read it.\n<tool>\n{\"tool\": \"read_file\", \"params\": {\"path\": \"src/main.rs\"}}\n</tool>\nDone.";
        let calls = extract_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "read_file");
        assert_eq!(calls[0].params["path"], "src/main.rs");
    }

    #[test]
    fn multiple_blocks_keep_document_order() {
        let text = r#"<tool>{"tool": "a"}</tool> then <tool>{"tool": "b", "params": {}}</tool><tool>{"tool":"c","params":{"x":1}}</tool>"#;
        assert_eq!(names(&extract_tool_calls(text)), vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_blocks_are_skipped_wherever_they_sit() {
        let good = |n: &str| format!(r#"<tool>{{"tool": "{n}"}}</tool>"#);
        let bad = [
            "<tool>{not json}</tool>",
            r#"<tool>{"params": {}}</tool>"#,
            r#"<tool>{"tool": ""}</tool>"#,
            r#"<tool>{"tool": "x", "params": [1, 2]}</tool>"#,
            r#"<tool>{"tool": 42}</tool>"#,
        ];
        for position in 0..=2 {
            let mut parts = vec![good("first"), good("second")];
            parts.insert(position, bad.join("\n"));
            let text = parts.join("\nprose\n");
            assert_eq!(
                names(&extract_tool_calls(&text)),
                vec!["first", "second"],
                "malformed blocks at position {position}"
            );
        }
    }

    #[test]
    fn unterminated_block_is_ignored() {
        let text = r#"<tool>{"tool": "a"}</tool> <tool>{"tool": "b"}"#;
        assert_eq!(names(&extract_tool_calls(text)), vec!["a"]);
    }

    #[test]
    fn stray_opener_in_prose_does_not_hide_the_next_block() {
        let text = r#"I will emit a <tool> block now: <tool>{"tool": "read_file", "params": {"path": "a"}}</tool>"#;
        let calls = extract_tool_calls(text);
        assert_eq!(names(&calls), vec!["read_file"]);
        assert_eq!(calls[0].params["path"], "a");
    }

    #[test]
    fn unclosed_opener_before_blocks_is_ignored() {
        let text = r#"<tool>{"tool": "broken" <tool>{"tool": "a"}</tool> and </tool> <tool>{"tool": "b"}</tool>"#;
        assert_eq!(names(&extract_tool_calls(text)), vec!["a", "b"]);
    }

    #[test]
    fn null_params_become_empty() {
        let calls = extract_tool_calls(r#"<tool>{"tool": "list_directory", "params": null}</tool>"#);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].params.is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let text = r#"x <tool>{"tool": "a"}</tool> <tool>bad</tool> <tool>{"tool": "b"}</tool>"#;
        assert_eq!(extract_tool_calls(text), extract_tool_calls(text));
    }

    #[test]
    fn decode_reports_skip_reason() {
        assert!(matches!(decode("{oops"), Block::Skip(_)));
        assert!(matches!(decode(r#" {"tool": "t"} "#), Block::Call(_)));
    }
}
