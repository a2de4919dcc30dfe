//! ask_user: hand a question to the developer and wait for the answer.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use orangutan_core::error::ToolError;
use orangutan_core::operator::{Operator, OperatorReply};
use orangutan_core::tool::{Params, Tool};

use crate::params::{optional_str, string_list};
use crate::step;

/// Extra choice appended to every option list; picking it asks for free text.
pub const CUSTOM_ANSWER: &str = "Other (type custom answer)";

const CANCELLED: &str = "[User cancelled the prompt]";

pub struct AskUserTool {
    operator: Arc<dyn Operator>,
}

impl AskUserTool {
    pub fn new(operator: Arc<dyn Operator>) -> Self {
        Self { operator }
    }

    async fn answer(&self, question: &str, options: Vec<String>) -> String {
        if options.is_empty() {
            return match self.operator.ask(question, &[]).await {
                OperatorReply::Choice(text) | OperatorReply::Text(text) => {
                    format!("[User answer] {text}")
                }
                OperatorReply::Cancelled => CANCELLED.to_string(),
            };
        }

        let mut choices = options;
        choices.push(CUSTOM_ANSWER.to_string());
        match self.operator.ask(question, &choices).await {
            OperatorReply::Choice(choice) if choice == CUSTOM_ANSWER => {
                match self.operator.ask("Your answer:", &[]).await {
                    OperatorReply::Choice(text) | OperatorReply::Text(text) => {
                        format!("[User answer] {text}")
                    }
                    OperatorReply::Cancelled => CANCELLED.to_string(),
                }
            }
            OperatorReply::Choice(text) | OperatorReply::Text(text) => {
                format!("[User answer] {text}")
            }
            OperatorReply::Cancelled => CANCELLED.to_string(),
        }
    }
}

#[async_trait]
impl Tool for AskUserTool {
    fn name(&self) -> &str {
        "ask_user"
    }

    fn description(&self) -> &str {
        "Ask the developer a question, optionally with a list of choices. Use it before decisions you cannot make alone."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "description": "The question to ask"
                },
                "options": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Choices to pick from; a free-text option is always added"
                }
            },
            "required": ["question"]
        })
    }

    async fn execute(&self, params: &Params, _root: &Path) -> Result<String, ToolError> {
        let question = optional_str(params, "question")?.unwrap_or_default();
        if question.is_empty() {
            return Ok("[Error] ask_user requires a 'question' parameter.".to_string());
        }
        let options = string_list(params, "options")?;

        step("ask_user", "waiting for developer input...");
        let result = self.answer(&question, options).await;
        step("ask_user", &result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every prompt it was shown.
    struct ScriptedOperator {
        replies: Mutex<VecDeque<OperatorReply>>,
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedOperator {
        fn new(replies: Vec<OperatorReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Operator for ScriptedOperator {
        async fn ask(&self, question: &str, options: &[String]) -> OperatorReply {
            self.seen
                .lock()
                .unwrap()
                .push((question.to_string(), options.to_vec()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(OperatorReply::Cancelled)
        }
    }

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn free_text_question() {
        let op = ScriptedOperator::new(vec![OperatorReply::Text("use tabs".into())]);
        let tool = AskUserTool::new(op.clone());
        let out = tool
            .execute(&params(json!({"question": "Indentation?"})), Path::new("."))
            .await
            .unwrap();
        assert_eq!(out, "[User answer] use tabs");
        assert_eq!(op.seen.lock().unwrap()[0], ("Indentation?".to_string(), vec![]));
    }

    #[tokio::test]
    async fn choice_list_gets_custom_option() {
        let op = ScriptedOperator::new(vec![OperatorReply::Choice("pytest".into())]);
        let tool = AskUserTool::new(op.clone());
        let out = tool
            .execute(
                &params(json!({"question": "Test runner?", "options": ["pytest", "unittest"]})),
                Path::new("."),
            )
            .await
            .unwrap();
        assert_eq!(out, "[User answer] pytest");
        let seen = op.seen.lock().unwrap();
        assert_eq!(seen[0].1, vec!["pytest", "unittest", CUSTOM_ANSWER]);
    }

    #[tokio::test]
    async fn custom_option_asks_follow_up() {
        let op = ScriptedOperator::new(vec![
            OperatorReply::Choice(CUSTOM_ANSWER.into()),
            OperatorReply::Text("nextest".into()),
        ]);
        let tool = AskUserTool::new(op.clone());
        let out = tool
            .execute(
                &params(json!({"question": "Test runner?", "options": ["pytest"]})),
                Path::new("."),
            )
            .await
            .unwrap();
        assert_eq!(out, "[User answer] nextest");
        assert_eq!(op.seen.lock().unwrap()[1].0, "Your answer:");
    }

    #[tokio::test]
    async fn cancellation_is_a_marker_not_an_error() {
        let op = ScriptedOperator::new(vec![OperatorReply::Cancelled]);
        let out = AskUserTool::new(op)
            .execute(&params(json!({"question": "Proceed?", "options": ["yes"]})), Path::new("."))
            .await
            .unwrap();
        assert_eq!(out, "[User cancelled the prompt]");

        let op = ScriptedOperator::new(vec![
            OperatorReply::Choice(CUSTOM_ANSWER.into()),
            OperatorReply::Cancelled,
        ]);
        let out = AskUserTool::new(op)
            .execute(&params(json!({"question": "Proceed?", "options": ["yes"]})), Path::new("."))
            .await
            .unwrap();
        assert_eq!(out, "[User cancelled the prompt]");
    }

    #[tokio::test]
    async fn missing_question() {
        let op = ScriptedOperator::new(vec![]);
        let out = AskUserTool::new(op.clone())
            .execute(&params(json!({"options": ["a"]})), Path::new("."))
            .await
            .unwrap();
        assert_eq!(out, "[Error] ask_user requires a 'question' parameter.");
        assert!(op.seen.lock().unwrap().is_empty());
    }
}
