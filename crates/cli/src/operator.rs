//! The terminal implementation of [`Operator`], used by `ask_user`.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use crossterm::style::Stylize;
use orangutan_core::operator::{Operator, OperatorReply};

use crate::console::{Console, ReadResult};

/// Asks questions on stdout and reads answers from the shared console.
pub struct TerminalOperator {
    console: Arc<Console>,
}

impl TerminalOperator {
    pub fn new(console: Arc<Console>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl Operator for TerminalOperator {
    async fn ask(&self, question: &str, options: &[String]) -> OperatorReply {
        println!();
        println!("{} {}", "?".cyan().bold(), question.bold());
        for (i, option) in options.iter().enumerate() {
            println!("  {} {option}", format!("{}.", i + 1).cyan());
        }

        loop {
            print!("{} ", ">".cyan());
            let _ = std::io::stdout().flush();

            let line = match self.console.read_line().await {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted | ReadResult::Eof => {
                    println!();
                    return OperatorReply::Cancelled;
                }
            };

            if options.is_empty() {
                return OperatorReply::Text(line.trim().to_string());
            }
            match pick_choice(&line, options) {
                Some(choice) => return OperatorReply::Choice(choice),
                None => println!(
                    "{}",
                    format!("Enter a number between 1 and {}.", options.len()).yellow()
                ),
            }
        }
    }
}

/// Resolve a typed answer to one of `options`: a 1-based number or the
/// option text itself (case-insensitive).
pub fn pick_choice(input: &str, options: &[String]) -> Option<String> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).cloned();
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(input))
        .cloned()
}
