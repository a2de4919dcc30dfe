//! The interactive read-eval loop.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossterm::style::Stylize;
use orangutan_agent::prompt::TREE_DEPTH;
use orangutan_agent::{
    AgentLoop, ChatSession, SessionConfig, TurnState, build_directory_tree, build_system_prompt,
};
use orangutan_config::{AppConfig, ProjectMemory};
use orangutan_core::provider::Provider;
use orangutan_core::tool::ToolRegistry;
use tracing::{info, warn};

use crate::console::{Console, ReadResult};
use crate::operator::TerminalOperator;

/// A slash command typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Clear,
    Tree,
    Unknown(String),
}

/// One classified prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Command(Command),
    Message(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let name = rest.split_whitespace().next().unwrap_or_default();
    let command = match name.to_ascii_lowercase().as_str() {
        "help" => Command::Help,
        "exit" | "quit" => Command::Exit,
        "clear" => Command::Clear,
        "tree" => Command::Tree,
        _ => Command::Unknown(line.to_string()),
    };
    Input::Command(command)
}

const HELP: &[(&str, &str)] = &[
    ("/help", "Show this help"),
    ("/clear", "Start a fresh conversation"),
    ("/tree", "Show the project tree"),
    ("/exit", "Quit (also /quit, Ctrl-C)"),
];

pub struct Repl {
    root: PathBuf,
    config: AppConfig,
    provider: Arc<dyn Provider>,
    registry: Arc<ToolRegistry>,
    agent: AgentLoop,
    session: ChatSession,
    console: Arc<Console>,
}

impl Repl {
    pub fn new(
        root: PathBuf,
        config: AppConfig,
        provider: Arc<dyn Provider>,
        console: Arc<Console>,
    ) -> Self {
        let operator = Arc::new(TerminalOperator::new(console.clone()));
        let registry = Arc::new(orangutan_tools::default_registry(&config.tools, operator));
        let agent = AgentLoop::new(registry.clone(), root.clone())
            .with_max_rounds(config.agent.max_tool_rounds);
        let session = new_session(&root, &config, &provider, &registry);

        Self {
            root,
            config,
            provider,
            registry,
            agent,
            session,
            console,
        }
    }

    /// Run until `/exit`, Ctrl-C or end of input.
    pub async fn run(&mut self) {
        self.banner();

        loop {
            print!("{} ", "you >".green().bold());
            let _ = std::io::stdout().flush();

            let line = match self.console.read_line().await {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted | ReadResult::Eof => break,
            };

            match parse_input(&line) {
                Input::Empty => {}
                Input::Command(Command::Exit) => break,
                Input::Command(command) => self.command(command),
                Input::Message(text) => self.turn(&text).await,
            }
        }

        println!();
        println!("Goodbye!");
    }

    async fn turn(&mut self, text: &str) {
        println!();
        let outcome = self.agent.run_turn(&mut self.session, text).await;
        info!(rounds = outcome.rounds, state = ?outcome.state, "Turn finished");
        if outcome.state == TurnState::RoundLimitReached {
            println!(
                "{}",
                format!(
                    "[Stopped after {} tool rounds. Send a message to continue.]",
                    outcome.rounds
                )
                .yellow()
            );
        }
        println!();
    }

    fn command(&mut self, command: Command) {
        match command {
            Command::Help => {
                for (name, what) in HELP {
                    println!("  {}  {what}", format!("{name:<7}").cyan());
                }
            }
            Command::Clear => {
                self.session =
                    new_session(&self.root, &self.config, &self.provider, &self.registry);
                println!("{}", "Conversation cleared.".dim());
            }
            Command::Tree => {
                println!("{}", build_directory_tree(&self.root, TREE_DEPTH));
            }
            Command::Unknown(text) => {
                println!(
                    "{}",
                    format!("Unknown command: {text}. Type /help for commands.").yellow()
                );
            }
            Command::Exit => {}
        }
    }

    fn banner(&self) {
        println!();
        println!("{}", "Orangutan: local coding assistant".bold());
        println!("  Model:     {}", self.config.model.as_str().cyan());
        println!("  Directory: {}", self.root.display().to_string().cyan());
        println!("  Tools:     {}", self.registry.names().join(", ").dim());
        println!("{}", "  Type /help for commands.".dim());
        println!();
    }
}

/// A session with a freshly built system prompt.
fn new_session(
    root: &Path,
    config: &AppConfig,
    provider: &Arc<dyn Provider>,
    registry: &ToolRegistry,
) -> ChatSession {
    let memory = match ProjectMemory::new(root).read() {
        Ok(memory) => memory,
        Err(e) => {
            warn!(error = %e, "Could not read project memory");
            None
        }
    };
    let prompt = build_system_prompt(root, registry, memory.as_deref());
    let session_config =
        SessionConfig::from_app_config(config).with_indicator(std::io::stdout().is_terminal());
    ChatSession::new(provider.clone(), prompt, session_config)
}
