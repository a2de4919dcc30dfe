//! Orangutan CLI: the main entry point.
//!
//! `orangutan [--path DIR] [--model M] [-v]` opens an interactive session
//! against a local Ollama server, confined to the project directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use crossterm::style::Stylize;
use orangutan_config::AppConfig;
use orangutan_core::Error;
use orangutan_core::provider::Provider;
use orangutan_providers::OllamaProvider;
use tracing::{debug, warn};

mod console;
mod operator;
mod repl;

#[derive(Parser)]
#[command(
    name = "orangutan",
    about = "Orangutan: a terminal coding assistant for local models",
    version
)]
struct Cli {
    /// Project directory the assistant works in
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> orangutan_core::Result<()> {
    let root = project_root(&cli.path)?;
    let mut config = AppConfig::load().map_err(|e| Error::Config {
        message: e.to_string(),
    })?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    debug!(root = %root.display(), model = %config.model, "Starting session");

    let provider: Arc<dyn Provider> = Arc::new(OllamaProvider::from_config(&config)?);
    if let Some(warning) = backend_warning(provider.as_ref(), &config).await {
        println!("{}", warning.yellow());
    }

    let console = Arc::new(console::Console::stdin());
    repl::Repl::new(root, config, provider, console).run().await;

    Ok(())
}

/// Canonicalize `path` and require it to be a directory.
fn project_root(path: &Path) -> orangutan_core::Result<PathBuf> {
    let root = path.canonicalize().map_err(|e| Error::Config {
        message: format!("cannot open project directory {}: {e}", path.display()),
    })?;
    if !root.is_dir() {
        return Err(Error::Config {
            message: format!("{} is not a directory", root.display()),
        });
    }
    Ok(root)
}

/// A startup warning when the backend is down or lacks the model. Never fatal.
async fn backend_warning(provider: &dyn Provider, config: &AppConfig) -> Option<String> {
    let reachable = match provider.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Backend health check failed");
            false
        }
    };
    if !reachable {
        return Some(format!(
            "Cannot reach Ollama at {}. Is `ollama serve` running?",
            config.backend.base_url
        ));
    }

    let wanted = config.model.as_str();
    match provider.list_models().await {
        Ok(models)
            if !models
                .iter()
                .any(|m| m == wanted || m.strip_suffix(":latest") == Some(wanted)) =>
        {
            Some(format!(
                "Model '{wanted}' is not installed. Run: ollama pull {wanted}"
            ))
        }
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "Could not list backend models");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::CommandFactory;
    use orangutan_core::error::ProviderError;
    use orangutan_core::provider::{ChunkReceiver, ProviderRequest};

    /// A backend with a fixed reachability and model list.
    struct StubBackend {
        up: bool,
        models: Vec<String>,
    }

    #[async_trait]
    impl Provider for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn stream(&self, _request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
            Err(ProviderError::Network("unused".into()))
        }

        async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
            Ok(self.models.clone())
        }

        async fn health_check(&self) -> Result<bool, ProviderError> {
            if self.up {
                Ok(true)
            } else {
                Err(ProviderError::Network("connection refused".into()))
            }
        }
    }

    fn config(model: &str) -> AppConfig {
        AppConfig {
            model: model.into(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported() {
        let backend = StubBackend {
            up: false,
            models: vec![],
        };
        let warning = backend_warning(&backend, &config("qwen2.5-coder:7b")).await.unwrap();
        assert!(warning.starts_with("Cannot reach Ollama at http://localhost:11434"));
    }

    #[tokio::test]
    async fn missing_model_is_reported() {
        let backend = StubBackend {
            up: true,
            models: vec!["llama3.1:8b".into()],
        };
        let warning = backend_warning(&backend, &config("qwen2.5-coder:7b")).await.unwrap();
        assert_eq!(
            warning,
            "Model 'qwen2.5-coder:7b' is not installed. Run: ollama pull qwen2.5-coder:7b"
        );
    }

    #[tokio::test]
    async fn installed_model_needs_no_warning() {
        let backend = StubBackend {
            up: true,
            models: vec!["mistral:latest".into(), "qwen2.5-coder:7b".into()],
        };
        assert!(backend_warning(&backend, &config("qwen2.5-coder:7b")).await.is_none());
        assert!(backend_warning(&backend, &config("mistral")).await.is_none());
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from(["orangutan", "-p", "/tmp", "--model", "llama3.1:8b", "-v"]);
        assert_eq!(cli.path, PathBuf::from("/tmp"));
        assert_eq!(cli.model.as_deref(), Some("llama3.1:8b"));
        assert!(cli.verbose);

        let cli = Cli::parse_from(["orangutan"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.model.is_none());
    }

    #[test]
    fn project_root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(project_root(dir.path()).unwrap().is_dir());
        assert!(project_root(&dir.path().join("missing")).is_err());

        let file = dir.path().join("a.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(project_root(&file).is_err());
    }
}
