use console::style;
use geodatahub_core::error::{GeodatahubError, ProviderOperation};
use std::fmt;

use crate::output::OutputWriter;

/// Error with context and suggestions for the user
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<&GeodatahubError> for CliError {
    fn from(err: &GeodatahubError) -> Self {
        match err {
            GeodatahubError::ParseError { .. } => query_not_understood(&err.to_string()),
            GeodatahubError::InvalidRequest { .. } => CliError::new("Invalid search request")
                .with_context(err.to_string())
                .with_help("Run: geodatahub search --help"),
            GeodatahubError::BackendUnavailable { backend, reason } => llm_unavailable(backend, reason),
            GeodatahubError::Provider { operation, provider, message } => {
                provider_failed(*operation, provider, message)
            }
            GeodatahubError::ProductNotFound { id } => CliError::new(format!("No provider offers {}", id))
                .with_suggestion("See what is available: geodatahub list products")
                .with_suggestion("Pick a product with --product"),
            GeodatahubError::ConfigMissing { .. } | GeodatahubError::ConfigInvalid { .. } => {
                CliError::new("Configuration error")
                    .with_context(err.to_string())
                    .with_suggestion("Inspect the effective settings: geodatahub config")
            }
            _ => CliError::new(err.to_string()),
        }
    }
}

/// Neither the query nor the flags named a product or a date
pub fn query_not_understood(detail: &str) -> CliError {
    CliError::new("Could not understand the query")
        .with_context(detail.to_string())
        .with_suggestion("Mention a product (\"Sentinel-2\", \"Landsat\", \"DEM\") or a date (\"last week\", \"January 2024\")")
        .with_suggestion("Or pass explicit fields: --product S2_MSI_L2A --start 2024-01-01")
        .with_help("Run: geodatahub search --help")
}

/// An explicitly requested LLM backend cannot be used
pub fn llm_unavailable(backend: &str, reason: &str) -> CliError {
    CliError::new(format!("LLM backend {} is not available", backend))
        .with_context(reason.to_string())
        .with_suggestion("Set GROQ_API_KEY or OPENROUTER_API_KEY for a hosted backend")
        .with_suggestion("Or start Ollama locally: ollama serve")
        .with_suggestion("Or parse with rules only: --llm regex")
}

/// A provider call failed
pub fn provider_failed(operation: ProviderOperation, provider: &str, message: &str) -> CliError {
    CliError::new(format!("Provider {} failed during {}", provider, operation))
        .with_context(message.to_string())
        .with_suggestion("Try again later or pick another provider with --provider")
        .with_suggestion("See configured providers: geodatahub list providers")
}

/// Search criteria missing entirely
pub fn nothing_to_search() -> CliError {
    CliError::new("Nothing to search for")
        .with_suggestion("Give a query: geodatahub search \"Sentinel-2 images of Paris last week\"")
        .with_suggestion("Or explicit fields: --product, --location, --start, --end, --bbox")
        .with_help("Run: geodatahub search --help")
}

/// Downloads need confirmation but no terminal is attached
pub fn confirmation_required() -> CliError {
    CliError::new("Confirmation required")
        .with_context("Standard error is not a terminal, so the download prompt cannot be shown.")
        .with_suggestion("Re-run with --yes to download without asking")
}

/// Some downloads in a batch failed
pub fn downloads_failed(failed: usize, total: usize) -> CliError {
    CliError::new(format!("{} of {} downloads failed", failed, total))
        .with_suggestion("Re-run the download to retry the failed products")
        .with_suggestion("Run with RUST_LOG=geodatahub_access=debug for details")
}

/// Print `err` the way the output mode expects
pub fn report(err: &anyhow::Error, output: &OutputWriter) {
    if output.is_json() {
        output.error(format!("{:#}", err));
        return;
    }

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        cli_err.display();
    } else if let Some(domain_err) = err.downcast_ref::<GeodatahubError>() {
        CliError::from(domain_err).display();
    } else {
        output.error(format!("{:#}", err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_suggestions() {
        let err = GeodatahubError::ParseError { reason: "no product or date found in 'hello'".to_string() };
        let cli_err = CliError::from(&err);
        assert_eq!(cli_err.message, "Could not understand the query");
        assert!(cli_err.context.as_deref().unwrap_or_default().contains("hello"));
        assert_eq!(cli_err.suggestions.len(), 2);

        let err = GeodatahubError::provider(ProviderOperation::Download, "earth_search", "HTTP 503");
        let cli_err = CliError::from(&err);
        assert!(cli_err.message.contains("earth_search"));
        assert_eq!(cli_err.context.as_deref(), Some("HTTP 503"));
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err = anyhow::Error::from(downloads_failed(1, 3));
        let cli_err = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli_err.to_string(), "1 of 3 downloads failed");
    }
}
