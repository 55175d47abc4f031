use anyhow::{Context as _, Result};
use geodatahub_access::{DataHub, StacGateway};
use geodatahub_core::config::{CliConfigOverrides, LayeredConfig, LlmCredentials};
use geodatahub_geo::NominatimGeocoder;
use geodatahub_llm::select_backend;
use geodatahub_nlp::NlParser;
use std::path::Path;
use std::sync::Arc;

use crate::output::OutputWriter;

/// Configuration and output shared by every command
pub struct AppContext<'a> {
    pub config: LayeredConfig,
    pub output: &'a OutputWriter,
}

impl<'a> AppContext<'a> {
    /// Load layered config, then apply command-line values on top
    pub fn load(
        config_file: Option<&Path>,
        overrides: CliConfigOverrides,
        output: &'a OutputWriter,
    ) -> Result<Self> {
        let mut config = LayeredConfig::load(config_file).context("Failed to load configuration")?;
        config.update_from_cli(overrides);
        tracing::debug!(llm_backend = %config.llm_backend.value, "Configuration loaded");
        Ok(Self { config, output })
    }

    /// Parser wired to the configured LLM backend and geocoder
    pub async fn parser(&self) -> Result<NlParser> {
        let credentials = LlmCredentials::from_env();
        let backend = select_backend(&self.config, &credentials, self.config.llm_backend.value).await?;
        match backend {
            Some(ref backend) => tracing::info!(backend = backend.name(), "Using LLM backend"),
            None => tracing::info!("No LLM backend, parsing with rules only"),
        }

        let geocoder = NominatimGeocoder::new(self.config.geocoder_url.value.clone())?;
        Ok(NlParser::new(backend, Arc::new(geocoder)))
    }

    /// Facade over the configured STAC providers
    pub fn hub(&self) -> Result<DataHub> {
        let gateway = StacGateway::from_config(&self.config)?;
        Ok(DataHub::new(Arc::new(gateway)))
    }
}
