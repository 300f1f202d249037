//! Subcommand implementations
//!
//! Each function does the work of one `avalon` subcommand against a
//! [`Session`]; argument parsing stays in the binary.

pub mod captions;
pub mod collections;
pub mod media_objects;
pub mod supplemental;

use crate::config::CliConfig;
use crate::error::Result;
use avalon_client::{AvalonClient, Instance};
use tracing::debug;

/// A configured client for one Avalon instance.
pub struct Session {
    pub client: AvalonClient,
    pub config: CliConfig,
    pub instance: Instance,
    /// Hide progress bars
    pub quiet: bool,
}

impl Session {
    pub fn new(config: CliConfig, instance: Instance, quiet: bool) -> Result<Self> {
        config.validate()?;
        let client = AvalonClient::new(config.client_config(instance)?)?;

        debug!(instance = %instance, url = %client.url(), "Session ready");

        Ok(Self {
            client,
            config,
            instance,
            quiet,
        })
    }

    pub fn items_per_page(&self) -> u64 {
        self.config.paging.items_per_page
    }
}
