//! Arguments shared by the resolving subcommands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use geotag_gazetteer::{Gazetteer, GazetteerError, InMemoryGazetteer};
use geotag_resolution::config::{self, ConfigError};
use geotag_resolution_models::{ResolverConfig, ResolverKind};

#[derive(Debug, Args)]
pub struct GazetteerArgs {
    /// `GeoNames` tab-separated dump (e.g. `allCountries.txt`)
    #[arg(long)]
    pub dump: PathBuf,
    /// Directory holding `country.csv`, `admin1.csv`, `admin2.csv` and
    /// `continents.csv`
    #[arg(long)]
    pub tables: PathBuf,
}

impl GazetteerArgs {
    /// Loads the gazetteer once, to be shared by every resolver.
    ///
    /// # Errors
    ///
    /// Returns [`GazetteerError`] if the dump or a table cannot be read.
    pub fn load(&self) -> Result<Arc<dyn Gazetteer>, GazetteerError> {
        let start = Instant::now();
        let gazetteer = InMemoryGazetteer::load(&self.dump, &self.tables)?;
        log::info!(
            "Loaded {} gazetteer records in {:.1}s",
            gazetteer.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(Arc::new(gazetteer))
    }
}

#[derive(Debug, Default, Args)]
pub struct ResolverArgs {
    /// Resolver configuration TOML. Embedded defaults are used when absent.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Resolver to run (see `geotag resolvers`)
    #[arg(long, value_parser = parse_resolver)]
    pub resolver: Option<ResolverKind>,
    /// Keep only the k most populated candidates of each phrase
    #[arg(long)]
    pub candidate_limit: Option<usize>,
    /// Cap on context-bound refinement passes
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Minimum context-bound score that overrides set cover when fusing
    #[arg(long)]
    pub threshold: Option<f64>,
}

fn parse_resolver(name: &str) -> Result<ResolverKind, String> {
    name.parse()
        .map_err(|_| format!("unknown resolver {name:?} (see `geotag resolvers`)"))
}

impl ResolverArgs {
    /// The configuration file (or embedded defaults) with flags applied on
    /// top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration file cannot be loaded.
    pub fn config(&self) -> Result<ResolverConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load(path)?,
            None => config::default_config(),
        };

        if let Some(resolver) = self.resolver {
            config.resolver = resolver;
        }
        if let Some(limit) = self.candidate_limit {
            config.candidate_limit = Some(limit);
        }
        if let Some(max_iterations) = self.max_iterations {
            config.context_bound.max_iterations = max_iterations;
        }
        if let Some(threshold) = self.threshold {
            config.fusion.threshold = threshold;
        }

        Ok(config)
    }
}
