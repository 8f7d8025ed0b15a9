use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::application::aggregator::Aggregator;
use crate::config::Config;
use crate::generation::generator::ApplicationGenerator;
use crate::store::ApplicationStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every client handle is built once in `main` and cloned in here.
#[derive(Clone)]
pub struct AppState {
    pub s3: S3Client,
    pub config: Config,
    /// Generation backend. Default: `LlmGenerator`.
    pub generator: Arc<dyn ApplicationGenerator>,
    pub aggregator: Aggregator,
    pub store: Arc<dyn ApplicationStore>,
}

impl AppState {
    pub fn new(
        s3: S3Client,
        config: Config,
        generator: Arc<dyn ApplicationGenerator>,
        store: Arc<dyn ApplicationStore>,
    ) -> Self {
        let aggregator = Aggregator::new(generator.clone(), config.generation_timeout);
        Self {
            s3,
            config,
            generator,
            aggregator,
            store,
        }
    }
}
