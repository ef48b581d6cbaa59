use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{Clock, SourceHost};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub source_host: Arc<dyn SourceHost>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    pub fn new(config: AppConfig, source_host: Arc<dyn SourceHost>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            source_host,
            clock,
        }
    }
}
