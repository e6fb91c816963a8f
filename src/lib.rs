pub mod config;
pub mod dto;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;
pub mod validation;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::services::{
    api_client::ApiClient, candidate_service::CandidateService,
    status_history_service::StatusHistoryService,
};
use crate::store::CandidateStore;

/// Application root. Owns the single store instance; everything else gets
/// it by reference.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub candidate_service: CandidateService,
    pub status_history_service: StatusHistoryService,
    pub store: CandidateStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config.api)?;
        let candidate_service = CandidateService::new(api.clone());
        let status_history_service = StatusHistoryService::new(api.clone());
        let store = CandidateStore::new(
            candidate_service.clone(),
            config.pagination.default_page_size,
        );

        Ok(Self {
            config,
            api,
            candidate_service,
            status_history_service,
            store,
        })
    }

    pub fn require_file_upload(&self) -> Result<()> {
        if self.config.features.file_upload {
            Ok(())
        } else {
            Err(Error::FeatureDisabled("file upload"))
        }
    }

    pub fn require_advanced_filters(&self) -> Result<()> {
        if self.config.features.advanced_filters {
            Ok(())
        } else {
            Err(Error::FeatureDisabled("advanced filters"))
        }
    }

    pub fn require_export(&self) -> Result<()> {
        if self.config.features.export_features {
            Ok(())
        } else {
            Err(Error::FeatureDisabled("export"))
        }
    }
}
