pub mod api_client;
pub mod candidate_service;
pub mod export_service;
pub mod status_history_service;
