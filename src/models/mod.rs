pub mod candidate;
pub mod status_history;
pub mod upload;
