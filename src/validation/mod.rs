pub mod rules;
pub mod schemas;

pub use schemas::{
    CandidateFilter, CandidateRegistration, CandidateUpdateForm, StatusCheck,
    StatusHistoryFilter, StatusUpdateForm,
};
