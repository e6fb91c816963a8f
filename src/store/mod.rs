pub mod candidate_store;

pub use candidate_store::{CandidateStore, PaginationState, StoreState};
