pub mod confirm;
pub mod history;
pub mod match_state;
pub mod serialization;
