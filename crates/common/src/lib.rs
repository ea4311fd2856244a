pub mod error;
pub mod rate;
pub mod types;
