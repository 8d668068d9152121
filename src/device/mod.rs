pub mod constants;
pub mod manager;
pub mod status;
pub mod types;
