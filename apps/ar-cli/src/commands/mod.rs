pub mod drift;
pub mod exec;
