pub mod config_store;
pub mod defaults;
pub mod generation;
pub mod runtime_engine;
