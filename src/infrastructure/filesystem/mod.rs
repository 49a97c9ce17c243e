pub mod config_store;
