pub mod batch;
pub mod config;
pub mod failure;
pub mod marketplaces;
