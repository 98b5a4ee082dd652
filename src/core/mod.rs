pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod entitlement;
pub mod limits;
pub mod paths;
pub mod plan;
pub mod selection;
