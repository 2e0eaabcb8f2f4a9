//! Port traits for the collaborators around the core.

pub mod config_port;
pub mod data_port;
