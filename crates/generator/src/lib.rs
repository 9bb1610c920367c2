//! A container-orchestration-aware file generator: watches the Docker
//! Engine (including Swarm services) and re-renders declarative artifacts
//! whenever the observed topology changes.

pub mod config;
pub mod context;
pub mod docker;
pub mod error;
pub mod generator;
pub mod render;
pub mod state;
