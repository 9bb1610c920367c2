//! Daemon Client (§2.2, §6) — a thin `bollard` wrapper exposing only the
//! capability set the Context Builder and Notifier consume.

pub mod client;
pub mod container;
pub mod event;
pub mod network;
pub mod swarm;

pub use client::{DockerClient, DockerError};
