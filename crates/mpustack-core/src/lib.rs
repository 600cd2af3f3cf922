//! Core types, configuration, and tracing setup for mpustack.
//!
//! This crate provides the building blocks shared by the options model and
//! the upload engine: the engine configuration ([`MpuConfig`]), the core
//! error type, validated container/key names, and subscriber installation.

mod config;
mod error;
mod telemetry;
mod types;

pub use config::{
    DEFAULT_HEADER_TAG, DEFAULT_PART_COUNT_CEILING, DEFAULT_PART_SIZE, MAX_PART_COUNT,
    MAX_PART_SIZE, MIN_PART_SIZE, MpuConfig,
};
pub use error::{MpuStackError, MpuStackResult};
pub use telemetry::init_tracing;
pub use types::{ContainerName, ObjectKey};
