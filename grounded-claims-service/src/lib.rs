pub mod confidence;
pub mod config;
pub mod error;
pub mod facts;
pub mod fnol;
pub mod missing_info;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod synthesis;
pub mod tables;
pub mod tasks;
pub mod tools;
pub mod validation;

pub use config::{LogFormat, ServiceConfig};
pub use error::{ApiError, ConfigError, PipelineError};
pub use facts::{ContextFactStore, FactStore};
pub use models::*;
pub use pipeline::{GroundedPipeline, build_grounded_workflow};
pub use service::{AppState, build_router, create_app};
pub use tables::ReasoningTables;
