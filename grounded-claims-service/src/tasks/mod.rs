pub mod answer;
pub mod calculation;
pub mod retrieval;
pub mod types;
pub mod validation;

pub use answer::{CheckMissingInfoTask, ScoreConfidenceTask, SynthesizeAnswerTask};
pub use calculation::RunCalculationsTask;
pub use retrieval::RetrieveFactsTask;
pub use types::{PipelineStage, session_keys};
pub use validation::{RejectRequestTask, ValidateRequestTask, has_validation_errors};
