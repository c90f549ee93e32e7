use std::fmt;

/// Context keys shared by the pipeline tasks
pub mod session_keys {
    pub const REQUEST: &str = "request";
    pub const VALIDATION_ERRORS: &str = "validation_errors";
    pub const TOOLS: &str = "tools";
    pub const FACTS: &str = "facts";
    pub const CALCULATIONS: &str = "calculations";
    pub const MISSING_INFO: &str = "missing_info";
    pub const FOLLOW_UP_QUESTION: &str = "follow_up_question";
    pub const CONFIDENCE: &str = "confidence";
    pub const ANSWER: &str = "answer";
}

/// States of a single pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Retrieving,
    Calculating,
    CheckingMissing,
    Scoring,
    Synthesizing,
    Done,
    DoneInvalid,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Validating => "VALIDATING",
            PipelineStage::Retrieving => "RETRIEVING",
            PipelineStage::Calculating => "CALCULATING",
            PipelineStage::CheckingMissing => "CHECKING-MISSING",
            PipelineStage::Scoring => "SCORING",
            PipelineStage::Synthesizing => "SYNTHESIZING",
            PipelineStage::Done => "DONE",
            PipelineStage::DoneInvalid => "DONE-INVALID",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_name_the_states() {
        assert_eq!(PipelineStage::CheckingMissing.to_string(), "CHECKING-MISSING");
        assert_eq!(PipelineStage::DoneInvalid.to_string(), "DONE-INVALID");
        assert_eq!(PipelineStage::Validating.as_str(), "VALIDATING");
    }
}
