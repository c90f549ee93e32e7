use crate::models::{GroundedRequest, ToolKind, ValidationError};

pub const MISSING_USER_QUERY: &str = "MISSING_USER_QUERY";
pub const MISSING_REQUIRED_TOOLS: &str = "MISSING_REQUIRED_TOOLS";
pub const INVALID_TOOL: &str = "INVALID_TOOL";

/// Collect every structural defect of a request. All checks run so the
/// caller can fix everything in one round trip.
pub fn validate_request(request: &GroundedRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if request.user_query.trim().is_empty() {
        errors.push(ValidationError::error(
            MISSING_USER_QUERY,
            "User query is required for grounded processing",
            "userQuery",
        ));
    }

    if request.required_tools.is_empty() {
        errors.push(ValidationError::error(
            MISSING_REQUIRED_TOOLS,
            "At least one tool must be specified for grounded processing",
            "requiredTools",
        ));
    }

    for tool in &request.required_tools {
        if ToolKind::from_name(tool).is_none() {
            errors.push(ValidationError::error(
                INVALID_TOOL,
                format!(
                    "Tool '{tool}' is not available. Available tools: {}",
                    available_tools()
                ),
                "requiredTools",
            ));
        }
    }

    errors
}

fn available_tools() -> String {
    ToolKind::ALL
        .iter()
        .map(|tool| tool.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
