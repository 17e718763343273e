use std::sync::Arc;

/// An assertion that didn't hold. Fatal to the test case that made it.
///
/// Assertions return it inside an [`anyhow::Error`], callers that need to tell assertion failures
/// apart from other errors can downcast to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AssertionError: {}", self.message)
    }
}

impl std::error::Error for AssertionFailure {}

/// A deployment failure shared by every caller waiting on the same deployment.
#[derive(Clone, Debug)]
pub struct DeploymentError(Arc<anyhow::Error>);

impl std::fmt::Display for DeploymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl std::error::Error for DeploymentError {}

impl From<anyhow::Error> for DeploymentError {
    fn from(value: anyhow::Error) -> Self {
        Self(Arc::new(value))
    }
}
