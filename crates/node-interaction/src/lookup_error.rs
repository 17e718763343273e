use mtk_common::types::ArtifactName;

/// The error of an artifact registry lookup.
///
/// Callers tell the failures apart by their message: a lookup that found no canonical instance
/// can be recovered by deploying one, while failures without a message can't be classified.
#[derive(Debug)]
pub enum LookupError {
    Message(String),
    Opaque(anyhow::Error),
}

impl LookupError {
    pub fn no_deployed_instance(name: &ArtifactName) -> Self {
        Self::Message(Self::no_deployed_instance_message(name))
    }

    pub fn no_deployed_instance_message(name: &ArtifactName) -> String {
        format!("Trying to get deployed instance of {name}, but none was set.")
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Opaque(_) => None,
        }
    }

    pub fn is_no_deployed_instance(&self, name: &ArtifactName) -> bool {
        self.message() == Some(Self::no_deployed_instance_message(name).as_str())
    }
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Opaque(error) => write!(f, "{error:#}"),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Message(_) => None,
            Self::Opaque(error) => Some(error.as_ref()),
        }
    }
}

impl From<anyhow::Error> for LookupError {
    fn from(value: anyhow::Error) -> Self {
        Self::Opaque(value)
    }
}
