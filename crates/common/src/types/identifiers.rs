use serde::{Deserialize, Serialize};

use crate::macros::define_wrapper_type;

define_wrapper_type!(
    /// The logical name of a compiled contract artifact, e.g. `ERC1155MMock`.
    ///
    /// This is the name the artifact registry resolves into an ABI and bytecode, and the first half
    /// of every deployment cache key.
    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ArtifactName(String) impl Display;
);

impl From<&str> for ArtifactName {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<&ArtifactName> for ArtifactName {
    fn from(value: &ArtifactName) -> Self {
        value.clone()
    }
}
