use serde::{Deserialize, Serialize};

/// One record of the optional flavor-text document.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Fact {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub spoiler: bool,
}
