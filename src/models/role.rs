use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mafia,
    Katanyi,
    Doctor,
    Citizen,
}

impl Role {
    pub fn is_mafia(&self) -> bool {
        matches!(self, Role::Mafia)
    }

    /// Side label used by the katanyi check and the "side" reveal policy.
    pub fn side_label(&self) -> &'static str {
        if self.is_mafia() {
            "MAFIA"
        } else {
            "OBČAN"
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mafia => write!(f, "Mafia"),
            Role::Katanyi => write!(f, "Komisár Katányi"),
            Role::Doctor => write!(f, "Lekár"),
            Role::Citizen => write!(f, "Občan"),
        }
    }
}
