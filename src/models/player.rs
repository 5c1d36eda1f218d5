use serde::{Deserialize, Serialize};

use super::role::Role;

pub type PlayerId = u32;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
    pub role: Role,
}

impl Player {
    pub fn new(id: PlayerId, name: String, role: Role) -> Self {
        Self {
            id,
            name,
            alive: true,
            role,
        }
    }
}
