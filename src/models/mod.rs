pub mod fact;
pub mod game;
pub mod player;
pub mod role;
pub mod rule;

pub use fact::Fact;
pub use game::{Game, GameResult, JudgementOutcome, KatanyiCheck, LastOutcome, NightAction, NightRecord, Osud, Phase};
pub use player::{Player, PlayerId};
pub use role::Role;
pub use rule::{RevealPolicy, Settings, UnlockMode};
