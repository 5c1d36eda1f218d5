use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::player::{Player, PlayerId};
use super::role::Role;
use super::rule::{RevealPolicy, Settings};

/// Actions collected during one night; thrown away once the night resolves.
/// The citizen dummy picks exist only to equalize screen time and never
/// influence the outcome.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NightRecord {
    pub mafia_votes: HashMap<PlayerId, PlayerId>,
    pub katanyi_check: Option<KatanyiCheck>,
    pub doctor_save: Option<PlayerId>,
    pub citizen_dummy: HashMap<PlayerId, PlayerId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct KatanyiCheck {
    pub voter: PlayerId,
    pub target: PlayerId,
    pub is_mafia: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum NightAction {
    MafiaVote { voter: PlayerId, target: PlayerId },
    KatanyiCheck { voter: PlayerId, target: PlayerId },
    DoctorSave { target: PlayerId },
    CitizenDummy { voter: PlayerId, target: PlayerId },
}

/// Last-outcome cache for the dawn and day screens.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LastOutcome {
    pub night_dead: Option<PlayerId>,
    pub day_dead: Option<PlayerId>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Osud {
    pub enabled: bool,
    pub player_id: Option<PlayerId>,
}

/// Phase of the running game. Each variant carries only the fields that are
/// meaningful to it; "setup" is simply the absence of a stored game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RolePass { step_index: usize },
    NightTurn { step_index: usize, night: NightRecord },
    Dawn,
    DayAdmin,
    End,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::RolePass { .. } => "role_pass",
            Phase::NightTurn { .. } => "night_turn",
            Phase::Dawn => "dawn",
            Phase::DayAdmin => "day_admin",
            Phase::End => "end",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GameResult {
    InProgress,
    MafiaWin,
    CitizenWin,
}

/// Display-only outcome of a day judgement. `revealed` is filled according
/// to the reveal policy and carries no game-logic meaning.
#[derive(Clone, Debug, PartialEq)]
pub struct JudgementOutcome {
    pub executed: Option<(PlayerId, String)>,
    pub revealed: Option<String>,
}

/// The single authoritative game record. One exists per running game; it is
/// mutated in place by every operation and discarded when a new game starts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Game {
    pub day: u32,
    pub players: Vec<Player>,
    pub pin: String,
    pub settings: Settings,
    pub phase: Phase,
    pub last: LastOutcome,
    pub osud: Osud,
    #[serde(default)]
    pub facts_used: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl Game {
    pub fn new(players: Vec<Player>, pin: String, settings: Settings) -> Self {
        Game {
            day: 1,
            players,
            pin,
            settings,
            phase: Phase::RolePass { step_index: 0 },
            last: LastOutcome::default(),
            osud: Osud::default(),
            facts_used: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Living players in stored list order. Deaths only happen between
    /// nights, so within one cycle this view is a stable snapshot.
    pub fn alive_players(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.alive).collect()
    }

    pub fn mafia_teammates(&self, of: PlayerId) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| p.role == Role::Mafia && p.id != of)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Winner evaluation over the current roster. Parity already ends the
    /// game in mafia's favour; a dead tie is not played out.
    pub fn win_check(&self) -> GameResult {
        let alive = self.alive_players();
        let mafia = alive.iter().filter(|p| p.role == Role::Mafia).count();
        let others = alive.len() - mafia;
        if mafia == 0 {
            return GameResult::CitizenWin;
        }
        if mafia >= others {
            return GameResult::MafiaWin;
        }
        GameResult::InProgress
    }

    /// Single death path shared by night and day. The first death claims the
    /// Osud marker when the rule is on; the marker never moves afterwards.
    pub fn register_death(&mut self, id: PlayerId) {
        let first_dead_osud = self.settings.first_dead_osud;
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            if !player.alive {
                return;
            }
            player.alive = false;
            if first_dead_osud && !self.osud.enabled {
                self.osud = Osud {
                    enabled: true,
                    player_id: Some(id),
                };
            }
        }
    }

    // ---- role_pass ----

    /// The player whose role card is up next, if the pass is still running.
    pub fn reveal_target(&self) -> Option<&Player> {
        match &self.phase {
            Phase::RolePass { step_index } => self.players.get(*step_index),
            _ => None,
        }
    }

    /// Advance the role pass. Showing the last card starts the first night
    /// with a fresh record.
    pub fn confirm_role_seen(&mut self) {
        let count = self.players.len();
        if let Phase::RolePass { step_index } = &mut self.phase {
            *step_index += 1;
            if *step_index >= count {
                self.phase = Phase::NightTurn {
                    step_index: 0,
                    night: NightRecord::default(),
                };
            }
        }
    }

    // ---- night_turn ----

    /// The living player whose turn it is, per the night cursor.
    pub fn night_actor(&self) -> Option<&Player> {
        match &self.phase {
            Phase::NightTurn { step_index, .. } => {
                self.players.iter().filter(|p| p.alive).nth(*step_index)
            }
            _ => None,
        }
    }

    /// Write one submission into the night record. The katanyi result is
    /// fixed at submission time so only that player ever sees it.
    pub fn record_night_action(&mut self, action: NightAction) {
        let checked_is_mafia = match &action {
            NightAction::KatanyiCheck { target, .. } => self
                .player(*target)
                .map(|p| p.role.is_mafia())
                .unwrap_or(false),
            _ => false,
        };
        if let Phase::NightTurn { night, .. } = &mut self.phase {
            match action {
                NightAction::MafiaVote { voter, target } => {
                    night.mafia_votes.insert(voter, target);
                }
                NightAction::KatanyiCheck { voter, target } => {
                    night.katanyi_check = Some(KatanyiCheck {
                        voter,
                        target,
                        is_mafia: checked_is_mafia,
                    });
                }
                NightAction::DoctorSave { target } => {
                    night.doctor_save = Some(target);
                }
                NightAction::CitizenDummy { voter, target } => {
                    night.citizen_dummy.insert(voter, target);
                }
            }
        }
    }

    /// Advance the night cursor. Completing the last living player's turn
    /// resolves the night; the next screen is dawn, or the end when the
    /// outcome already decides the game.
    pub fn advance_night_turn(&mut self) {
        let living = self.players.iter().filter(|p| p.alive).count();
        if let Phase::NightTurn { step_index, .. } = &mut self.phase {
            *step_index += 1;
            if *step_index >= living {
                self.finish_night();
            }
        }
    }

    fn finish_night(&mut self) {
        let night = match std::mem::replace(&mut self.phase, Phase::Dawn) {
            Phase::NightTurn { night, .. } => night,
            other => {
                self.phase = other;
                return;
            }
        };
        let kill = self.resolve_night(&night);
        self.last.night_dead = kill;
        if let Some(id) = kill {
            self.register_death(id);
        }
        if self.win_check() != GameResult::InProgress {
            self.phase = Phase::End;
        }
    }

    /// Night resolution. At most one death: the mafia decision survives only
    /// if every living mafia member voted (strict quorum) and the configured
    /// rule picks a single target; a matching doctor save then cancels it,
    /// indistinguishably from "no kill". Submissions pointing at non-living
    /// players are ignored rather than counted.
    fn resolve_night(&self, night: &NightRecord) -> Option<PlayerId> {
        let living: HashSet<PlayerId> =
            self.players.iter().filter(|p| p.alive).map(|p| p.id).collect();
        let mafia_ids: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|p| p.alive && p.role == Role::Mafia)
            .map(|p| p.id)
            .collect();
        let votes: Vec<PlayerId> = mafia_ids
            .iter()
            .filter_map(|id| night.mafia_votes.get(id).copied())
            .filter(|target| living.contains(target))
            .collect();

        let mut kill = None;
        if !mafia_ids.is_empty() && votes.len() == mafia_ids.len() {
            if self.settings.mafia_strict_unanimity {
                if votes.iter().all(|t| *t == votes[0]) {
                    kill = Some(votes[0]);
                }
            } else {
                let mut tally: HashMap<PlayerId, usize> = HashMap::new();
                for target in &votes {
                    *tally.entry(*target).or_insert(0) += 1;
                }
                let max = tally.values().copied().max().unwrap_or(0);
                let mut at_max = tally.iter().filter(|(_, c)| **c == max).map(|(t, _)| *t);
                let top = at_max.next();
                if at_max.next().is_none() {
                    kill = top;
                }
            }
        }

        if kill.is_some() && night.doctor_save == kill {
            kill = None;
        }
        kill
    }

    // ---- dawn / day_admin ----

    pub fn begin_day(&mut self) {
        if self.phase == Phase::Dawn {
            self.phase = Phase::DayAdmin;
        }
    }

    /// Apply the day's judgement: the chosen player (or no one) picked by
    /// out-of-band discussion. Reveal policy only shapes the returned display
    /// data. Ends the game or starts the next night with the day advanced.
    pub fn apply_judgement(&mut self, target: Option<PlayerId>) -> JudgementOutcome {
        self.last.day_dead = target;
        let mut outcome = JudgementOutcome {
            executed: None,
            revealed: None,
        };
        if let Some(id) = target {
            self.register_death(id);
            if let Some(victim) = self.player(id) {
                outcome.executed = Some((id, victim.name.clone()));
                outcome.revealed = match self.settings.reveal_after_judgement {
                    RevealPolicy::None => None,
                    RevealPolicy::Side => Some(victim.role.side_label().to_string()),
                    RevealPolicy::Full => Some(victim.role.to_string()),
                };
            }
        }
        if self.win_check() != GameResult::InProgress {
            self.phase = Phase::End;
        } else {
            self.day += 1;
            self.phase = Phase::NightTurn {
                step_index: 0,
                night: NightRecord::default(),
            };
        }
        outcome
    }

    /// One-line summary for the status toast.
    pub fn status_line(&self) -> String {
        format!(
            "Živí: {}/{} • Deň {} • Fáza: {}",
            self.alive_players().len(),
            self.players.len(),
            self.day,
            self.phase.name()
        )
    }
}
