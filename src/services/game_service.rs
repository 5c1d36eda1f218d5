use log::{debug, info};

use crate::models::fact::Fact;
use crate::models::game::{Game, JudgementOutcome, NightAction, Phase};
use crate::models::player::PlayerId;
use crate::models::role::Role;
use crate::models::rule::Settings;
use crate::services::roster_service::{self, RosterError};
use crate::state::AppState;
use crate::utils::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum GameServiceError {
    #[error("no game in progress")]
    NoGame,
    #[error("action does not match the current phase")]
    WrongPhase,
    #[error("player count must be 5-12, got {0}")]
    PlayerCount(usize),
    #[error("shared PIN must be exactly 4 digits")]
    InvalidPin,
    #[error("mafia count {0} is not allowed for this roster")]
    MafiaCount(u32),
    #[error("invalid target selection")]
    InvalidTarget,
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("failed to persist the game: {0}")]
    Store(#[from] StoreError),
}

/// Role card shown privately during the role pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleCard {
    pub player: String,
    pub role: Role,
    /// Other mafia members, present only for mafia when `mafia_know` is on.
    pub teammates: Option<Vec<String>>,
}

/// What the night screen asks of the player whose turn it is.
#[derive(Clone, Debug, PartialEq)]
pub struct NightPrompt {
    pub index: usize,
    pub living: usize,
    pub player: String,
    pub role: Role,
    /// false for a plain citizen when the masking pick is switched off.
    pub needs_target: bool,
    pub targets: Vec<(PlayerId, String)>,
}

/// Private feedback after one night submission.
#[derive(Clone, Debug, PartialEq)]
pub enum NightFeedback {
    VoteRecorded { target: String },
    CheckResult { target: String, is_mafia: bool },
    SaveRecorded { target: String },
    DummyRecorded { target: String },
    Rested,
}

#[derive(Debug)]
pub struct NightStepResult {
    pub feedback: NightFeedback,
    pub fact: Option<Fact>,
    pub game: Game,
}

/// Create a fresh game from raw setup input. Normalization, the 5-12 player
/// window, the 4-digit PIN and the mafia-count table are all enforced here,
/// before any roles are dealt.
pub fn start_game(
    state: &AppState,
    raw_names: &[String],
    pin: &str,
    mafia_count: u32,
    settings: Settings,
) -> Result<Game, GameServiceError> {
    let (names, duplicates) = roster_service::normalize_names(raw_names);
    if !duplicates.is_empty() {
        info!("duplicate names adjusted: {}", duplicates.join(", "));
    }
    if names.len() < 5 || names.len() > 12 {
        return Err(GameServiceError::PlayerCount(names.len()));
    }
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(GameServiceError::InvalidPin);
    }
    if !roster_service::allowed_mafia_counts(names.len()).contains(&mafia_count) {
        return Err(GameServiceError::MafiaCount(mafia_count));
    }
    let players = roster_service::build_roster(&names, mafia_count, &settings)?;
    let game = Game::new(players, pin.to_string(), settings);
    state.store.save(&game)?;
    info!(
        "new game: {} players, {} mafia, roles dealt",
        game.players.len(),
        mafia_count
    );
    Ok(game)
}

/// The running game, if any. A corrupt store reads as no game at all and the
/// app falls back to setup.
pub fn current_game(state: &AppState) -> Option<Game> {
    state.store.load()
}

pub fn role_card(state: &AppState) -> Result<RoleCard, GameServiceError> {
    let game = state.store.load().ok_or(GameServiceError::NoGame)?;
    let player = game.reveal_target().ok_or(GameServiceError::WrongPhase)?;
    let teammates = if player.role == Role::Mafia && game.settings.mafia_know {
        Some(game.mafia_teammates(player.id))
    } else {
        None
    };
    Ok(RoleCard {
        player: player.name.clone(),
        role: player.role,
        teammates,
    })
}

pub fn confirm_role_seen(state: &AppState) -> Result<Game, GameServiceError> {
    let mut game = state.store.load().ok_or(GameServiceError::NoGame)?;
    if game.reveal_target().is_none() {
        return Err(GameServiceError::WrongPhase);
    }
    game.confirm_role_seen();
    state.store.save(&game)?;
    Ok(game)
}

pub fn night_prompt(state: &AppState) -> Result<NightPrompt, GameServiceError> {
    let game = state.store.load().ok_or(GameServiceError::NoGame)?;
    let (step_index, actor) = match (&game.phase, game.night_actor()) {
        (Phase::NightTurn { step_index, .. }, Some(actor)) => (*step_index, actor),
        _ => return Err(GameServiceError::WrongPhase),
    };
    let needs_target = actor.role != Role::Citizen || game.settings.mask_citizens;
    // everyone picks among the living; only the doctor may pick themselves
    let targets = game
        .alive_players()
        .into_iter()
        .filter(|p| actor.role == Role::Doctor || p.id != actor.id)
        .map(|p| (p.id, p.name.clone()))
        .collect();
    Ok(NightPrompt {
        index: step_index,
        living: game.alive_players().len(),
        player: actor.name.clone(),
        role: actor.role,
        needs_target,
        targets,
    })
}

/// Record the current player's pick and advance the cursor. The last living
/// player's submission resolves the night.
pub fn submit_night_action(
    state: &AppState,
    target: Option<PlayerId>,
) -> Result<NightStepResult, GameServiceError> {
    let mut game = state.store.load().ok_or(GameServiceError::NoGame)?;
    let actor = game
        .night_actor()
        .cloned()
        .ok_or(GameServiceError::WrongPhase)?;

    let feedback = if actor.role == Role::Citizen && !game.settings.mask_citizens {
        // no masking pick configured; the turn is just screen time
        NightFeedback::Rested
    } else {
        let target_id = target.ok_or(GameServiceError::InvalidTarget)?;
        let (target_name, target_is_mafia) = {
            let target = game
                .player(target_id)
                .filter(|p| p.alive)
                .ok_or(GameServiceError::InvalidTarget)?;
            (target.name.clone(), target.role.is_mafia())
        };
        if target_id == actor.id && actor.role != Role::Doctor {
            return Err(GameServiceError::InvalidTarget);
        }
        match actor.role {
            Role::Mafia => {
                game.record_night_action(NightAction::MafiaVote {
                    voter: actor.id,
                    target: target_id,
                });
                NightFeedback::VoteRecorded {
                    target: target_name,
                }
            }
            Role::Katanyi => {
                game.record_night_action(NightAction::KatanyiCheck {
                    voter: actor.id,
                    target: target_id,
                });
                NightFeedback::CheckResult {
                    target: target_name,
                    is_mafia: target_is_mafia,
                }
            }
            Role::Doctor => {
                game.record_night_action(NightAction::DoctorSave { target: target_id });
                NightFeedback::SaveRecorded {
                    target: target_name,
                }
            }
            Role::Citizen => {
                game.record_night_action(NightAction::CitizenDummy {
                    voter: actor.id,
                    target: target_id,
                });
                NightFeedback::DummyRecorded {
                    target: target_name,
                }
            }
        }
    };

    let fact = if game.settings.facts_enabled
        && (game.settings.facts_for_all || actor.role == Role::Citizen)
    {
        super::fact_service::pick_fact(&state.facts, &mut game, &mut rand::thread_rng())
    } else {
        None
    };

    game.advance_night_turn();
    state.store.save(&game)?;
    debug!("night action by {} recorded", actor.name);
    Ok(NightStepResult {
        feedback,
        fact,
        game,
    })
}

/// Abandon the current turn without submitting. The voter is simply absent
/// from the tallies; a valid outcome, not a fault.
pub fn pass_night_turn(state: &AppState) -> Result<Game, GameServiceError> {
    let mut game = state.store.load().ok_or(GameServiceError::NoGame)?;
    if game.night_actor().is_none() {
        return Err(GameServiceError::WrongPhase);
    }
    game.advance_night_turn();
    state.store.save(&game)?;
    Ok(game)
}

/// Leave the dawn summary for the day's discussion.
pub fn begin_day(state: &AppState) -> Result<Game, GameServiceError> {
    let mut game = state.store.load().ok_or(GameServiceError::NoGame)?;
    if game.phase != Phase::Dawn {
        return Err(GameServiceError::WrongPhase);
    }
    game.begin_day();
    state.store.save(&game)?;
    Ok(game)
}

/// The single privileged day action: the judged player, or no one.
pub fn judge(
    state: &AppState,
    target: Option<PlayerId>,
) -> Result<(JudgementOutcome, Game), GameServiceError> {
    let mut game = state.store.load().ok_or(GameServiceError::NoGame)?;
    if game.phase != Phase::DayAdmin {
        return Err(GameServiceError::WrongPhase);
    }
    if let Some(id) = target {
        if game.player(id).map(|p| p.alive) != Some(true) {
            return Err(GameServiceError::InvalidTarget);
        }
    }
    let outcome = game.apply_judgement(target);
    state.store.save(&game)?;
    info!("judgement applied, phase now {}", game.phase.name());
    Ok((outcome, game))
}

/// New game with the same names, PIN, settings and mafia count; only the
/// role assignment is fresh.
pub fn rematch(state: &AppState) -> Result<Game, GameServiceError> {
    let game = state.store.load().ok_or(GameServiceError::NoGame)?;
    if game.phase != Phase::End {
        return Err(GameServiceError::WrongPhase);
    }
    let names: Vec<String> = game.players.iter().map(|p| p.name.clone()).collect();
    let mafia_count = game
        .players
        .iter()
        .filter(|p| p.role == Role::Mafia)
        .count() as u32;
    let players = roster_service::build_roster(&names, mafia_count, &game.settings)?;
    let fresh = Game::new(players, game.pin.clone(), game.settings.clone());
    state.store.save(&fresh)?;
    info!("rematch started with the same roster");
    Ok(fresh)
}

/// Discard the record and return to setup.
pub fn reset(state: &AppState) -> Result<(), GameServiceError> {
    state.store.clear()?;
    info!("game record cleared");
    Ok(())
}

/// One-line status summary, None without a game.
pub fn status(state: &AppState) -> Option<String> {
    state.store.load().map(|game| game.status_line())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn start_game_rejects_bad_pins() {
        let state = AppState::in_memory();
        let roster = names(&["Anna", "Boris", "Cyril", "Dáša", "Ema"]);
        for pin in ["123", "12345", "12a4", ""] {
            let err = start_game(&state, &roster, pin, 1, Settings::default());
            assert!(matches!(err, Err(GameServiceError::InvalidPin)), "pin {:?}", pin);
        }
        assert!(start_game(&state, &roster, "1234", 1, Settings::default()).is_ok());
    }

    #[test]
    fn start_game_enforces_the_player_window() {
        let state = AppState::in_memory();
        let four = names(&["A", "B", "C", "D"]);
        assert!(matches!(
            start_game(&state, &four, "1234", 1, Settings::default()),
            Err(GameServiceError::PlayerCount(4))
        ));
        let thirteen: Vec<String> = (0..13).map(|i| format!("P{}", i)).collect();
        assert!(matches!(
            start_game(&state, &thirteen, "1234", 2, Settings::default()),
            Err(GameServiceError::PlayerCount(13))
        ));
    }

    #[test]
    fn start_game_enforces_the_mafia_table() {
        let state = AppState::in_memory();
        let five = names(&["Anna", "Boris", "Cyril", "Dáša", "Ema"]);
        assert!(matches!(
            start_game(&state, &five, "1234", 2, Settings::default()),
            Err(GameServiceError::MafiaCount(2))
        ));
        let ten: Vec<String> = (0..10).map(|i| format!("P{}", i)).collect();
        assert!(matches!(
            start_game(&state, &ten, "1234", 1, Settings::default()),
            Err(GameServiceError::MafiaCount(1))
        ));
        assert!(start_game(&state, &ten, "1234", 3, Settings::default()).is_ok());
    }

    #[test]
    fn normalization_applies_before_the_window_check() {
        let state = AppState::in_memory();
        // blanks drop out, duplicates stay as suffixed players
        let raw = names(&["Anna", "anna", "Boris", "", "Cyril", "Dáša"]);
        let game = start_game(&state, &raw, "1234", 1, Settings::default()).unwrap();
        assert_eq!(game.players.len(), 5);
        assert_eq!(game.players[1].name, "Anna (2)");
    }

    #[test]
    fn status_reports_the_phase() {
        let state = AppState::in_memory();
        assert_eq!(status(&state), None);
        let roster = names(&["Anna", "Boris", "Cyril", "Dáša", "Ema"]);
        start_game(&state, &roster, "1234", 1, Settings::default()).unwrap();
        assert_eq!(
            status(&state).unwrap(),
            "Živí: 5/5 • Deň 1 • Fáza: role_pass"
        );
    }
}
