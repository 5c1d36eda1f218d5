use palermo_osud::models::game::{GameResult, Phase};
use palermo_osud::models::player::{Player, PlayerId};
use palermo_osud::models::role::Role;
use palermo_osud::models::rule::{RevealPolicy, Settings};
use palermo_osud::services::game_service;
use palermo_osud::state::AppState;

fn roster(n: usize) -> Vec<String> {
    let base = ["Anna", "Boris", "Cyril", "Dáša", "Ema", "Fero", "Gusto", "Hana"];
    (0..n).map(|i| base[i].to_string()).collect()
}

fn game(state: &AppState) -> palermo_osud::models::game::Game {
    game_service::current_game(state).expect("game in progress")
}

fn deal_roles(state: &AppState) {
    loop {
        let g = game(state);
        if !matches!(g.phase, Phase::RolePass { .. }) {
            break;
        }
        game_service::role_card(state).unwrap();
        game_service::confirm_role_seen(state).unwrap();
    }
}

fn first_living(state: &AppState, role: Role) -> Player {
    game(state)
        .players
        .iter()
        .find(|p| p.alive && p.role == role)
        .cloned()
        .unwrap_or_else(|| panic!("no living {:?}", role))
}

fn first_living_victim(state: &AppState) -> Player {
    game(state)
        .players
        .iter()
        .find(|p| p.alive && p.role != Role::Mafia)
        .cloned()
        .expect("no living non-mafia")
}

/// Play out the current night. Mafia members vote `mafia_target` (or pass on
/// None); the doctor saves `doctor_save` when given; everyone else picks the
/// first name on their list.
fn play_night(state: &AppState, mafia_target: Option<PlayerId>, doctor_save: Option<PlayerId>) {
    loop {
        let g = game(state);
        if !matches!(g.phase, Phase::NightTurn { .. }) {
            break;
        }
        let prompt = game_service::night_prompt(state).unwrap();
        match prompt.role {
            Role::Mafia => match mafia_target {
                Some(target) => {
                    game_service::submit_night_action(state, Some(target)).unwrap();
                }
                None => {
                    game_service::pass_night_turn(state).unwrap();
                }
            },
            Role::Doctor => {
                let target = doctor_save.unwrap_or(prompt.targets[0].0);
                game_service::submit_night_action(state, Some(target)).unwrap();
            }
            _ => {
                let target = if prompt.needs_target {
                    Some(prompt.targets[0].0)
                } else {
                    None
                };
                game_service::submit_night_action(state, target).unwrap();
            }
        }
    }
}

#[test]
fn mafia_wins_by_attrition() {
    let state = AppState::in_memory();
    game_service::start_game(&state, &roster(5), "1234", 1, Settings::default()).unwrap();
    deal_roles(&state);

    let mut guard = 0;
    loop {
        guard += 1;
        assert!(guard < 50, "game did not terminate");
        let g = game(&state);
        match g.phase {
            Phase::NightTurn { .. } => {
                let victim = first_living_victim(&state);
                play_night(&state, Some(victim.id), None);
            }
            Phase::Dawn => {
                game_service::begin_day(&state).unwrap();
            }
            Phase::DayAdmin => {
                game_service::judge(&state, None).unwrap();
            }
            Phase::End => break,
            Phase::RolePass { .. } => unreachable!("roles already dealt"),
        }
    }

    let g = game(&state);
    assert_eq!(g.win_check(), GameResult::MafiaWin);
    // one kill per night: 5 -> 4 -> 3 -> 2, parity ends it on night three
    assert_eq!(g.alive_players().len(), 2);
    assert_eq!(g.day, 3);
    assert!(first_living(&state, Role::Mafia).alive);
}

#[test]
fn citizens_win_when_the_day_judges_the_mafia() {
    let state = AppState::in_memory();
    game_service::start_game(&state, &roster(5), "1234", 1, Settings::default()).unwrap();
    deal_roles(&state);

    // the lone mafia abstains: strict quorum fails, nobody dies
    play_night(&state, None, None);
    let g = game(&state);
    assert_eq!(g.phase, Phase::Dawn);
    assert_eq!(g.last.night_dead, None);
    assert_eq!(g.alive_players().len(), 5);

    game_service::begin_day(&state).unwrap();
    let mafia = first_living(&state, Role::Mafia);
    let (outcome, g) = game_service::judge(&state, Some(mafia.id)).unwrap();
    assert_eq!(outcome.executed, Some((mafia.id, mafia.name.clone())));
    // default reveal policy discloses the side only
    assert_eq!(outcome.revealed, Some("MAFIA".to_string()));
    assert_eq!(g.phase, Phase::End);
    assert_eq!(g.win_check(), GameResult::CitizenWin);
}

#[test]
fn doctor_save_reads_as_a_quiet_night() {
    let state = AppState::in_memory();
    let settings = Settings {
        include_doctor: true,
        ..Settings::default()
    };
    game_service::start_game(&state, &roster(6), "1234", 1, settings).unwrap();
    deal_roles(&state);

    let victim = first_living(&state, Role::Citizen);
    play_night(&state, Some(victim.id), Some(victim.id));

    let g = game(&state);
    assert_eq!(g.phase, Phase::Dawn);
    // indistinguishable from "no kill": no victim identity anywhere
    assert_eq!(g.last.night_dead, None);
    assert!(g.players.iter().all(|p| p.alive));
}

#[test]
fn osud_marks_the_first_death_across_night_and_day() {
    let state = AppState::in_memory();
    let settings = Settings {
        first_dead_osud: true,
        ..Settings::default()
    };
    game_service::start_game(&state, &roster(6), "1234", 1, settings).unwrap();
    deal_roles(&state);

    let night_victim = first_living_victim(&state);
    play_night(&state, Some(night_victim.id), None);
    let g = game(&state);
    assert_eq!(g.last.night_dead, Some(night_victim.id));
    assert_eq!(g.osud.player_id, Some(night_victim.id));

    game_service::begin_day(&state).unwrap();
    let day_victim = first_living_victim(&state);
    game_service::judge(&state, Some(day_victim.id)).unwrap();

    // the marker stays on the first death
    let g = game(&state);
    assert_eq!(g.last.day_dead, Some(day_victim.id));
    assert_eq!(g.osud.player_id, Some(night_victim.id));
}

#[test]
fn night_selections_are_validated_at_the_boundary() {
    let state = AppState::in_memory();
    game_service::start_game(&state, &roster(5), "1234", 1, Settings::default()).unwrap();
    deal_roles(&state);

    let prompt = game_service::night_prompt(&state).unwrap();
    // self-targeting is offered to nobody but the doctor
    assert!(prompt.targets.iter().all(|(_, name)| *name != prompt.player));
    // an id that does not exist is rejected without advancing the turn
    let err = game_service::submit_night_action(&state, Some(99));
    assert!(matches!(err, Err(game_service::GameServiceError::InvalidTarget)));
    assert_eq!(game_service::night_prompt(&state).unwrap().index, prompt.index);
}

#[test]
fn judging_a_dead_player_is_rejected() {
    let state = AppState::in_memory();
    game_service::start_game(&state, &roster(5), "1234", 1, Settings::default()).unwrap();
    deal_roles(&state);

    let victim = first_living_victim(&state);
    play_night(&state, Some(victim.id), None);
    game_service::begin_day(&state).unwrap();

    let err = game_service::judge(&state, Some(victim.id));
    assert!(matches!(err, Err(game_service::GameServiceError::InvalidTarget)));
    // the phase is untouched by the rejected selection
    assert_eq!(game(&state).phase, Phase::DayAdmin);
}

#[test]
fn rematch_keeps_the_table_and_redeals_roles() {
    let state = AppState::in_memory();
    let settings = Settings {
        reveal_after_judgement: RevealPolicy::Full,
        ..Settings::default()
    };
    game_service::start_game(&state, &roster(5), "9999", 1, settings.clone()).unwrap();
    deal_roles(&state);

    // end the game quickly: quiet night, then judge the mafia away
    play_night(&state, None, None);
    game_service::begin_day(&state).unwrap();
    let mafia = first_living(&state, Role::Mafia);
    game_service::judge(&state, Some(mafia.id)).unwrap();
    let finished = game(&state);
    assert_eq!(finished.phase, Phase::End);

    let fresh = game_service::rematch(&state).unwrap();
    assert_eq!(fresh.phase, Phase::RolePass { step_index: 0 });
    assert_eq!(fresh.day, 1);
    assert_eq!(fresh.pin, "9999");
    assert_eq!(fresh.settings, settings);
    let names = |g: &palermo_osud::models::game::Game| {
        g.players.iter().map(|p| p.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&fresh), names(&finished));
    assert!(fresh.players.iter().all(|p| p.alive));
    assert_eq!(
        fresh.players.iter().filter(|p| p.role == Role::Mafia).count(),
        1
    );

    // reset drops back to setup
    game_service::reset(&state).unwrap();
    assert!(game_service::current_game(&state).is_none());
}

#[test]
fn wrong_phase_operations_are_rejected() {
    let state = AppState::in_memory();
    assert!(matches!(
        game_service::begin_day(&state),
        Err(game_service::GameServiceError::NoGame)
    ));

    game_service::start_game(&state, &roster(5), "1234", 1, Settings::default()).unwrap();
    // role pass is running: night and day operations are out of order
    assert!(matches!(
        game_service::night_prompt(&state),
        Err(game_service::GameServiceError::WrongPhase)
    ));
    assert!(matches!(
        game_service::judge(&state, None),
        Err(game_service::GameServiceError::WrongPhase)
    ));
    assert!(matches!(
        game_service::rematch(&state),
        Err(game_service::GameServiceError::WrongPhase)
    ));
}

#[test]
fn masked_citizens_record_dummy_picks_and_unmasked_do_not() {
    for mask in [true, false] {
        let state = AppState::in_memory();
        let settings = Settings {
            mask_citizens: mask,
            include_katanyi: false,
            facts_enabled: false,
            ..Settings::default()
        };
        game_service::start_game(&state, &roster(5), "1234", 1, settings).unwrap();
        deal_roles(&state);

        loop {
            let g = game(&state);
            if !matches!(g.phase, Phase::NightTurn { .. }) {
                break;
            }
            let prompt = game_service::night_prompt(&state).unwrap();
            match prompt.role {
                Role::Citizen => {
                    assert_eq!(prompt.needs_target, mask);
                    let target = if mask { Some(prompt.targets[0].0) } else { None };
                    game_service::submit_night_action(&state, target).unwrap();
                }
                _ => {
                    game_service::pass_night_turn(&state).unwrap();
                }
            }
        }
        // the dummy map only fills when masking is on; either way the night
        // resolves to no kill because the mafia abstained
        let g = game(&state);
        assert_eq!(g.phase, Phase::Dawn);
        assert_eq!(g.last.night_dead, None);
    }
}
