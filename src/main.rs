use anyhow::Context;
use dotenvy::dotenv;
use env_logger::Builder;
use log::{info, LevelFilter};
use std::io::{self, Write};
use std::thread;

use palermo_osud::models::game::{Game, GameResult, Phase};
use palermo_osud::models::player::PlayerId;
use palermo_osud::models::rule::Settings;
use palermo_osud::services::{fact_service, game_service, roster_service};
use palermo_osud::state::AppState;
use palermo_osud::utils::config::CONFIG;
use palermo_osud::utils::gate::TurnGate;
use palermo_osud::utils::storage::FileStore;

fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_default_env()
        .init();
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Shared-secret gate in front of every private screen. Mismatches are
/// retriable and never touch game state.
fn unlock(gate: &TurnGate, who: &str) -> anyhow::Result<()> {
    loop {
        let entered = read_line(&format!("Telefón pre: {} • zadaj PIN: ", who))?;
        if gate.verify(&entered) {
            return Ok(());
        }
        println!("Nesprávny PIN");
    }
}

/// The enforced dwell: the screen stays up for the configured minimum before
/// "hide and pass" becomes available, so dismissal speed leaks nothing.
fn hide_and_pass(gate: &TurnGate, label: &str) -> anyhow::Result<()> {
    thread::sleep(gate.min_screen());
    read_line(&format!("{} [Enter]", label))?;
    // clear the private content off the terminal
    print!("\x1B[2J\x1B[1;1H");
    io::stdout().flush()?;
    Ok(())
}

fn setup_screen(state: &AppState) -> anyhow::Result<bool> {
    println!("== Mestečko Palermo – Osud ==");
    if let Some(url) = &state.public_url {
        println!("Web verzia: {}", url);
    }
    println!("Zadaj mená hráčov (5-12, každé na nový riadok, prázdny riadok ukončí):");
    let mut raw_names = Vec::new();
    loop {
        let line = read_line("> ")?;
        if line.is_empty() {
            break;
        }
        raw_names.push(line);
    }
    if raw_names.is_empty() {
        return Ok(false);
    }
    let (names, duplicates) = roster_service::normalize_names(&raw_names);
    if !duplicates.is_empty() {
        println!("Duplicitné mená upravené: {}", duplicates.join(", "));
    }
    let pin = read_line("Spoločný PIN (4 číslice): ")?;
    let allowed = roster_service::allowed_mafia_counts(names.len());
    let default = roster_service::default_mafia_count(names.len());
    let picked = read_line(&format!(
        "Počet mafiánov {:?} [default {}]: ",
        allowed, default
    ))?;
    let mafia_count = if picked.is_empty() {
        default
    } else {
        picked.parse().unwrap_or(default)
    };

    let mut settings = Settings::default();
    settings.include_doctor = read_line("Lekár v hre? [y/N]: ")?.eq_ignore_ascii_case("y");
    settings.first_dead_osud = read_line("Prvý mŕtvy sa stane Osudom? [y/N]: ")?
        .eq_ignore_ascii_case("y");

    match game_service::start_game(state, &raw_names, &pin, mafia_count, settings) {
        Ok(_) => Ok(true),
        Err(e) => {
            println!("Hru sa nepodarilo založiť: {}", e);
            Ok(true)
        }
    }
}

fn role_pass_screen(state: &AppState, game: &Game) -> anyhow::Result<()> {
    let gate = TurnGate::new(game);
    let card = game_service::role_card(state)?;
    unlock(&gate, &card.player)?;
    println!("Tvoja rola: {}", card.role);
    if let Some(teammates) = &card.teammates {
        if teammates.is_empty() {
            println!("Si jediný mafián.");
        } else {
            println!("Ostatní mafiáni: {}", teammates.join(", "));
        }
    }
    hide_and_pass(&gate, "Skryť a podať ďalšiemu")?;
    game_service::confirm_role_seen(state)?;
    Ok(())
}

fn pick_target(targets: &[(PlayerId, String)]) -> anyhow::Result<Option<PlayerId>> {
    for (i, (_, name)) in targets.iter().enumerate() {
        println!("  {}) {}", i + 1, name);
    }
    loop {
        let line = read_line("Vyber číslo (alebo Enter = vynechať ťah): ")?;
        if line.is_empty() {
            return Ok(None);
        }
        if let Ok(n) = line.parse::<usize>() {
            if n >= 1 && n <= targets.len() {
                return Ok(Some(targets[n - 1].0));
            }
        }
        println!("Neplatný výber.");
    }
}

fn night_screen(state: &AppState, game: &Game) -> anyhow::Result<()> {
    let gate = TurnGate::new(game);
    let prompt = game_service::night_prompt(state)?;
    println!("Noc 🌙 • hráč {}/{}", prompt.index + 1, prompt.living);
    unlock(&gate, &prompt.player)?;
    let prompt_text = match prompt.role {
        palermo_osud::Role::Mafia => "Tajný výber mafie: koho by si zabil?",
        palermo_osud::Role::Katanyi => "Katányi: koho chceš preveriť?",
        palermo_osud::Role::Doctor => "Lekár: koho chceš zachrániť? (môžeš aj seba)",
        palermo_osud::Role::Citizen => "Maskovanie: koho si túto noc „všímaš“?",
    };
    println!("{}", prompt_text);

    let result = if prompt.needs_target {
        match pick_target(&prompt.targets)? {
            Some(target) => game_service::submit_night_action(state, Some(target))?,
            None => {
                // abandoned turn: the voter is just absent from the tallies
                game_service::pass_night_turn(state)?;
                hide_and_pass(&gate, "Skryť a podať ďalej")?;
                return Ok(());
            }
        }
    } else {
        game_service::submit_night_action(state, None)?
    };

    match &result.feedback {
        game_service::NightFeedback::VoteRecorded { target } => {
            println!("Zaznamenané. Tvoj cieľ: {}", target)
        }
        game_service::NightFeedback::CheckResult { target, is_mafia } => {
            println!("{} je: {}", target, if *is_mafia { "MAFIA" } else { "OBČAN" })
        }
        game_service::NightFeedback::SaveRecorded { target } => {
            println!("Chrániš: {}", target)
        }
        game_service::NightFeedback::DummyRecorded { target } => {
            println!("Vybral(a) si: {}", target)
        }
        game_service::NightFeedback::Rested => println!("Zaznamenané."),
    }
    if let Some(fact) = &result.fact {
        println!("🦑 Mikro-obsah: {}", fact.text);
    }
    hide_and_pass(&gate, "Skryť a podať ďalej")?;
    Ok(())
}

fn dawn_screen(state: &AppState, game: &Game) -> anyhow::Result<()> {
    println!("Ráno • Deň {}", game.day);
    match game.last.night_dead.and_then(|id| game.player(id)) {
        Some(victim) => println!("{} zomrel(a).", victim.name),
        None => println!("Nikto nezomrel."),
    }
    if game.settings.first_dead_osud && game.osud.enabled && game.last.night_dead.is_some() {
        println!("Prvý mŕtvy sa stal Osudom.");
    }
    println!("Diskusia prebieha mimo appky.");
    read_line("Prejsť na deň (zadanie odsúdeného) [Enter]")?;
    game_service::begin_day(state)?;
    Ok(())
}

fn day_screen(state: &AppState, game: &Game) -> anyhow::Result<()> {
    let gate = TurnGate::new(game);
    unlock(&gate, "admin")?;
    println!("Deň {} • zadaj odsúdeného", game.day);
    println!("  0) Nikto nebol odsúdený");
    let living: Vec<(PlayerId, String)> = game
        .alive_players()
        .into_iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();
    for (i, (_, name)) in living.iter().enumerate() {
        println!("  {}) {}", i + 1, name);
    }
    let target = loop {
        let line = read_line("Vyber číslo: ")?;
        match line.parse::<usize>() {
            Ok(0) => break None,
            Ok(n) if n <= living.len() => break Some(living[n - 1].0),
            _ => println!("Neplatný výber."),
        }
    };
    let (outcome, _) = game_service::judge(state, target)?;
    match &outcome.executed {
        Some((_, name)) => {
            println!("Odsúdený: {}", name);
            match &outcome.revealed {
                Some(label) => println!("Bol to: {}", label),
                None => println!("Rola nebola zverejnená (podľa nastavenia)."),
            }
        }
        None => println!("Tento deň nebol nikto vyradený."),
    }
    hide_and_pass(&gate, "Pokračovať")?;
    Ok(())
}

fn end_screen(state: &AppState, game: &Game) -> anyhow::Result<bool> {
    let winner = match game.win_check() {
        GameResult::MafiaWin => "Mafia",
        _ => "Občania",
    };
    println!("Koniec hry: {} vyhrali!", winner);
    println!("Roly:");
    for p in &game.players {
        println!("  {} — {}", p.name, p.role);
    }
    loop {
        let choice = read_line("n = nová hra (tie isté mená), s = späť na nastavenie, q = koniec: ")?;
        match choice.as_str() {
            "n" => {
                game_service::rematch(state)?;
                return Ok(true);
            }
            "s" => {
                game_service::reset(state)?;
                return Ok(true);
            }
            "q" => return Ok(false),
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv() {
        // the .env file is optional; everything has defaults
        if !e.not_found() {
            eprintln!("Warning: failed to read .env: {}", e);
        }
    }
    init_logger();

    let facts = fact_service::fetch_facts(&CONFIG.facts_source);
    let public_url = fact_service::fetch_public_url(&CONFIG.public_url_source);
    let store = FileStore::new(&CONFIG.state_path);
    let state = AppState::new(Box::new(store), facts, public_url);
    info!("state file: {}", CONFIG.state_path);

    loop {
        match game_service::current_game(&state) {
            None => {
                if !setup_screen(&state).context("setup failed")? {
                    break;
                }
            }
            Some(game) => {
                if let Some(line) = game_service::status(&state) {
                    info!("{}", line);
                }
                match game.phase {
                    Phase::RolePass { .. } => role_pass_screen(&state, &game)?,
                    Phase::NightTurn { .. } => night_screen(&state, &game)?,
                    Phase::Dawn => dawn_screen(&state, &game)?,
                    Phase::DayAdmin => day_screen(&state, &game)?,
                    Phase::End => {
                        if !end_screen(&state, &game)? {
                            break;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
