use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use crate::models::fact::Fact;
use crate::models::game::Game;

/// Repeat-avoidance window; matches the size of the used-id ring kept on the
/// game record.
const FACTS_USED_CAP: usize = 200;

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn read_source(source: &str) -> Result<String, FetchError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(client.get(source).send()?.error_for_status()?.text()?)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

/// Single startup fetch of the flavor-text document. Flavor text is optional
/// content: every failure degrades to an empty set and never reaches the
/// game flow.
pub fn fetch_facts(source: &str) -> Vec<Fact> {
    let body = match read_source(source) {
        Ok(body) => body,
        Err(e) => {
            warn!("facts source {} unavailable: {}", source, e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Fact>>(&body) {
        Ok(facts) => {
            info!("loaded {} facts from {}", facts.len(), source);
            facts
        }
        Err(e) => {
            warn!("facts document at {} is not valid JSON: {}", source, e);
            Vec::new()
        }
    }
}

/// Optional public URL shown on the about screen. Absence just leaves the
/// display fallback.
pub fn fetch_public_url(source: &str) -> Option<String> {
    match read_source(source) {
        Ok(body) => {
            let url = body.trim().to_string();
            if url.is_empty() {
                None
            } else {
                Some(url)
            }
        }
        Err(e) => {
            warn!("public URL source {} unavailable: {}", source, e);
            None
        }
    }
}

/// Pick one fact for the current turn: spoilers filtered out when the
/// settings ask for it, recent repeats avoided via the used-id ring on the
/// game record (a few draws, then any fact will do).
pub fn pick_fact<R: Rng + ?Sized>(facts: &[Fact], game: &mut Game, rng: &mut R) -> Option<Fact> {
    let pool: Vec<&Fact> = facts
        .iter()
        .filter(|f| !game.settings.facts_no_spoiler || !f.spoiler)
        .collect();
    if pool.is_empty() {
        return None;
    }
    for _ in 0..10 {
        let fact = *pool.choose(rng)?;
        if !game.facts_used.iter().any(|id| id == &fact.id) {
            game.facts_used.push(fact.id.clone());
            let len = game.facts_used.len();
            if len > FACTS_USED_CAP {
                game.facts_used.drain(..len - FACTS_USED_CAP);
            }
            return Some(fact.clone());
        }
    }
    pool.choose(rng).map(|f| (*f).clone())
}
