use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

use crate::models::player::{Player, PlayerId};
use crate::models::role::Role;
use crate::models::rule::Settings;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("{mafia} mafia plus special roles do not fit {players} players")]
    TooManyRoles { players: usize, mafia: u32 },
}

/// Trim raw name lines, drop blanks and de-duplicate case-insensitively while
/// preserving first-seen order. Repeats become "Base (2)", "Base (3)", … using
/// the first-seen spelling. Returns the fixed list plus the base names that
/// had duplicates, for user feedback.
pub fn normalize_names<I, S>(raw_lines: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    struct Seen {
        base: String,
        count: u32,
    }
    let mut seen: HashMap<String, Seen> = HashMap::new();
    let mut names = Vec::new();
    let mut duplicates = Vec::new();
    for line in raw_lines {
        let name = line.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        match seen.get_mut(&key) {
            None => {
                seen.insert(
                    key,
                    Seen {
                        base: name.to_string(),
                        count: 1,
                    },
                );
                names.push(name.to_string());
            }
            Some(entry) => {
                entry.count += 1;
                if entry.count == 2 {
                    duplicates.push(entry.base.clone());
                }
                names.push(format!("{} ({})", entry.base, entry.count));
            }
        }
    }
    (names, duplicates)
}

/// Mafia counts offered for a roster of n players. A fixed design table, not
/// a formula; the 5-12 player range is enforced by the caller.
pub fn allowed_mafia_counts(n: usize) -> Vec<u32> {
    if n <= 6 {
        vec![1]
    } else if n <= 9 {
        vec![1, 2]
    } else {
        vec![2, 3]
    }
}

/// Default pick: the highest allowed count.
pub fn default_mafia_count(n: usize) -> u32 {
    allowed_mafia_counts(n).into_iter().max().unwrap_or(1)
}

pub fn build_roster(
    names: &[String],
    mafia_count: u32,
    settings: &Settings,
) -> Result<Vec<Player>, RosterError> {
    build_roster_with(names, mafia_count, settings, &mut rand::thread_rng())
}

/// Construct the role multiset, shuffle it uniformly and assign by position.
/// Fails rather than truncating when the roles do not fit the roster.
pub fn build_roster_with<R: Rng + ?Sized>(
    names: &[String],
    mafia_count: u32,
    settings: &Settings,
    rng: &mut R,
) -> Result<Vec<Player>, RosterError> {
    let mut roles: Vec<Role> = Vec::with_capacity(names.len());
    roles.extend(std::iter::repeat(Role::Mafia).take(mafia_count as usize));
    if settings.include_katanyi {
        roles.push(Role::Katanyi);
    }
    if settings.include_doctor {
        roles.push(Role::Doctor);
    }
    if roles.len() > names.len() {
        return Err(RosterError::TooManyRoles {
            players: names.len(),
            mafia: mafia_count,
        });
    }
    while roles.len() < names.len() {
        roles.push(Role::Citizen);
    }
    roles.shuffle(rng);

    Ok(names
        .iter()
        .zip(roles)
        .enumerate()
        .map(|(i, (name, role))| Player::new(i as PlayerId, name.clone(), role))
        .collect())
}
