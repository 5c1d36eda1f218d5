use once_cell::sync::Lazy;
use std::env;

pub static CONFIG: Lazy<Config> = Lazy::new(Config::new);

/// Where the app keeps its record and fetches optional content. Everything
/// has a working default; env vars override for packaging and tests.
pub struct Config {
    pub state_path: String,
    pub facts_source: String,
    pub public_url_source: String,
}

impl Config {
    fn new() -> Self {
        Self {
            state_path: env::var("PALERMO_STATE_PATH")
                .unwrap_or_else(|_| "palermo_osud.json".to_string()),
            facts_source: env::var("PALERMO_FACTS_SOURCE")
                .unwrap_or_else(|_| "facts_chobotnica.json".to_string()),
            public_url_source: env::var("PALERMO_PUBLIC_URL_SOURCE")
                .unwrap_or_else(|_| "public_url.txt".to_string()),
        }
    }
}
