use cardpull_anilist::{DEFAULT_ANILIST_URL, DEFAULT_PER_PAGE};
use cardpull_core::pity::{PityConfig, DEFAULT_LEGENDARY_THRESHOLD, DEFAULT_MYTHIC_THRESHOLD};
use cardpull_core::session::{DEFAULT_CHOICE_TIMEOUT_SECS, DEFAULT_COOLDOWN_SECS};

/// Default interval between overdue-session sweeps.
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 15;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum time between two draws of one user.
    pub cooldown_secs: i64,
    /// Time a user has to pick one of the offered candidates.
    pub choice_timeout_secs: i64,
    pub pity: PityConfig,
    /// How often the reaper discards overdue sessions.
    pub session_sweep_interval_secs: u64,
    pub anilist_url: String,
    pub anilist_per_page: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            choice_timeout_secs: DEFAULT_CHOICE_TIMEOUT_SECS,
            pity: PityConfig::default(),
            session_sweep_interval_secs: DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
            anilist_url: DEFAULT_ANILIST_URL.to_string(),
            anilist_per_page: DEFAULT_PER_PAGE,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                      |
    /// |-------------------------------|------------------------------|
    /// | `COOLDOWN_SECS`               | `900`                        |
    /// | `CHOICE_TIMEOUT_SECS`         | `60`                         |
    /// | `PITY_LEGENDARY_THRESHOLD`    | `30`                         |
    /// | `PITY_MYTHIC_THRESHOLD`       | `100`                        |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `15`                         |
    /// | `ANILIST_URL`                 | `https://graphql.anilist.co` |
    /// | `ANILIST_PER_PAGE`            | `50`                         |
    ///
    /// Panics on unparsable values; this only runs at startup.
    pub fn from_env() -> Self {
        let cooldown_secs: i64 = env_or("COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS);
        let choice_timeout_secs: i64 = env_or("CHOICE_TIMEOUT_SECS", DEFAULT_CHOICE_TIMEOUT_SECS);
        assert!(cooldown_secs >= 0, "COOLDOWN_SECS must not be negative");
        assert!(choice_timeout_secs > 0, "CHOICE_TIMEOUT_SECS must be positive");

        let pity = PityConfig::new(
            env_or("PITY_LEGENDARY_THRESHOLD", DEFAULT_LEGENDARY_THRESHOLD),
            env_or("PITY_MYTHIC_THRESHOLD", DEFAULT_MYTHIC_THRESHOLD),
        )
        .expect("PITY_*_THRESHOLD must be at least 1");

        let session_sweep_interval_secs: u64 = env_or(
            "SESSION_SWEEP_INTERVAL_SECS",
            DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        );

        let anilist_url =
            std::env::var("ANILIST_URL").unwrap_or_else(|_| DEFAULT_ANILIST_URL.into());
        let anilist_per_page: u32 = env_or("ANILIST_PER_PAGE", DEFAULT_PER_PAGE);

        Self {
            cooldown_secs,
            choice_timeout_secs,
            pity,
            session_sweep_interval_secs: session_sweep_interval_secs.max(1),
            anilist_url,
            anilist_per_page,
        }
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs)
    }

    pub fn choice_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.choice_timeout_secs)
    }

    pub fn session_sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_sweep_interval_secs)
    }
}
