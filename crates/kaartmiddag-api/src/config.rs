//! Server configuration read from the environment.

use std::net::SocketAddr;

use kaartmiddag_event::config::{DEFAULT_NOMINAL_TABLE_SIZE, EventSettings};
use kaartmiddag_event::domain::model::Game;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Startup configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// PostgreSQL connection string. Without it events live in memory.
    pub database_url: Option<String>,
    /// Table size and game order policy.
    pub settings: EventSettings,
}

impl ApiConfig {
    /// Reads `HOST`, `PORT`, `DATABASE_URL`, `NOMINAL_TABLE_SIZE` and
    /// `GAME_ORDER` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let nominal_table_size = match lookup("NOMINAL_TABLE_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                AppError::Config(format!("NOMINAL_TABLE_SIZE must be a whole number: {e}"))
            })?,
            None => DEFAULT_NOMINAL_TABLE_SIZE,
        };
        let first_game = match lookup("GAME_ORDER") {
            Some(raw) => parse_game_order(&raw)?,
            None => Game::Jokeren,
        };

        Ok(Self {
            host,
            port,
            database_url,
            settings: EventSettings::new(Some(nominal_table_size), first_game),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

/// Parses `"Rikken,Jokeren"` style input and returns the game listed first.
/// A single game is accepted; the other one follows it.
fn parse_game_order(raw: &str) -> Result<Game, AppError> {
    let games = raw
        .split(',')
        .map(str::parse::<Game>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Config(format!("GAME_ORDER: {e}")))?;
    match games.as_slice() {
        [first] => Ok(*first),
        [first, second] if *second == first.other() => Ok(*first),
        _ => Err(AppError::Config(format!(
            "GAME_ORDER must list Jokeren and Rikken once each, got {raw:?}"
        ))),
    }
}
