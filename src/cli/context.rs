use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{MarketConfig, NotificationMode};
use crate::db::connection;
use crate::error::MarketError;
use crate::market::Market;
use crate::models::{Actor, Role};
use crate::notify::{NotificationSink, SqliteOutbox, TracingSink};

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub json: bool,
    pub actor_id: Option<String>,
    pub role: Option<String>,
}

impl Context {
    pub fn load_config() -> Result<MarketConfig, MarketError> {
        let path = connection::config_path()?;
        MarketConfig::load(&path).map_err(|e| MarketError::validation(format!("{e:#}")))
    }

    pub fn db_path() -> Result<PathBuf, MarketError> {
        connection::db_path()
    }

    pub fn open_market(&self) -> Result<Market, MarketError> {
        let config = Self::load_config()?;
        let path = Self::db_path()?;
        let sink: Arc<dyn NotificationSink> = match config.notifications {
            NotificationMode::Outbox => Arc::new(SqliteOutbox::open(&path, config.busy_timeout_ms)?),
            NotificationMode::Log => Arc::new(TracingSink),
        };
        Market::open(&path, config.busy_timeout_ms, sink)
    }

    /// The acting identity, with `--role` required.
    pub fn actor(&self) -> Result<Actor, MarketError> {
        let id = self.actor_id()?;
        let role = self
            .role
            .as_deref()
            .ok_or_else(|| MarketError::validation("This command requires --role client|helper"))?;
        let role = Role::from_str(role)
            .ok_or_else(|| MarketError::validation(format!("Unknown role '{role}'. Use client or helper.")))?;
        Ok(Actor { id, role })
    }

    /// The acting identity in a fixed role; `--role`, if given, must agree.
    pub fn actor_as(&self, role: Role) -> Result<Actor, MarketError> {
        if let Some(given) = self.role.as_deref() {
            if Role::from_str(given) != Some(role) {
                return Err(MarketError::unauthorized(format!(
                    "This command must be run as a {}",
                    role.as_str()
                )));
            }
        }
        Ok(Actor {
            id: self.actor_id()?,
            role,
        })
    }

    pub fn actor_id(&self) -> Result<String, MarketError> {
        self.actor_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| MarketError::validation("This command requires --as <user-id>"))
    }
}
