use crate::*;

/// Lifecycle of the one-shot data load. Cells exist only in `Ready`.
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Failed(LoadError),
    Ready(GameSession),
}

impl LoadState {
    /// Builds a session from GeoJSON text, or records why it could not.
    pub fn from_geojson(json: &str, config: &BoardConfig) -> Self {
        match CellRegistry::load(json, config) {
            Ok(registry) => Self::Ready(GameSession::new(registry, config.threshold)),
            Err(err) => {
                log::error!("failed to load board: {err}");
                Self::Failed(err)
            }
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn session(&self) -> Option<&GameSession> {
        match self {
            Self::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        match self {
            Self::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Human-readable status line.
    pub fn status_message(&self, config: &BoardConfig) -> String {
        match self {
            Self::Pending => "Loading...".into(),
            Self::Failed(err) => format!("Error: {err}"),
            Self::Ready(session) => format!(
                "Ready. Safe cells: {} (H={}m, V={}m)",
                session.total_safe(),
                config.neighbors.spacing.horizontal,
                config.neighbors.spacing.vertical
            ),
        }
    }
}
