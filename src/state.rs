//! Application state: the read-only catalog and description table, plus the
//! server-side quiz session store.
//!
//! Everything is constructed once in `main` and shared behind `Arc`; only the
//! session map is mutable.

use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::catalog::undescribed;
use crate::domain::{DescriptionTable, Game, Question, QuizSession};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Vec<Game>>,
    pub descriptions: Arc<DescriptionTable>,
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub session_ttl: Duration,
}

impl AppState {
    #[instrument(level = "info", skip_all, fields(games = catalog.len(), titles = descriptions.len()))]
    pub fn new(catalog: Vec<Game>, descriptions: DescriptionTable, session_ttl: Duration) -> Self {
        let missing = undescribed(&catalog, &descriptions);
        if !missing.is_empty() {
            warn!(target: "quiz", count = missing.len(), titles = ?missing, "Catalog games without descriptions will show the fallback phrase");
        }

        let mut genres: HashMap<&str, usize> = HashMap::new();
        for g in &catalog {
            *genres.entry(g.genre.as_str()).or_default() += 1;
        }
        info!(target: "quiz", games = catalog.len(), genres = genres.len(), "Startup catalog inventory");

        Self {
            catalog: Arc::new(catalog),
            descriptions: Arc::new(descriptions),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl,
        }
    }

    /// Store a fresh session for `questions` and return its id.
    /// Expired sessions are pruned on the way in.
    #[instrument(level = "debug", skip_all)]
    pub async fn create_session(&self, questions: Vec<Question>) -> QuizSession {
        let session = QuizSession::new(Uuid::new_v4().to_string(), questions);
        let mut sessions = self.sessions.write().await;

        let ttl = self.session_ttl;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(target: "quiz", pruned, "Pruned expired sessions");
        }

        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Run `f` against a live session, refreshing its expiry.
    /// Returns None for unknown or expired ids.
    pub async fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut QuizSession) -> T) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        let expired = sessions.get(id)?.last_seen.elapsed() >= self.session_ttl;
        if expired {
            sessions.remove(id);
            return None;
        }
        let session = sessions.get_mut(id)?;
        session.last_seen = Instant::now();
        Some(f(session))
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }
}
