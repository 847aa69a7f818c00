//! Application context – owns the learner's session.

use crate::session::Session;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Central context passed to all engine commands.
///
/// The session sits behind a mutex so `submit` and `reset` never interleave
/// when a front end (e.g. the socket daemon) shares one context.
#[derive(Debug, Default)]
pub struct AppContext {
    session: Mutex<Session>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Lock the session for one read-modify-write.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        // Every mutation leaves the session consistent, so a poisoned lock
        // still guards valid state.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::ModuleId;
    use crate::stage::Answer;

    #[test]
    fn test_with_session_keeps_progress() {
        let mut session = Session::new();
        session.submit_answer(ModuleId::Hydro, 1, &Answer::from(["wrong"]));
        let ctx = AppContext::with_session(session);
        assert!(ctx.session().get_state(ModuleId::Hydro).hint.is_some());
    }

    #[test]
    fn test_poisoned_lock_still_usable() {
        let ctx = std::sync::Arc::new(AppContext::new());
        let c = ctx.clone();
        let _ = std::thread::spawn(move || {
            let _guard = c.session();
            panic!("poison");
        })
        .join();
        assert_eq!(ctx.session().total_score(), 0);
    }
}
