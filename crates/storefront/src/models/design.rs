//! AI design sessions, their message log, and video assistant sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aurelia_core::{
    DesignMessageId, DesignSessionId, MessageRole, UserId, VideoSessionId, VideoSessionState,
};

/// How many design sessions a user may favorite at once.
pub const MAX_FAVORITE_SESSIONS: i64 = 5;

/// How long an unfavorited session lives before expiring.
pub const SESSION_TTL_DAYS: i64 = 15;

/// Whether a user holding `favorite_count` favorites may add another.
#[must_use]
pub const fn favorite_cap_reached(favorite_count: i64) -> bool {
    favorite_count >= MAX_FAVORITE_SESSIONS
}

/// An AI design session.
///
/// Expires [`SESSION_TTL_DAYS`] after creation; `expires_at` is cleared
/// while the session is favorited and restored on unfavorite.
#[derive(Debug, Clone, Serialize)]
pub struct DesignSession {
    pub id: DesignSessionId,
    pub user_id: UserId,
    pub title: String,
    pub language: String,
    pub favorite: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in a session's append-only message log.
#[derive(Debug, Clone, Serialize)]
pub struct DesignMessage {
    pub id: DesignMessageId,
    pub session_id: DesignSessionId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A conversational-video assistant session.
#[derive(Debug, Clone, Serialize)]
pub struct VideoSession {
    pub id: VideoSessionId,
    pub user_id: Option<UserId>,
    pub language: String,
    pub state: VideoSessionState,
    /// Joinable room URL, present once the session is active.
    pub conversation_url: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_cap() {
        assert!(!favorite_cap_reached(0));
        assert!(!favorite_cap_reached(4));
        assert!(favorite_cap_reached(5));
        assert!(favorite_cap_reached(6));
    }
}
