use crate::user_storage::UserId;
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;
use warp::{
    http::{header::InvalidHeaderValue, HeaderValue},
    Filter,
};

#[derive(Clone)]
pub struct Sessions {
    inner: Arc<RwLock<SessionInner>>,
    ttl: time::Duration,
}

impl Sessions {
    /// Must be called from within a tokio runtime, spawns the garbage collector.
    pub fn new(gc_time: Duration, ttl: Duration) -> Self {
        let ret = Self {
            inner: Default::default(),
            ttl: time::Duration::seconds(ttl.as_secs() as i64),
        };
        let weakling = Arc::downgrade(&ret.inner);
        tokio::task::spawn(async move {
            let start = tokio::time::Instant::now() + gc_time;
            let mut interval = tokio::time::interval_at(start, gc_time);
            loop {
                interval.tick().await;
                if let Some(this) = weakling.upgrade() {
                    let removed = this.write().await.gc();
                    if removed > 0 {
                        tracing::debug!(removed, "collected expired sessions");
                    }
                } else {
                    return;
                }
            }
        });

        ret
    }

    pub async fn login(&self, user_id: UserId) -> LoginSession {
        let mut storage = self.inner.write().await;
        let uuid = loop {
            let uuid = Uuid::new_v4();
            if !storage.sessions.contains_key(&uuid) {
                break uuid;
            }
        };

        // one live session per user
        if let Some(stale_session) = storage.users_logged_in.insert(user_id, uuid) {
            storage.sessions.remove(&stale_session);
        }

        storage.sessions.insert(
            uuid,
            SessionData {
                user_id,
                expiry: OffsetDateTime::now_utc() + self.ttl,
            },
        );

        LoginSession {
            uuid,
            expiry_time: self.ttl,
        }
    }

    pub async fn get_user_id(&self, session_id: Uuid) -> Option<UserId> {
        enum Id {
            Expired,
            Live(UserId),
        }

        let user_id = {
            let storage = self.inner.read().await;
            let now = OffsetDateTime::now_utc();

            match storage.sessions.get(&session_id) {
                Some(data) if data.expired(now) => Some(Id::Expired),
                Some(SessionData { user_id, .. }) => Some(Id::Live(*user_id)),
                _ => None,
            }
        };

        match user_id {
            Some(Id::Live(id)) => Some(id),
            Some(Id::Expired) => {
                self.inner.write().await.remove_session(session_id);
                None
            }
            _ => None,
        }
    }

    pub async fn logout(&self, user_id: UserId) {
        self.inner.write().await.remove_user(user_id);
    }

    async fn resolve(&self, cookie: Option<String>) -> Result<Option<UserId>, Error> {
        match cookie {
            Some(cookie) => {
                let session_id = Uuid::parse_str(&cookie).map_err(|_| Error::CorruptedCookie)?;
                Ok(self.get_user_id(session_id).await)
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct SessionInner {
    sessions: BTreeMap<Uuid, SessionData>,
    users_logged_in: BTreeMap<UserId, Uuid>,
}

impl SessionInner {
    fn remove_session(&mut self, session_id: Uuid) {
        if let Some(entry) = self.sessions.remove(&session_id) {
            self.users_logged_in.remove(&entry.user_id);
        }
    }

    fn remove_user(&mut self, user_id: UserId) {
        if let Some(session_id) = self.users_logged_in.remove(&user_id) {
            self.sessions.remove(&session_id);
        }
    }

    fn gc(&mut self) -> usize {
        let now = OffsetDateTime::now_utc();
        let to_remove = self
            .sessions
            .iter()
            .filter(|(_, data)| data.expired(now))
            .map(|(id, _)| *id)
            .collect::<Vec<_>>();

        for id in &to_remove {
            self.remove_session(*id);
        }
        to_remove.len()
    }
}

pub struct SessionData {
    user_id: UserId,
    expiry: OffsetDateTime,
}

impl SessionData {
    fn expired(&self, now: OffsetDateTime) -> bool {
        self.expiry < now
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Received invalid cookie")]
    CorruptedCookie,

    #[error("Session required")]
    SessionRequired { access_url: String },

    #[error("Unauthorized")]
    Unauthorized,
}

impl warp::reject::Reject for Error {}

pub const COOKIE_NAME: &str = "daybook-session";

/// Pages behind this redirect to the login form when there's no session.
pub fn login_required(
    sessions: Sessions,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::path::full()
        .and(warp::filters::cookie::optional(COOKIE_NAME))
        .and_then(move |path: warp::path::FullPath, cookie: Option<String>| {
            let sessions = sessions.clone();
            async move {
                sessions
                    .resolve(cookie)
                    .await?
                    .ok_or_else(|| Error::SessionRequired {
                        access_url: path.as_str().to_owned(),
                    })
                    .map_err(warp::reject::custom)
            }
        })
}

/// Like [`login_required`] but rejects with a plain 401 for JSON clients.
pub fn api_login_required(
    sessions: Sessions,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::filters::cookie::optional(COOKIE_NAME).and_then(move |cookie: Option<String>| {
        let sessions = sessions.clone();
        async move {
            sessions
                .resolve(cookie)
                .await
                .ok()
                .flatten()
                .ok_or_else(|| warp::reject::custom(Error::Unauthorized))
        }
    })
}

pub fn optional_login(
    sessions: Sessions,
) -> impl Filter<Extract = (Option<UserId>,), Error = std::convert::Infallible> + Clone {
    warp::filters::cookie::optional(COOKIE_NAME).then(move |cookie: Option<String>| {
        let sessions = sessions.clone();
        async move { sessions.resolve(cookie).await.ok().flatten() }
    })
}

pub struct LoginSession {
    uuid: Uuid,
    expiry_time: time::Duration,
}

impl LoginSession {
    pub fn id(&self) -> Uuid {
        self.uuid
    }
}

impl TryFrom<LoginSession> for HeaderValue {
    type Error = InvalidHeaderValue;
    fn try_from(other: LoginSession) -> Result<HeaderValue, Self::Error> {
        let cookie = cookie::Cookie::build((COOKIE_NAME, other.uuid.to_string()))
            .path("/")
            .http_only(true)
            .same_site(cookie::SameSite::Lax)
            .max_age(other.expiry_time)
            .build();
        HeaderValue::try_from(cookie.to_string())
    }
}

pub struct ClearCookie;

impl TryFrom<ClearCookie> for HeaderValue {
    type Error = InvalidHeaderValue;
    fn try_from(_: ClearCookie) -> Result<HeaderValue, Self::Error> {
        let cookie = cookie::Cookie::build((COOKIE_NAME, ""))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build();
        HeaderValue::try_from(cookie.to_string())
    }
}
