//! Session helpers keeping handlers free of framework-specific logic.
//!
//! The session carries only the authenticated user id (plus a display name
//! for `/me`); every core operation receives the caller identity explicitly
//! rather than reading ambient state.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::accounts::AccountProfile;
use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const USER_NAME_KEY: &str = "user_name";

/// Newtype wrapper exposing higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated account in the session cookie.
    pub fn persist(&self, profile: &AccountProfile) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, profile.id.get())
            .and_then(|()| self.0.insert(USER_NAME_KEY, profile.name.clone()))
            .map_err(|err| Error::internal(format!("failed to persist session: {err}")))
    }

    /// Drop the session entirely.
    pub fn clear(&self) {
        self.0.clear();
    }

    /// Fetch the current user id, if any.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<i64>(USER_ID_KEY)
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))?;
        Ok(id.map(UserId::new))
    }

    /// Fetch the current display name, if any.
    pub fn user_name(&self) -> Result<Option<String>, Error> {
        self.0
            .get::<String>(USER_NAME_KEY)
            .map_err(|err| Error::internal(format!("failed to read session: {err}")))
    }

    /// Require an authenticated user id or fail with `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
