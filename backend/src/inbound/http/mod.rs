//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod conversations;
pub mod error;
pub mod health;
pub mod messages;
pub mod riders;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use error::ApiResult;
pub use state::HttpState;

use crate::domain::Error;

/// Run store work on the blocking pool.
///
/// Domain services are synchronous; handlers hand them to Actix's blocking
/// pool so store I/O never stalls the async workers.
pub(crate) async fn run_blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    actix_web::web::block(task)
        .await
        .map_err(|err| Error::internal(format!("blocking task failed: {err}")))?
}
