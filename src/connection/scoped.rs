//! Scoped acquisition: start, run a body, always stop.

use std::future::Future;

use async_trait::async_trait;

use crate::connection::service::ServiceClient;
use crate::errors::ClientResult;

/// Something that is opened before use and closed afterwards.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    async fn start(&self) -> ClientResult<()>;

    /// Close; failures are logged, not returned.
    async fn stop(&self);
}

#[async_trait]
impl<T: ServiceClient + ?Sized> Lifecycle for T {
    async fn start(&self) -> ClientResult<()> {
        self.connect().await
    }

    async fn stop(&self) {
        if let Err(e) = self.close().await {
            tracing::warn!(service = %self.name(), error = %e, "Close failed");
        }
    }
}

/// Run `body` between `resource.start()` and `resource.stop()`.
///
/// `stop()` runs on every exit path, including a failed start. The body's
/// result (or the start error) is returned.
pub async fn scoped<R, F, Fut, T>(resource: &R, body: F) -> ClientResult<T>
where
    R: Lifecycle + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    if let Err(e) = resource.start().await {
        resource.stop().await;
        return Err(e);
    }

    let out = body().await;
    resource.stop().await;
    out
}
