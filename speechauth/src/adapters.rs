//! Blocking and callback front-ends over the async engine.

use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::{
    engine::SessionEngine,
    error::Result,
    flow::FlowPolicy,
    profile::Profile,
    result::SpeechResult,
};

/// Runs engine operations to completion on a private current-thread runtime.
///
/// Must not be used from inside an async context.
pub struct BlockingSession<P: FlowPolicy> {
    runtime: Runtime,
    engine: SessionEngine<P>,
}

impl<P: FlowPolicy> BlockingSession<P> {
    pub fn new(engine: SessionEngine<P>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, engine })
    }

    pub fn engine(&self) -> &SessionEngine<P> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SessionEngine<P> {
        &mut self.engine
    }

    pub fn into_inner(self) -> SessionEngine<P> {
        self.engine
    }

    pub fn prefetch_profile(&mut self) -> Option<Profile> {
        self.runtime.block_on(self.engine.prefetch_profile())
    }

    pub fn start(&mut self) -> bool {
        self.runtime.block_on(self.engine.start())
    }

    pub fn post(&mut self) -> SpeechResult {
        self.runtime.block_on(self.engine.post())
    }

    pub fn terminal(&mut self) -> SpeechResult {
        self.runtime.block_on(self.engine.terminal())
    }

    pub fn cancel(&mut self, reason: &str) -> bool {
        self.runtime.block_on(self.engine.cancel(reason))
    }
}

/// Engine shared between tasks, with callback-style operations.
///
/// Each `*_then` call spawns the operation on the runtime handle, holds the
/// engine lock for the whole exchange and then invokes the callback with
/// the outcome.
pub struct SharedSession<P: FlowPolicy> {
    inner: Arc<Mutex<SessionEngine<P>>>,
    handle: Handle,
}

impl<P: FlowPolicy> Clone for SharedSession<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl<P: FlowPolicy> SharedSession<P> {
    /// Wraps an engine, spawning on the given runtime handle.
    pub fn new(engine: SessionEngine<P>, handle: Handle) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
            handle,
        }
    }

    /// Wraps an engine, spawning on the current runtime.
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn current(engine: SessionEngine<P>) -> Self {
        Self::new(engine, Handle::current())
    }

    /// Locks the engine for direct use (appending content, reading results).
    pub async fn lock(&self) -> MutexGuard<'_, SessionEngine<P>> {
        self.inner.lock().await
    }

    pub fn prefetch_profile_then<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<Profile>) + Send + 'static,
    {
        let inner = self.inner.clone();
        self.handle.spawn(async move {
            let profile = inner.lock().await.prefetch_profile().await;
            callback(profile);
        })
    }

    pub fn start_then<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let inner = self.inner.clone();
        self.handle.spawn(async move {
            let started = inner.lock().await.start().await;
            callback(started);
        })
    }

    pub fn post_then<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(SpeechResult) + Send + 'static,
    {
        let inner = self.inner.clone();
        self.handle.spawn(async move {
            let result = inner.lock().await.post().await;
            callback(result);
        })
    }

    pub fn terminal_then<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(SpeechResult) + Send + 'static,
    {
        let inner = self.inner.clone();
        self.handle.spawn(async move {
            let result = inner.lock().await.terminal().await;
            callback(result);
        })
    }

    pub fn cancel_then<F>(&self, reason: impl Into<String>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let inner = self.inner.clone();
        let reason = reason.into();
        self.handle.spawn(async move {
            let cancelled = inner.lock().await.cancel(&reason).await;
            callback(cancelled);
        })
    }
}
