// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

/// A value transformation that is either a plain closure or an async one.
pub(crate) enum Transform<S, U> {
    Sync(Box<dyn Fn(S) -> U + Send + Sync>),
    Async(Box<dyn Fn(S) -> BoxFuture<'static, U> + Send + Sync>),
}

impl<S, U> Transform<S, U>
where
    S: Send + 'static,
    U: Send + 'static,
{
    pub(crate) fn sync<F>(transform: F) -> Self
    where
        F: Fn(S) -> U + Send + Sync + 'static,
    {
        Self::Sync(Box::new(transform))
    }

    pub(crate) fn from_async<F, Fut>(transform: F) -> Self
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        Self::Async(Box::new(move |value| transform(value).boxed()))
    }

    pub(crate) async fn apply(&self, value: S) -> U {
        match self {
            Self::Sync(transform) => transform(value),
            Self::Async(transform) => transform(value).await,
        }
    }
}
