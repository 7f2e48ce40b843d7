//! Loading → success/error toasts driven by a future
//!
//! [`Toaster::promise`] shows one persistent loading toast, awaits the future,
//! then turns that same toast into a success or error toast with a normal
//! duration. The future's output is handed back untouched. A tracked future
//! that is dropped unfinished still settles its toast.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::controller::Toaster;
use crate::types::{Severity, ToastId, ToastOptions};

const DEFAULT_LOADING: &str = "Loading...";
const DEFAULT_SUCCESS: &str = "Success";
const DEFAULT_ERROR: &str = "Something went wrong";
const DEFAULT_CANCELLED: &str = "Cancelled";
/// Used when the configured default duration is 0 (persistent)
const DEFAULT_SETTLED_MS: u64 = 5000;

/// Toast title, fixed or computed from the settled value
pub enum Message<T: ?Sized> {
    Text(String),
    With(Arc<dyn Fn(&T) -> String + Send + Sync>),
}

impl<T: ?Sized> Message<T> {
    pub fn with<F>(render: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Message::With(Arc::new(render))
    }

    fn render(&self, value: &T) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::With(render) => render(value),
        }
    }
}

impl<T: ?Sized> Clone for Message<T> {
    fn clone(&self) -> Self {
        match self {
            Message::Text(text) => Message::Text(text.clone()),
            Message::With(render) => Message::With(render.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::With(_) => f.write_str("With(..)"),
        }
    }
}

impl<T: ?Sized> From<&str> for Message<T> {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl<T: ?Sized> From<String> for Message<T> {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

/// Titles for each stage of a [`Toaster::promise`] toast
#[derive(Debug)]
pub struct PromiseMessages<T, E> {
    pub loading: Option<String>,
    pub success: Option<Message<T>>,
    pub error: Option<Message<E>>,
    /// Extra options applied to the loading toast (position, variant, ...)
    pub options: ToastOptions,
}

impl<T, E> Default for PromiseMessages<T, E> {
    fn default() -> Self {
        Self {
            loading: None,
            success: None,
            error: None,
            options: ToastOptions::default(),
        }
    }
}

impl<T, E> PromiseMessages<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loading(mut self, text: impl Into<String>) -> Self {
        self.loading = Some(text.into());
        self
    }

    pub fn success(mut self, message: impl Into<Message<T>>) -> Self {
        self.success = Some(message.into());
        self
    }

    pub fn error(mut self, message: impl Into<Message<E>>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }
}

impl Toaster {
    /// Track `future` with a single toast
    ///
    /// The loading toast is added right away, before the returned future is
    /// polled. Awaiting it yields the future's result once the toast has been
    /// settled. Dropping it unfinished turns the toast into a closable
    /// "Cancelled" toast with a normal duration.
    pub fn promise<T, E, F>(
        &self,
        future: F,
        messages: PromiseMessages<T, E>,
    ) -> impl Future<Output = Result<T, E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        let pending = PendingToast {
            toaster: self.clone(),
            id: self.promise_start(&messages),
            settled: false,
        };

        async move {
            let mut pending = pending;
            let result = future.await;
            pending.settle(&result, &messages);
            result
        }
    }

    fn promise_start<T, E>(&self, messages: &PromiseMessages<T, E>) -> ToastId {
        let mut options = messages.options.clone();
        options.title = Some(
            messages
                .loading
                .clone()
                .unwrap_or_else(|| DEFAULT_LOADING.to_string()),
        );
        options.severity = Some(Severity::Info);
        options.duration_ms = Some(0);
        options.loading = Some(true);
        options.closable = Some(false);
        self.add_unique(options)
    }

    /// Display time of a settled toast, never persistent
    fn settled_duration(&self, requested: Option<u64>) -> u64 {
        match requested.filter(|d| *d > 0) {
            Some(duration_ms) => duration_ms,
            None => match self.settings().toast.duration_ms {
                0 => DEFAULT_SETTLED_MS,
                configured => configured,
            },
        }
    }
}

/// The loading toast of one `promise` call
struct PendingToast {
    toaster: Toaster,
    id: ToastId,
    settled: bool,
}

impl PendingToast {
    fn settle<T, E>(&mut self, result: &Result<T, E>, messages: &PromiseMessages<T, E>) {
        let (title, severity) = match result {
            Ok(value) => (
                messages
                    .success
                    .as_ref()
                    .map(|m| m.render(value))
                    .unwrap_or_else(|| DEFAULT_SUCCESS.to_string()),
                Severity::Success,
            ),
            Err(error) => (
                messages
                    .error
                    .as_ref()
                    .map(|m| m.render(error))
                    .unwrap_or_else(|| DEFAULT_ERROR.to_string()),
                Severity::Danger,
            ),
        };

        tracing::debug!("Toaster::promise - {} settled as {}", self.id, severity.as_str());
        let duration_ms = self.toaster.settled_duration(messages.options.duration_ms);
        self.toaster.update(
            &self.id,
            ToastOptions::new()
                .title(title)
                .severity(severity)
                .loading(false)
                .closable(true)
                .duration_ms(duration_ms),
        );
        self.settled = true;
    }
}

impl Drop for PendingToast {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!("Toaster::promise - {} dropped before settling", self.id);
        let duration_ms = self.toaster.settled_duration(None);
        self.toaster.update(
            &self.id,
            ToastOptions::new()
                .title(DEFAULT_CANCELLED)
                .severity(Severity::Warn)
                .loading(false)
                .closable(true)
                .prevent_close(false)
                .duration_ms(duration_ms),
        );
    }
}
