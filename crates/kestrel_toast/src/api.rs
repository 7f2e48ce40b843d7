//! Shortcut constructors on [`Toaster`]

use crate::controller::Toaster;
use crate::types::{Severity, ToastAction, ToastId, ToastOptions};

impl Toaster {
    fn add_with_severity(
        &self,
        severity: Severity,
        title: &str,
        description: Option<&str>,
        options: Option<ToastOptions>,
    ) -> ToastId {
        let mut options = options.unwrap_or_default().title(title).severity(severity);
        if let Some(description) = description {
            options = options.description(description);
        }
        self.add(options)
    }

    pub fn success(&self, title: &str, description: Option<&str>, options: Option<ToastOptions>) -> ToastId {
        self.add_with_severity(Severity::Success, title, description, options)
    }

    /// Danger-severity toast
    pub fn error(&self, title: &str, description: Option<&str>, options: Option<ToastOptions>) -> ToastId {
        self.add_with_severity(Severity::Danger, title, description, options)
    }

    pub fn info(&self, title: &str, description: Option<&str>, options: Option<ToastOptions>) -> ToastId {
        self.add_with_severity(Severity::Info, title, description, options)
    }

    pub fn warning(&self, title: &str, description: Option<&str>, options: Option<ToastOptions>) -> ToastId {
        self.add_with_severity(Severity::Warn, title, description, options)
    }

    /// Toast with an "Undo" button that runs `on_undo` and closes the toast
    pub fn undo<F>(&self, message: &str, on_undo: F, options: Option<ToastOptions>) -> ToastId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let options = options
            .unwrap_or_default()
            .title(message)
            .action(ToastAction::new("Undo", on_undo).icon("undo").dismiss(true));
        self.add(options)
    }
}
