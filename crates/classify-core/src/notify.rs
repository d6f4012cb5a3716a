//! Notifications
//!
//! Modal alert/confirm/prompt as an injected capability. The front-end
//! renders them as in-page modals; tests record them.

use async_trait::async_trait;

use crate::api::ApiError;
use crate::error::ClassifyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeKind {
    #[default]
    Info,
    Warning,
    Error,
    Success,
    Question,
}

impl NoticeKind {
    pub fn icon(self) -> &'static str {
        match self {
            NoticeKind::Info => "ℹ️",
            NoticeKind::Warning => "⚠️",
            NoticeKind::Error => "❌",
            NoticeKind::Success => "✅",
            NoticeKind::Question => "❓",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Info => "notice-info",
            NoticeKind::Warning => "notice-warning",
            NoticeKind::Error => "notice-error",
            NoticeKind::Success => "notice-success",
            NoticeKind::Question => "notice-question",
        }
    }
}

#[async_trait(?Send)]
pub trait Notifier {
    async fn alert(&self, message: &str, title: &str, kind: NoticeKind);

    async fn confirm(&self, message: &str, title: &str, kind: NoticeKind) -> bool;

    /// Ask for a line of text; `None` when dismissed
    async fn prompt(&self, message: &str, default: &str) -> Option<String>;
}

/// Show a backend failure to the user
pub async fn report<N: Notifier + ?Sized>(notifier: &N, error: &ApiError) {
    let (title, kind) = match error {
        ApiError::Http { .. } | ApiError::Transport(_) | ApiError::Decode(_) => ("Server Error", NoticeKind::Error),
        ApiError::Rejected(_) => ("Notice", NoticeKind::Warning),
    };
    log::warn!("backend call failed: {}", error);
    notifier.alert(&error.to_string(), title, kind).await;
}

/// Show any classification failure, staying quiet on user cancellation
pub async fn report_error<N: Notifier + ?Sized>(notifier: &N, error: &ClassifyError) {
    match error {
        ClassifyError::Cancelled => {}
        ClassifyError::Api(api) => report(notifier, api).await,
        ClassifyError::EmptyGroup | ClassifyError::NothingToUpdate => {
            notifier.alert(&error.to_string(), "Notice", NoticeKind::Info).await
        }
        other => notifier.alert(&other.to_string(), "Notice", NoticeKind::Warning).await,
    }
}
