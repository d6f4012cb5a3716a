//! Dialog Lifecycle
//!
//! Open/close state machine around a [`Classifier`]. Opening mounts a
//! surface and binds one sortable list per category; closing always tears
//! both down and settles the pending outcome exactly once.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::classification::ClassificationResult;
use crate::classifier::{Checkpoint, Classifier};
use crate::error::{ClassifyError, ClassifyResult};
use crate::model::{Category, CategoryId, Item};
use crate::options::{ClassifyOptions, DialogOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogButton {
    Cancel,
    Save,
    Close,
}

impl DialogButton {
    pub fn label(self) -> &'static str {
        match self {
            DialogButton::Cancel => "Cancel",
            DialogButton::Save => "Save",
            DialogButton::Close => "Close",
        }
    }

    /// Whether pressing it resolves the outcome with the current value
    pub fn saves(self) -> bool {
        matches!(self, DialogButton::Save)
    }
}

/// What the surface shows around the columns
#[derive(Debug, Clone, PartialEq)]
pub struct DialogFrame {
    pub title: String,
    pub width: String,
    pub height: String,
    pub read_only: bool,
    pub buttons: Vec<DialogButton>,
}

impl DialogFrame {
    fn build(title: &str, dialog: &DialogOptions, editable: bool) -> Self {
        let base = dialog.title.as_deref().unwrap_or(title);
        let (title, buttons) = if editable {
            (base.to_string(), vec![DialogButton::Cancel, DialogButton::Save])
        } else {
            (format!("{} (Read Only)", base), vec![DialogButton::Close])
        };
        Self {
            title,
            width: dialog.width.clone(),
            height: dialog.height.clone(),
            read_only: !editable,
            buttons,
        }
    }
}

/// A drag-and-drop listener set attached to one category list
pub trait LaneBinding {
    fn destroy(&mut self);
}

/// The thing that actually draws the modal
pub trait DialogSurface {
    fn mount(&mut self, frame: &DialogFrame);

    /// Attach drag-and-drop to one category list
    fn bind_lane(&mut self, category: &CategoryId) -> Box<dyn LaneBinding>;

    fn unmount(&mut self);
}

/// Resolves with the value on Save, or [`ClassifyError::Cancelled`]
#[must_use]
pub struct DialogOutcome {
    receiver: oneshot::Receiver<ClassifyResult<ClassificationResult>>,
}

impl Future for DialogOutcome {
    type Output = ClassifyResult<ClassificationResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|settled| match settled {
            Ok(result) => result,
            // Sender dropped without settling, e.g. the widget was disposed
            Err(oneshot::Canceled) => Err(ClassifyError::Cancelled),
        })
    }
}

struct OpenState {
    surface: Box<dyn DialogSurface>,
    bindings: Vec<Box<dyn LaneBinding>>,
    responder: oneshot::Sender<ClassifyResult<ClassificationResult>>,
    checkpoint: Checkpoint,
}

pub struct ClassifyDialog {
    classifier: Classifier,
    open: Option<OpenState>,
    closing_programmatically: bool,
    frame: Option<DialogFrame>,
}

impl ClassifyDialog {
    pub fn new(categories: Vec<Category>, items: Vec<Item>, options: ClassifyOptions) -> ClassifyResult<Self> {
        Ok(Self::from_classifier(Classifier::new(categories, items, options)?))
    }

    pub fn from_classifier(classifier: Classifier) -> Self {
        Self {
            classifier,
            open: None,
            closing_programmatically: false,
            frame: None,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classifier_mut(&mut self) -> &mut Classifier {
        &mut self.classifier
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Frame of the currently open dialog
    pub fn frame(&self) -> Option<&DialogFrame> {
        self.frame.as_ref()
    }

    /// Current classification. Available whether or not the dialog is open.
    pub fn get_value(&self) -> ClassificationResult {
        self.classifier.value()
    }

    pub fn open(&mut self, dialog: DialogOptions, mut surface: Box<dyn DialogSurface>) -> ClassifyResult<DialogOutcome> {
        if self.open.is_some() {
            return Err(ClassifyError::AlreadyOpen);
        }

        let checkpoint = self.classifier.checkpoint();
        self.classifier.search("");

        let editable = self.classifier.is_editable();
        let frame = DialogFrame::build(&self.classifier.options().title, &dialog, editable);
        surface.mount(&frame);

        let bindings = if editable {
            self.classifier
                .categories()
                .iter()
                .map(|c| surface.bind_lane(&c.id))
                .collect()
        } else {
            Vec::new()
        };

        let (responder, receiver) = oneshot::channel();
        log::debug!("dialog '{}' opened with {} lane bindings", frame.title, bindings.len());
        self.frame = Some(frame);
        self.open = Some(OpenState {
            surface,
            bindings,
            responder,
            checkpoint,
        });
        Ok(DialogOutcome { receiver })
    }

    /// Programmatic close. Save resolves with the value; anything else
    /// restores the state from open time and resolves as cancelled.
    /// Closing a closed dialog does nothing.
    pub fn close(&mut self, save: bool) {
        let Some(mut state) = self.open.take() else {
            return;
        };
        self.closing_programmatically = true;

        let settled = if save && self.classifier.is_editable() {
            Ok(self.classifier.value())
        } else {
            self.classifier.restore(state.checkpoint);
            Err(ClassifyError::Cancelled)
        };

        for binding in state.bindings.iter_mut() {
            binding.destroy();
        }
        state.surface.unmount();
        self.frame = None;

        // The receiver may already be gone if the caller stopped waiting
        let _ = state.responder.send(settled);
        self.closing_programmatically = false;
    }

    pub fn press(&mut self, button: DialogButton) {
        self.close(button.saves());
    }

    /// The surface was closed by the platform (Escape, backdrop). Ignored
    /// while a programmatic close is running or after the dialog closed.
    pub fn native_close(&mut self) {
        if self.closing_programmatically || self.open.is_none() {
            return;
        }
        log::debug!("dialog closed natively, treating as cancel");
        self.close(false);
    }
}

impl Drop for ClassifyDialog {
    fn drop(&mut self) {
        self.close(false);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ItemId;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeBinding {
        lane: String,
        log: Log,
    }

    impl LaneBinding for FakeBinding {
        fn destroy(&mut self) {
            self.log.borrow_mut().push(format!("destroy {}", self.lane));
        }
    }

    struct FakeSurface {
        log: Log,
    }

    impl DialogSurface for FakeSurface {
        fn mount(&mut self, frame: &DialogFrame) {
            self.log.borrow_mut().push(format!("mount {}", frame.title));
        }

        fn bind_lane(&mut self, category: &CategoryId) -> Box<dyn LaneBinding> {
            self.log.borrow_mut().push(format!("bind {}", category));
            Box::new(FakeBinding {
                lane: category.to_string(),
                log: self.log.clone(),
            })
        }

        fn unmount(&mut self) {
            self.log.borrow_mut().push("unmount".to_string());
        }
    }

    fn surface(log: &Log) -> Box<dyn DialogSurface> {
        Box::new(FakeSurface { log: log.clone() })
    }

    fn dialog(editable: bool) -> ClassifyDialog {
        let options = ClassifyOptions {
            editable,
            ..ClassifyOptions::default()
        };
        ClassifyDialog::new(
            vec![Category::new("a", "A"), Category::new("b", "B")],
            vec![Item::new(1, "One", Some("a")), Item::new(2, "Two", Some("b"))],
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_save_resolves_with_value() {
        let log = Log::default();
        let mut d = dialog(true);
        let outcome = d.open(DialogOptions::default(), surface(&log)).unwrap();
        d.classifier_mut().move_item(&ItemId::from("1"), &"b".into(), false).unwrap();
        d.press(DialogButton::Save);

        let value = outcome.now_or_never().unwrap().unwrap();
        assert_eq!(value.bucket(&"b".into()), &[ItemId::from("2"), ItemId::from("1")]);
        assert!(!d.is_open());
    }

    #[test]
    fn test_cancel_restores_and_rejects() {
        let log = Log::default();
        let mut d = dialog(true);
        let before = d.get_value();
        let outcome = d.open(DialogOptions::default(), surface(&log)).unwrap();
        d.classifier_mut().move_item(&ItemId::from("1"), &"b".into(), false).unwrap();
        d.press(DialogButton::Cancel);

        assert_eq!(outcome.now_or_never().unwrap(), Err(ClassifyError::Cancelled));
        assert_eq!(d.get_value(), before);
    }

    #[test]
    fn test_teardown_happens_once() {
        let log = Log::default();
        let mut d = dialog(true);
        let _outcome = d.open(DialogOptions::titled("Pick"), surface(&log)).unwrap();
        d.close(true);
        d.close(false);
        d.native_close();

        assert_eq!(
            *log.borrow(),
            vec!["mount Pick", "bind a", "bind b", "destroy a", "destroy b", "unmount"]
        );
    }

    #[test]
    fn test_native_close_cancels() {
        let log = Log::default();
        let mut d = dialog(true);
        let outcome = d.open(DialogOptions::default(), surface(&log)).unwrap();
        d.native_close();
        assert_eq!(outcome.now_or_never().unwrap(), Err(ClassifyError::Cancelled));
        assert!(!d.is_open());
    }

    #[test]
    fn test_read_only_frame() {
        let log = Log::default();
        let mut d = dialog(false);
        let outcome = d.open(DialogOptions::default(), surface(&log)).unwrap();
        let frame = d.frame().unwrap().clone();
        assert_eq!(frame.title, "Classification (Read Only)");
        assert_eq!(frame.buttons, vec![DialogButton::Close]);
        assert!(frame.read_only);
        // No lane bindings in read-only mode
        assert_eq!(*log.borrow(), vec!["mount Classification (Read Only)"]);

        d.press(DialogButton::Close);
        assert_eq!(outcome.now_or_never().unwrap(), Err(ClassifyError::Cancelled));
    }

    #[test]
    fn test_double_open_rejected() {
        let log = Log::default();
        let mut d = dialog(true);
        let _outcome = d.open(DialogOptions::default(), surface(&log)).unwrap();
        assert!(matches!(
            d.open(DialogOptions::default(), surface(&log)),
            Err(ClassifyError::AlreadyOpen)
        ));
    }

    #[test]
    fn test_reopen_after_close_and_search_reset() {
        let log = Log::default();
        let mut d = dialog(true);
        let first = d.open(DialogOptions::default(), surface(&log)).unwrap();
        d.classifier_mut().search("one");
        d.close(true);
        assert!(first.now_or_never().unwrap().is_ok());

        let second = d.open(DialogOptions::default(), surface(&log)).unwrap();
        assert_eq!(d.classifier().search_term(), "");
        assert_eq!(d.classifier().counters().visible_total, 2);
        drop(d);
        assert_eq!(second.now_or_never().unwrap(), Err(ClassifyError::Cancelled));
    }
}
