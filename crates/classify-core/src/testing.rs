//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use crate::api::{ApiError, RawReply, Transport};
use crate::notify::{NoticeKind, Notifier};

/// Records every alert and answers confirms/prompts from a script
#[derive(Default)]
pub struct RecordingNotifier {
    alerts: RefCell<Vec<(String, String, NoticeKind)>>,
    confirms: RefCell<VecDeque<bool>>,
    prompts: RefCell<VecDeque<Option<String>>>,
    asked: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn answering(confirms: &[bool]) -> Self {
        let notifier = Self::default();
        notifier.confirms.borrow_mut().extend(confirms.iter().copied());
        notifier
    }

    pub fn with_prompt(self, answer: Option<&str>) -> Self {
        self.prompts.borrow_mut().push_back(answer.map(str::to_string));
        self
    }

    pub fn alerts(&self) -> Vec<(String, String, NoticeKind)> {
        self.alerts.borrow().clone()
    }

    pub fn alert_messages(&self) -> Vec<String> {
        self.alerts.borrow().iter().map(|(m, _, _)| m.clone()).collect()
    }

    /// Messages of every confirm that was asked
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Notifier for RecordingNotifier {
    async fn alert(&self, message: &str, title: &str, kind: NoticeKind) {
        self.alerts.borrow_mut().push((message.to_string(), title.to_string(), kind));
    }

    async fn confirm(&self, message: &str, _title: &str, _kind: NoticeKind) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.confirms.borrow_mut().pop_front().unwrap_or(false)
    }

    async fn prompt(&self, message: &str, _default: &str) -> Option<String> {
        self.asked.borrow_mut().push(message.to_string());
        self.prompts.borrow_mut().pop_front().flatten()
    }
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<RawReply, ApiError>>,
    requests: Vec<Vec<(String, String)>>,
}

/// Transport answering from a queue of scripted replies
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Rc<RefCell<Script>>,
}

impl FakeTransport {
    pub fn reply(&self, status: u16, body: &str) {
        self.script.borrow_mut().replies.push_back(Ok(RawReply {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, reason: &str) {
        self.script
            .borrow_mut()
            .replies
            .push_back(Err(ApiError::Transport(reason.to_string())));
    }

    pub fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.script.borrow().requests.clone()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn post_form(&self, _url: &str, fields: &[(String, String)]) -> Result<RawReply, ApiError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(fields.to_vec());
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted reply".to_string())))
    }
}
