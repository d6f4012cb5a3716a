//! Modal Host
//!
//! In-page replacement for the browser's alert/confirm/prompt and the
//! generic form dialog. Requests queue up in [`ModalNotifier`]; the host
//! renders the oldest one and settles its future when answered.

use std::rc::Rc;

use async_trait::async_trait;
use classify_core::{FormDialog, FormResult, FormValidator, NoticeKind, Notifier};
use futures::channel::oneshot;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;

#[derive(Debug, Clone, PartialEq)]
pub enum NoticeMode {
    Alert,
    Confirm,
    /// Text input pre-filled with the default
    Prompt(String),
}

/// What the host draws for one queued notice
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeView {
    pub id: u32,
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    pub mode: NoticeMode,
}

struct Notice {
    view: NoticeView,
    // Alert and accepted confirm answer `Some("")`, dismissal answers `None`
    responder: oneshot::Sender<Option<String>>,
}

struct PendingForm {
    id: u32,
    form: FormDialog,
    validator: Option<Rc<dyn FormValidator>>,
    responder: oneshot::Sender<Option<FormResult>>,
}

/// [`Notifier`] that renders through [`ModalHost`]
#[derive(Clone, Copy)]
pub struct ModalNotifier {
    notices: RwSignal<Vec<Notice>, LocalStorage>,
    form: RwSignal<Option<PendingForm>, LocalStorage>,
    next_id: StoredValue<u32>,
}

impl ModalNotifier {
    pub fn new() -> Self {
        Self {
            notices: RwSignal::new_local(Vec::new()),
            form: RwSignal::new_local(None),
            next_id: StoredValue::new(0),
        }
    }

    fn next_id(&self) -> u32 {
        self.next_id.update_value(|id| *id += 1);
        self.next_id.get_value()
    }

    fn ask(&self, kind: NoticeKind, title: &str, message: &str, mode: NoticeMode) -> oneshot::Receiver<Option<String>> {
        let (responder, receiver) = oneshot::channel();
        let view = NoticeView {
            id: self.next_id(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            mode,
        };
        self.notices.update(|queue| queue.push(Notice { view, responder }));
        receiver
    }

    /// Oldest unanswered notice (tracked)
    pub fn front(&self) -> Option<NoticeView> {
        self.notices.with(|queue| queue.first().map(|n| n.view.clone()))
    }

    pub fn answer(&self, id: u32, answer: Option<String>) {
        let responder = self
            .notices
            .try_update(|queue| {
                let pos = queue.iter().position(|n| n.view.id == id)?;
                Some(queue.remove(pos).responder)
            })
            .flatten();
        if let Some(responder) = responder {
            let _ = responder.send(answer);
        }
    }

    // ========================
    // Form dialog
    // ========================

    /// Show `form` until it is saved or dismissed. A form opened while
    /// another is showing replaces it; the replaced one resolves to `None`.
    pub async fn form(&self, form: FormDialog, validator: Option<Rc<dyn FormValidator>>) -> Option<FormResult> {
        let (responder, receiver) = oneshot::channel();
        let pending = PendingForm {
            id: self.next_id(),
            form,
            validator,
            responder,
        };
        self.form.set(Some(pending));
        receiver.await.ok().flatten()
    }

    fn settle_form(&self, answer: Option<FormResult>) {
        if let Some(pending) = self.form.try_update(Option::take).flatten() {
            let _ = pending.responder.send(answer);
        }
    }

    fn form_id(&self) -> Option<u32> {
        self.form.with(|p| p.as_ref().map(|p| p.id))
    }

    fn form_snapshot(&self) -> Option<FormDialog> {
        self.form.with_untracked(|p| p.as_ref().map(|p| p.form.clone()))
    }

    fn edit_form(&self, f: impl FnOnce(&mut FormDialog)) {
        self.form.update(|p| {
            if let Some(p) = p {
                f(&mut p.form);
            }
        });
    }

    async fn save_form(&self) {
        let Some((mut form, validator)) = self
            .form
            .with_untracked(|p| p.as_ref().map(|p| (p.form.clone(), p.validator.clone())))
        else {
            return;
        };
        self.edit_form(|f| {
            f.checking = true;
            f.error = None;
        });
        match form.save(validator.as_deref()).await {
            Some(result) => self.settle_form(Some(result)),
            None => self.edit_form(|f| {
                f.checking = false;
                f.error = form.error.clone();
            }),
        }
    }

    async fn cancel_form(&self) {
        let Some(form) = self.form_snapshot() else {
            return;
        };
        if form.attempt_close(self).await {
            self.settle_form(None);
        }
    }
}

impl Default for ModalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl Notifier for ModalNotifier {
    async fn alert(&self, message: &str, title: &str, kind: NoticeKind) {
        let _ = self.ask(kind, title, message, NoticeMode::Alert).await;
    }

    async fn confirm(&self, message: &str, title: &str, kind: NoticeKind) -> bool {
        matches!(self.ask(kind, title, message, NoticeMode::Confirm).await, Ok(Some(_)))
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        self.ask(NoticeKind::Question, "Input", message, NoticeMode::Prompt(default.to_string()))
            .await
            .ok()
            .flatten()
    }
}

// ========================
// Views
// ========================

#[component]
pub fn ModalHost() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let notifier = ctx.notifier;

    // Each modal is its own top-layer `<dialog>`; later ones stack above
    // an open classification dialog and above the form they interrupt.
    view! {
        <FormModal notifier=notifier />
        {move || notifier.front().map(|notice| view! { <NoticeModal notifier=notifier notice=notice /> })}
    }
}

/// `<dialog>` shown with `show_modal()` once mounted. Escape goes to
/// `on_escape`; the element itself only closes by unmounting.
#[component]
fn TopLayer(class: String, on_escape: Callback<()>, children: Children) -> impl IntoView {
    let dialog_ref = NodeRef::<html::Dialog>::new();
    Effect::new(move |_| {
        let Some(el) = dialog_ref.get() else {
            return;
        };
        if !el.open() {
            if let Err(e) = el.show_modal() {
                log::error!("could not show modal: {:?}", e);
            }
        }
    });

    let on_cancel = move |ev: web_sys::Event| {
        ev.prevent_default();
        on_escape.run(());
    };

    view! {
        <dialog node_ref=dialog_ref class=class on:cancel=on_cancel>
            {children()}
        </dialog>
    }
}

#[component]
fn NoticeModal(notifier: ModalNotifier, notice: NoticeView) -> impl IntoView {
    let id = notice.id;
    let initial = match &notice.mode {
        NoticeMode::Prompt(default) => default.clone(),
        _ => String::new(),
    };
    let (input, set_input) = signal(initial);
    let is_prompt = matches!(notice.mode, NoticeMode::Prompt(_));

    let accept = move || notifier.answer(id, Some(input.get_untracked()));
    let dismiss = move || notifier.answer(id, None);

    let buttons = match notice.mode {
        NoticeMode::Alert => view! {
            <button class="btn btn-primary" on:click=move |_| accept()>"OK"</button>
        }
        .into_any(),
        NoticeMode::Confirm => view! {
            <button class="btn btn-secondary" on:click=move |_| dismiss()>"No"</button>
            <button class="btn btn-primary" on:click=move |_| accept()>"Yes"</button>
        }
        .into_any(),
        NoticeMode::Prompt(_) => view! {
            <button class="btn btn-secondary" on:click=move |_| dismiss()>"Cancel"</button>
            <button class="btn btn-primary" on:click=move |_| accept()>"OK"</button>
        }
        .into_any(),
    };

    let on_escape = Callback::new(move |_| dismiss());

    view! {
        <TopLayer class=format!("modal notice {}", notice.kind.css_class()) on_escape=on_escape>
            <div role="alertdialog">
                <div class="modal-header">
                    <span class="notice-icon">{notice.kind.icon()}</span>
                    <h3>{notice.title}</h3>
                </div>
                <p class="notice-message">{notice.message}</p>
                <Show when=move || is_prompt>
                    <input
                        type="text"
                        class="notice-input"
                        prop:value=input
                        on:input=move |ev| set_input.set(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| {
                            match ev.key().as_str() {
                                "Enter" => accept(),
                                "Escape" => dismiss(),
                                _ => {}
                            }
                        }
                    />
                </Show>
                <div class="modal-footer">{buttons}</div>
            </div>
        </TopLayer>
    }
}

fn field_label(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[component]
fn FormModal(notifier: ModalNotifier) -> impl IntoView {
    // Rebuild only when a different form is shown, not on every keystroke
    move || {
        notifier.form_id()?;
        let form = notifier.form_snapshot()?;
        let names: Vec<String> = form.fields.keys().cloned().collect();

        let fields = names
            .into_iter()
            .map(|name| {
                let label = field_label(&name);
                let value_name = name.clone();
                let value = move || {
                    notifier
                        .form
                        .with(|p| p.as_ref().map(|p| p.form.field(&value_name).to_string()))
                        .unwrap_or_default()
                };
                let on_input = move |ev: web_sys::Event| {
                    let text = event_target_value(&ev);
                    notifier.edit_form(|f| f.set_field(&name, text));
                };
                view! {
                    <label class="form-field">
                        <span>{label}</span>
                        <input type="text" prop:value=value on:input=on_input />
                    </label>
                }
            })
            .collect_view();

        let error = move || notifier.form.with(|p| p.as_ref().and_then(|p| p.form.error.clone()));
        let checking = move || notifier.form.with(|p| p.as_ref().is_some_and(|p| p.form.checking));
        let save_label = form.save_label.clone();
        let on_escape = Callback::new(move |_| spawn_local(async move { notifier.cancel_form().await }));

        Some(view! {
            <TopLayer class="modal form-dialog".to_string() on_escape=on_escape>
                <div role="dialog">
                    <div class="modal-header">
                        <h3>{form.title.clone()}</h3>
                        <button class="modal-close" on:click=move |_| spawn_local(async move { notifier.cancel_form().await })>
                            "×"
                        </button>
                    </div>
                    <div class="modal-body">
                        {fields}
                        {move || error().map(|e| view! { <div class="form-error">{e}</div> })}
                    </div>
                    <div class="modal-footer">
                        <button
                            class="btn btn-secondary"
                            on:click=move |_| spawn_local(async move { notifier.cancel_form().await })
                        >
                            {form.cancel_label.clone()}
                        </button>
                        <button
                            class="btn btn-primary"
                            disabled=checking
                            on:click=move |_| spawn_local(async move { notifier.save_form().await })
                        >
                            {move || if checking() { "Checking...".to_string() } else { save_label.clone() }}
                        </button>
                    </div>
                </div>
            </TopLayer>
        })
    }
}
