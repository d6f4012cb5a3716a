//! Classification Widget
//!
//! Reactive shell around a [`ClassifyDialog`]. The dialog is the only
//! copy of the classification: views read it through one local signal
//! and every user action comes back through a method here.

use std::rc::Rc;

use classify_core::{
    apply_resolved, report, report_error, Category, CategoryId, ClassificationResult, ClassifyDialog, ClassifyError,
    ClassifyOptions, ClassifyResult, Classifier, CompositeLookup, DialogButton, DialogFrame, DialogOptions,
    DialogOutcome, DialogSurface, FormDialog, FormValidator, Group, GroupLookup, GroupPicker, GroupSelection, Item,
    ItemId, LaneBinding, NoticeKind, Notifier, RequiredFields, Template, TemplateBook, TemplateId,
};
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{
    bind_global_mouseup, create_dnd_signals, DndSignals, DropEvent, GlobalListeners, SortableHandle, SortableOptions,
};

use crate::commands::Api;
use crate::components::ModalNotifier;

/// How long a button-moved item stays highlighted
const FLASH_MS: u32 = 200;

// ========================
// Surface
// ========================

struct SortableBinding(SortableHandle);

impl LaneBinding for SortableBinding {
    fn destroy(&mut self) {
        self.0.destroy();
    }
}

/// Publishes the frame to the `<dialog>` view and makes columns sortable
struct LeptosSurface {
    frame: RwSignal<Option<DialogFrame>>,
    dnd: DndSignals,
}

impl DialogSurface for LeptosSurface {
    fn mount(&mut self, frame: &DialogFrame) {
        let _ = self.frame.try_set(Some(frame.clone()));
    }

    fn bind_lane(&mut self, category: &CategoryId) -> Box<dyn LaneBinding> {
        Box::new(SortableBinding(self.dnd.registry.create(category.as_str())))
    }

    fn unmount(&mut self) {
        let _ = self.frame.try_set(None);
    }
}

// ========================
// Widget
// ========================

#[derive(Clone, Copy)]
pub struct ClassifyWidget {
    dialog: RwSignal<ClassifyDialog, LocalStorage>,
    frame: RwSignal<Option<DialogFrame>>,
    pub dnd: DndSignals,
    pub groups: RwSignal<Vec<Group>>,
    pub selection: RwSignal<GroupSelection>,
    pub templates: RwSignal<TemplateBook>,
    /// Composite group picker spawned by "Manage Groups"
    pub nested: RwSignal<Option<ClassifyWidget>, LocalStorage>,
    listeners: StoredValue<Option<GlobalListeners>, LocalStorage>,
}

impl ClassifyWidget {
    pub fn new(categories: Vec<Category>, items: Vec<Item>, options: ClassifyOptions) -> ClassifyResult<Self> {
        Ok(Self::from_dialog(ClassifyDialog::new(categories, items, options)?))
    }

    pub fn from_dialog(dialog: ClassifyDialog) -> Self {
        let options = dialog.classifier().options().clone();
        let widget = Self {
            dialog: RwSignal::new_local(dialog),
            frame: RwSignal::new(None),
            dnd: create_dnd_signals(SortableOptions::default()),
            groups: RwSignal::new(options.groups),
            selection: RwSignal::new(GroupSelection::default()),
            templates: RwSignal::new(TemplateBook::new(options.templates)),
            nested: RwSignal::new_local(None),
            listeners: StoredValue::new_local(None),
        };
        let listeners = bind_global_mouseup(widget.dnd, move |event| widget.on_drop(event));
        widget.listeners.set_value(Some(listeners));
        widget
    }

    /// Tracked read of the classifier
    pub fn with<R>(&self, f: impl FnOnce(&Classifier) -> R) -> R {
        self.dialog.with(|d| f(d.classifier()))
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&Classifier) -> R) -> R {
        self.dialog.with_untracked(|d| f(d.classifier()))
    }

    pub fn options(&self) -> ClassifyOptions {
        self.with_untracked(|c| c.options().clone())
    }

    /// Run a mutation; refusals are logged and yield `None`
    fn edit<R>(&self, f: impl FnOnce(&mut Classifier) -> ClassifyResult<R>) -> Option<R> {
        match self.dialog.try_update(|d| f(d.classifier_mut()))? {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("classification change refused: {}", e);
                None
            }
        }
    }

    // ========================
    // Lifecycle
    // ========================

    pub fn frame(&self) -> Option<DialogFrame> {
        self.frame.get()
    }

    pub fn is_open(&self) -> bool {
        self.frame.with(Option::is_some)
    }

    /// Show the dialog. The outcome resolves on Save, or with
    /// [`ClassifyError::Cancelled`] on any other close.
    pub fn open_dialog(&self, options: DialogOptions) -> ClassifyResult<DialogOutcome> {
        let surface = LeptosSurface {
            frame: self.frame,
            dnd: self.dnd,
        };
        self.selection.set(GroupSelection::default());
        self.dialog
            .try_update(|d| d.open(options, Box::new(surface)))
            .unwrap_or(Err(ClassifyError::Cancelled))
    }

    pub fn get_value(&self) -> ClassificationResult {
        self.dialog.try_with_untracked(ClassifyDialog::get_value).unwrap_or_default()
    }

    pub fn search(&self, term: &str) {
        self.dialog.update(|d| d.classifier_mut().search(term));
    }

    pub fn close_dialog(&self, save: bool) {
        let _ = self.dialog.try_update(|d| d.close(save));
    }

    pub fn press(&self, button: DialogButton) {
        let _ = self.dialog.try_update(|d| d.press(button));
    }

    /// Escape or backdrop close reported by the `<dialog>` element
    pub fn native_close(&self) {
        let _ = self.dialog.try_update(ClassifyDialog::native_close);
    }

    /// Cancel any open dialog (the picker included) and detach listeners
    pub fn dispose(&self) {
        if let Some(nested) = self.nested.try_update(Option::take).flatten() {
            nested.dispose();
        }
        self.close_dialog(false);
        self.listeners.update_value(|listeners| {
            if let Some(mut listeners) = listeners.take() {
                listeners.remove();
            }
        });
    }

    // ========================
    // Item moves
    // ========================

    fn on_drop(&self, event: DropEvent) {
        log::debug!("drop {} from {} into {} at {:?}", event.item, event.from, event.to, event.index);
        let item = ItemId::new(event.item);
        let target = CategoryId::new(event.to);
        self.edit(|c| c.drop_item(&item, &target, event.index));
    }

    /// Toolbar button: move and briefly highlight the item
    pub fn move_item(&self, item: &ItemId, target: &CategoryId) {
        if self.edit(|c| c.move_item(item, target, true)) == Some(true) {
            let widget = *self;
            spawn_local(async move {
                TimeoutFuture::new(FLASH_MS).await;
                let _ = widget.dialog.try_update(|d| d.classifier_mut().clear_flash());
            });
        }
    }

    pub fn move_visible(&self, from: &CategoryId, to: &CategoryId) {
        if let Some(moved) = self.edit(|c| c.move_visible(from, to)) {
            log::debug!("moved {} visible items from {} to {}", moved, from, to);
        }
    }

    pub fn sort_category(&self, category: &CategoryId) {
        self.edit(|c| c.sort_category(category));
    }

    // ========================
    // Groups
    // ========================

    /// "¡Ponlos!": move every member of the selected group into the target
    pub async fn apply_group<N: Notifier + ?Sized>(&self, api: &Api, notifier: &N) {
        if !self.with_untracked(Classifier::is_editable) {
            return;
        }
        let Some((group, target)) = self.selection.try_update(GroupSelection::begin).flatten() else {
            return;
        };

        let groups = self.groups.get_untracked();
        let lookup = CompositeLookup::new(&groups, api);
        let outcome = match lookup.group_items(&group).await {
            Ok(ids) => self
                .dialog
                .try_update(|d| apply_resolved(d.classifier_mut(), &ids, &target))
                .unwrap_or(Err(ClassifyError::Cancelled)),
            Err(e) => Err(e),
        };
        // Both selectors clear whether or not anything moved
        let _ = self.selection.try_update(GroupSelection::reset);

        if let Err(e) = outcome {
            report_error(notifier, &e).await;
        }
    }

    /// Ask for a name, let the user pick base groups in a nested picker,
    /// then append the composite group to this widget's group list.
    pub async fn create_composite_group(&self, notifier: &ModalNotifier) {
        if !self.with_untracked(|c| c.options().manage_groups_enabled()) {
            return;
        }
        let form = FormDialog::new("Nombre del grupo")
            .with_field("name", "")
            .with_field("description", "")
            .warn_if_dirty(true);
        let validator: Rc<dyn FormValidator> = Rc::new(RequiredFields::new().field("name", "Name"));
        let Some(answer) = notifier.form(form, Some(validator)).await else {
            return;
        };
        let name = answer.data.get("name").cloned().unwrap_or_default();
        let description = answer.data.get("description").cloned().unwrap_or_default();

        let picker = match GroupPicker::new(&self.groups.get_untracked()) {
            Ok(picker) => picker,
            Err(e) => return report_error(notifier, &e).await,
        };
        let nested = ClassifyWidget::from_dialog(picker.into_dialog());
        self.nested.set(Some(nested));

        let title = format!("Define Composite Group: {}", name.trim());
        let outcome = match nested.open_dialog(DialogOptions::titled(title)) {
            Ok(outcome) => outcome.await,
            Err(e) => Err(e),
        };
        nested.dispose();
        let _ = self.nested.try_set(None);

        match outcome.and_then(|value| GroupPicker::compose(&name, &description, &value)) {
            Ok(group) => {
                let message = format!(
                    "Composite group '{}' saved successfully with {} base group(s).",
                    group.name, group.item_count
                );
                self.groups.update(|groups| groups.push(group));
                notifier.alert(&message, "Notice", NoticeKind::Success).await;
            }
            Err(ClassifyError::Cancelled) => {
                log::info!("composite group creation cancelled");
                notifier
                    .alert("Composite group creation cancelled.", "Notice", NoticeKind::Info)
                    .await;
            }
            Err(e) => report_error(notifier, &e).await,
        }
    }

    // ========================
    // Templates
    // ========================

    pub fn apply_template(&self, id: &TemplateId) {
        let book = self.templates.get_untracked();
        if let Some(moved) = self.edit(|c| book.apply(c, id)) {
            log::info!("template {} moved {} items", id, moved);
        }
    }

    /// Snapshot the current classification. With `persist_templates` the
    /// backend assigns the id; otherwise it stays in this page.
    pub async fn save_template<N: Notifier + ?Sized>(
        &self,
        name: &str,
        description: &str,
        api: &Api,
        notifier: &N,
    ) -> Option<Template> {
        let persist = self.with_untracked(|c| c.options().persist_templates);
        let saved = if persist && !name.trim().is_empty() {
            let value = self.get_value();
            match api.save_template(name.trim(), description.trim(), &value).await {
                Ok(template) => {
                    self.templates.update(|book| book.push(template.clone()));
                    Ok(template)
                }
                Err(e) => {
                    report(notifier, &e).await;
                    return None;
                }
            }
        } else {
            let mut book = self.templates.get_untracked();
            let saved = self.with_untracked(|c| book.save_current(c, name, description));
            if saved.is_ok() {
                self.templates.set(book);
            }
            saved
        };

        match saved {
            Ok(template) => {
                log::info!("saved template {} ({})", template.name, template.id);
                Some(template)
            }
            Err(e) => {
                report_error(notifier, &e).await;
                None
            }
        }
    }
}
