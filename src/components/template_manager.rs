use classify_core::{FormDialog, NoticeKind, Notifier, TemplateChoice, TemplateId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;
use crate::widget::ClassifyWidget;

/// Template ("plantilla") selector: apply a saved layout, or save the
/// current one when the widget allows it.
#[component]
pub fn TemplateBar(widget: ClassifyWidget) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let can_save = widget.options().can_save_templates;
    let (chosen, set_chosen) = signal(String::new());

    let choices = move || widget.templates.with(|book| book.options());
    let description = move || {
        let id = chosen.get();
        choices()
            .into_iter()
            .find(|c| c.id.as_str() == id)
            .map(|c| c.description)
            .unwrap_or_default()
    };

    let on_apply = move |_: web_sys::MouseEvent| {
        let id = chosen.get_untracked();
        if !id.is_empty() {
            widget.apply_template(&TemplateId::new(id));
        }
    };

    let on_new = move |_: web_sys::MouseEvent| {
        spawn_local(async move {
            let form = FormDialog::new("Guardar plantilla")
                .with_field("name", "")
                .with_field("description", "");
            let Some(answer) = ctx.notifier.form(form, None).await else {
                return;
            };
            let name = answer.data.get("name").cloned().unwrap_or_default();
            let description = answer.data.get("description").cloned().unwrap_or_default();
            let api = ctx.api();
            if let Some(template) = widget.save_template(&name, &description, &api, &ctx.notifier).await {
                set_chosen.set(template.id.to_string());
                let message = format!("Classification \"{}\" saved successfully!", template.name);
                ctx.notifier.alert(&message, "Notice", NoticeKind::Success).await;
            }
        });
    };

    view! {
        <div class="oc-classification-manager">
            <div class="oc-manager-group">
                <div>
                    <select
                        class="oc-manager-select"
                        prop:value=chosen
                        on:change=move |ev| set_chosen.set(event_target_value(&ev))
                    >
                        <option value="">"Seleccione plantilla ..."</option>
                        <For
                            each=choices
                            key=|c| c.id.clone()
                            children=move |c: TemplateChoice| {
                                view! {
                                    <option value=c.id.to_string() title=c.description.clone()>
                                        {c.name.clone()}
                                    </option>
                                }
                            }
                        />
                    </select>
                    " "
                    <button
                        class="oc-manager-btn load"
                        type="button"
                        disabled=move || chosen.with(String::is_empty)
                        on:click=on_apply
                    >
                        "Aplicar Plantilla"
                    </button>
                    {can_save
                        .then(|| {
                            view! {
                                <button class="oc-manager-btn save" type="button" on:click=on_new>
                                    "New"
                                </button>
                            }
                        })}
                </div>
                <div class="oc-manager-description">{description}</div>
            </div>
        </div>
    }
}
