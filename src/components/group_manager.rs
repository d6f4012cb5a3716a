use classify_core::{CategoryId, Group, GroupId};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;
use crate::widget::ClassifyWidget;

fn chosen<T: From<String>>(value: String) -> Option<T> {
    (!value.is_empty()).then(|| T::from(value))
}

/// Pick a group, pick a category, move every member there.
/// An editable root widget also offers "Manage Groups".
#[component]
pub fn GroupBar(widget: ClassifyWidget) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let options = widget.options();
    let plural = options.item_name_plural.clone();
    let categories = widget.with_untracked(|c| c.categories().to_vec());
    let selection = widget.selection;

    let on_group = move |ev: web_sys::Event| {
        let group: Option<GroupId> = chosen(event_target_value(&ev));
        selection.update(|s| s.choose_group(group));
    };
    let on_target = move |ev: web_sys::Event| {
        let target: Option<CategoryId> = chosen(event_target_value(&ev));
        selection.update(|s| s.choose_target(target));
    };
    let on_apply = move |_: web_sys::MouseEvent| {
        spawn_local(async move {
            let api = ctx.api();
            widget.apply_group(&api, &ctx.notifier).await;
        });
    };
    let on_manage = move |_: web_sys::MouseEvent| {
        spawn_local(async move {
            widget.create_composite_group(&ctx.notifier).await;
        });
    };

    let group_value = move || selection.with(|s| s.group.as_ref().map(ToString::to_string).unwrap_or_default());
    let target_value = move || selection.with(|s| s.target.as_ref().map(ToString::to_string).unwrap_or_default());

    view! {
        <div class="oc-group-section">
            <div class="oc-group-controls">
                <div class="oc-group-control">
                    <label>"Grupos de "</label>
                    <select class="oc-group-select" prop:value=group_value on:change=on_group>
                        <option value="">"Seleccione grupo..."</option>
                        <For
                            each=move || widget.groups.get()
                            key=|g| g.id.clone()
                            children=move |g: Group| {
                                let text = format!("{} ({} {})", g.name, g.item_count, plural);
                                view! { <option value=g.id.to_string()>{text}</option> }
                            }
                        />
                    </select>
                </div>
                <div class="oc-group-control">
                    <label>"Ponlos en"</label>
                    <select
                        class="oc-group-target-select"
                        prop:value=target_value
                        disabled=move || !selection.with(|s| s.target_enabled())
                        on:change=on_target
                    >
                        <option value="">"Ponerlos en..."</option>
                        {categories
                            .into_iter()
                            .map(|c| view! { <option value=c.id.to_string()>{c.heading().to_string()}</option> })
                            .collect_view()}
                    </select>
                </div>
                <div class="oc-group-control">
                    <label>" "</label>
                    <button
                        class="oc-group-btn"
                        type="button"
                        disabled=move || !selection.with(|s| s.apply_enabled())
                        on:click=on_apply
                    >
                        {move || if selection.with(|s| s.busy) { "..." } else { "¡Ponlos!" }}
                    </button>
                </div>
                {options
                    .manage_groups_enabled()
                    .then(|| {
                        view! {
                            <div class="oc-group-control">
                                <label>" "</label>
                                <button class="oc-btn" type="button" on:click=on_manage>
                                    "Manage Groups"
                                </button>
                            </div>
                        }
                    })}
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_choice_is_none() {
        assert_eq!(chosen::<GroupId>(String::new()), None);
        assert_eq!(chosen::<GroupId>("g1".to_string()), Some(GroupId::from("g1")));
    }
}
