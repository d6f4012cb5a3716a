use classify_core::{Category, CategoryId, ClassifyOptions};
use leptos::prelude::*;
use leptos_dragdrop::{make_on_list_mouseenter, make_on_mouseleave};

use crate::components::ItemCard;
use crate::widget::ClassifyWidget;

/// Button moving every visible item of this column to a neighbour
#[component]
fn NavButton(widget: ClassifyWidget, from: CategoryId, to: Category, left: bool) -> impl IntoView {
    let target = to.id.clone();
    let on_click = move |_: web_sys::MouseEvent| widget.move_visible(&from, &target);
    view! {
        <button class="oc-nav-btn" type="button" on:click=on_click>
            {if left { format!("← {}", to.label) } else { format!("{} →", to.label) }}
        </button>
    }
}

fn counter_suffix(options: &ClassifyOptions) -> String {
    format!(" {}", options.item_name_plural)
}

#[component]
pub fn CategoryColumn(widget: ClassifyWidget, category: Category) -> impl IntoView {
    let dnd = widget.dnd;
    let options = widget.options();
    let id = category.id.clone();
    let list = id.to_string();
    let (left, right) = widget.with_untracked(|c| {
        let (left, right) = c.neighbours(&id);
        (left.cloned(), right.cloned())
    });

    let count = {
        let id = id.clone();
        Memo::new(move |_| widget.with(|c| c.counters().count(&id)))
    };
    // Hidden items stay mounted so indices match the lane
    let entries = {
        let id = id.clone();
        Memo::new(move |_| {
            widget.with(|c| {
                c.lane(&id)
                    .iter()
                    .cloned()
                    .enumerate()
                    .collect::<Vec<_>>()
            })
        })
    };
    let hovered = {
        let list = list.clone();
        move || dnd.is_target_list(&list)
    };

    let suffix = counter_suffix(&options);
    let navigation = if options.editable {
        let sort_id = id.clone();
        view! {
            <div class="oc-column-navigation">
                {left.map(|to| view! { <NavButton widget=widget from=id.clone() to=to left=true /> })}
                <div class="oc-counter">
                    <span class="count">{count}</span>
                    {suffix.clone()}
                </div>
                <button
                    class="oc-sort-btn"
                    type="button"
                    title="Ordena alfabéticamente A-Z"
                    on:click=move |_| widget.sort_category(&sort_id)
                >
                    "Ordena"
                </button>
                {right.map(|to| view! { <NavButton widget=widget from=id.clone() to=to left=false /> })}
            </div>
        }
        .into_any()
    } else {
        view! {
            <div class="oc-column-navigation">
                <div class="oc-counter">
                    <span class="count">{count}</span>
                    {suffix.clone()}
                </div>
            </div>
        }
        .into_any()
    };

    let card_list = list.clone();
    view! {
        <div class="oc-column" class:oc-drop-target=hovered>
            <div class="oc-column-header">
                <div class="oc-column-title">{category.heading().to_string()}</div>
            </div>
            {navigation}
            <div
                class="oc-items-list"
                data-classification=list.clone()
                on:mouseenter=make_on_list_mouseenter(dnd, list.clone())
                on:mouseleave=make_on_mouseleave(dnd)
            >
                <For
                    each=move || entries.get()
                    key=|entry| entry.clone()
                    children=move |(index, item)| {
                        view! { <ItemCard widget=widget item=item list=card_list.clone() index=index /> }
                    }
                />
            </div>
        </div>
    }
}
