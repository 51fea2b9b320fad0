use crate::models::{Section, SectionNode};
use leptos::prelude::*;

const INDENT_PX: usize = 18;

pub(crate) fn indent_style(depth: usize) -> String {
    format!("padding-left: {}px", depth * INDENT_PX)
}

pub(crate) fn row_label(section: &Section) -> String {
    let title = section.title.trim();
    if title.is_empty() {
        "Untitled section".to_string()
    } else {
        title.to_string()
    }
}

/// Nested, clickable list of sections. Each level is indented one step further.
#[component]
pub fn SectionList(
    nodes: Vec<SectionNode>,
    #[prop(optional)] depth: usize,
    #[prop(into)] on_select: Callback<Section>,
) -> impl IntoView {
    let nodes_sv = StoredValue::new(nodes);

    view! {
        <ul class="space-y-0.5">
            <For
                // Ids are not guaranteed unique in the payload.
                each=move || nodes_sv.get_value().into_iter().enumerate()
                key=|(i, n)| (*i, n.section.id.clone())
                children=move |(_, node)| {
                    view! { <SectionRow node=node depth=depth on_select=on_select /> }
                }
            />
        </ul>
    }
}

#[component]
fn SectionRow(node: SectionNode, depth: usize, on_select: Callback<Section>) -> impl IntoView {
    let has_children = node.has_children();
    let SectionNode { section, children } = node;
    let label = row_label(&section);
    let prompt = section.prompt.clone().filter(|p| !p.trim().is_empty());
    let bullet = if has_children { "▾" } else { "•" };

    let children_view = if has_children {
        view! { <SectionList nodes=children depth=depth + 1 on_select=on_select /> }.into_any()
    } else {
        ().into_view().into_any()
    };

    view! {
        <li>
            <button
                type="button"
                class="flex w-full items-start gap-2 rounded-md py-1.5 pr-2 text-left text-sm hover:bg-accent hover:text-accent-foreground"
                style=indent_style(depth)
                on:click=move |_| on_select.run(section.clone())
            >
                <span class="mt-0.5 w-4 shrink-0 text-muted-foreground">{bullet}</span>
                <span class="flex flex-col">
                    <span class="font-medium">{label}</span>
                    {prompt.map(|p| view! { <span class="text-xs text-muted-foreground">{p}</span> })}
                </span>
            </button>
            {children_view}
        </li>
    }
}
