use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Spinner,
};
use crate::components::SectionList;
use crate::editor::{ContentEditor, ContentViewer};
use crate::models::{Document, Section, Template};
use crate::nav::{Loadable, NavEvent, NavState, SectionView, View};
use crate::state::NavController;
use crate::tree::count_nodes;
use icons::ChevronLeft;
use leptos::prelude::*;

/// Which page is on screen. Pages are rebuilt only when this changes, so a new
/// section always gets a fresh editor and nothing else does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    TemplateList,
    Template(String),
    Section(String),
}

impl Screen {
    pub fn of(view: &View) -> Self {
        match view {
            View::Browsing => Self::TemplateList,
            View::TemplateOpen(tv) => Self::Template(tv.template.id.clone()),
            View::SectionOpen(sv) => Self::Section(sv.section.id.clone()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum SaveStatus {
    #[strum(serialize = "Saving...")]
    Saving,
    #[strum(serialize = "Saved")]
    Saved,
}

impl SaveStatus {
    pub fn from_saving(is_saving: bool) -> Self {
        if is_saving {
            Self::Saving
        } else {
            Self::Saved
        }
    }
}

pub(crate) fn favorite_label(is_favorite: bool) -> &'static str {
    if is_favorite {
        "★ Favorite"
    } else {
        "☆ Add to favorites"
    }
}

fn section_view<T>(state: &NavState, f: impl FnOnce(&SectionView) -> T) -> Option<T> {
    match &state.view {
        View::SectionOpen(sv) => Some(f(sv)),
        _ => None,
    }
}

#[component]
fn BackButton(#[prop(into)] label: Signal<String>) -> impl IntoView {
    let nav = expect_context::<NavController>();

    view! {
        <Button
            variant=ButtonVariant::Ghost
            size=ButtonSize::Sm
            class="-ml-2 text-muted-foreground"
            on:click=move |_| nav.dispatch(NavEvent::Back)
        >
            <ChevronLeft />
            {move || label.get()}
        </Button>
    }
}

#[component]
pub fn Workspace() -> impl IntoView {
    let nav = expect_context::<NavController>();
    let state = nav.state();

    // `dispatch` reads state untracked, so this runs once.
    Effect::new(move |_| nav.dispatch(NavEvent::Start));

    let screen = Memo::new(move |_| state.with(|s| Screen::of(&s.view)));

    view! {
        <main class="mx-auto flex min-h-screen max-w-3xl flex-col gap-6 px-4 py-8">
            {move || match screen.get() {
                Screen::TemplateList => view! { <TemplateListPage /> }.into_any(),
                Screen::Template(_) => view! { <TemplatePage /> }.into_any(),
                Screen::Section(_) => view! { <SectionPage /> }.into_any(),
            }}
        </main>
    }
}

#[component]
pub fn TemplateListPage() -> impl IntoView {
    let nav = expect_context::<NavController>();
    let state = nav.state();

    let templates = Memo::new(move |_| state.with(|s| s.templates.clone()));
    let favorites_open = Memo::new(move |_| state.with(|s| s.favorites.open));

    view! {
        <div class="flex items-center justify-between">
            <h1 class="text-xl font-semibold">"Roadmap templates"</h1>
            <Button
                variant=ButtonVariant::Outline
                size=ButtonSize::Sm
                on:click=move |_| nav.dispatch(NavEvent::ToggleFavoritesView)
            >
                {move || if favorites_open.get() { "Hide favorites" } else { "Show favorites" }}
            </Button>
        </div>

        <Show when=move || favorites_open.get() fallback=|| ().into_view()>
            <FavoritesPanel />
        </Show>

        {move || match templates.get() {
            Loadable::Idle | Loadable::Loading => view! {
                <div class="flex justify-center py-8"><Spinner /></div>
            }
            .into_any(),
            Loadable::Ready(list) if !list.is_empty() => view! {
                <div class="grid gap-3 sm:grid-cols-2">
                    {list.into_iter().map(|t| view! { <TemplateCard template=t /> }).collect_view()}
                </div>
            }
            .into_any(),
            _ => view! {
                <div class="py-8 text-sm text-muted-foreground">"No templates available."</div>
            }
            .into_any(),
        }}
    }
}

#[component]
fn TemplateCard(template: Template) -> impl IntoView {
    let nav = expect_context::<NavController>();
    let name = template.name.clone();
    let description = template.description.clone().filter(|d| !d.trim().is_empty());

    view! {
        <button
            type="button"
            class="text-left"
            on:click=move |_| nav.dispatch(NavEvent::SelectTemplate(template.clone()))
        >
            <Card class="h-full transition-colors hover:bg-accent/40">
                <CardHeader>
                    <CardTitle class="text-base">{name}</CardTitle>
                    {description.map(|d| view! { <CardDescription>{d}</CardDescription> })}
                </CardHeader>
            </Card>
        </button>
    }
}

#[component]
fn FavoritesPanel() -> impl IntoView {
    let nav = expect_context::<NavController>();
    let state = nav.state();
    let items = Memo::new(move |_| state.with(|s| s.favorites.items.clone()));

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">"Favorites"</CardTitle>
            </CardHeader>
            <CardContent>
                {move || match items.get() {
                    Loadable::Idle | Loadable::Loading => view! { <Spinner /> }.into_any(),
                    Loadable::Ready(list) if !list.is_empty() => view! {
                        <ul class="flex flex-col gap-4">
                            {list
                                .into_iter()
                                .map(|f| view! {
                                    <li class="flex flex-col gap-1">
                                        <div class="text-xs font-medium text-muted-foreground">
                                            {f.section_title}
                                        </div>
                                        <ContentViewer document=f.content />
                                    </li>
                                })
                                .collect_view()}
                        </ul>
                    }
                    .into_any(),
                    _ => view! {
                        <div class="text-sm text-muted-foreground">"No favorites yet."</div>
                    }
                    .into_any(),
                }}
            </CardContent>
        </Card>
    }
}

#[component]
pub fn TemplatePage() -> impl IntoView {
    let nav = expect_context::<NavController>();
    let state = nav.state();

    let template = Memo::new(move |_| {
        state.with(|s| match &s.view {
            View::TemplateOpen(tv) => Some(tv.template.clone()),
            _ => None,
        })
    });
    let sections = Memo::new(move |_| {
        state.with(|s| match &s.view {
            View::TemplateOpen(tv) => tv.sections.clone(),
            _ => Loadable::Idle,
        })
    });

    let on_select = Callback::new(move |section: Section| {
        nav.dispatch(NavEvent::SelectSection(section));
    });

    view! {
        <BackButton label="All templates".to_string() />

        {move || template.get().map(|t| view! {
            <div class="flex flex-col gap-1">
                <h1 class="text-xl font-semibold">{t.name}</h1>
                {t.description.map(|d| view! { <p class="text-sm text-muted-foreground">{d}</p> })}
            </div>
        })}

        {move || match sections.get() {
            Loadable::Idle | Loadable::Loading => view! {
                <div class="flex justify-center py-8"><Spinner /></div>
            }
            .into_any(),
            Loadable::Ready(nodes) if !nodes.is_empty() => {
                let total = count_nodes(&nodes);
                view! {
                    <div class="flex flex-col gap-2">
                        <div class="text-xs text-muted-foreground">{format!("{total} sections")}</div>
                        <SectionList nodes=nodes on_select=on_select />
                    </div>
                }
                .into_any()
            }
            _ => view! {
                <div class="py-8 text-sm text-muted-foreground">"This template has no sections."</div>
            }
            .into_any(),
        }}
    }
}

#[component]
pub fn SectionPage() -> impl IntoView {
    let nav = expect_context::<NavController>();
    let state = nav.state();

    let section = Memo::new(move |_| state.with(|s| section_view(s, |sv| sv.section.clone())));
    let template_name = Memo::new(move |_| {
        state
            .with(|s| section_view(s, |sv| sv.template.template.name.clone()))
            .unwrap_or_default()
    });
    let entry_ready = Memo::new(move |_| {
        state
            .with(|s| section_view(s, |sv| sv.entry.document().is_some()))
            .unwrap_or(false)
    });
    let has_entry = Memo::new(move |_| {
        state
            .with(|s| section_view(s, |sv| sv.entry.entry().is_some()))
            .unwrap_or(false)
    });
    let is_favorite = Memo::new(move |_| {
        state
            .with(|s| section_view(s, |sv| sv.entry.is_favorite()))
            .unwrap_or(false)
    });
    let status = Memo::new(move |_| {
        let saving = state
            .with(|s| section_view(s, |sv| sv.save.is_saving()))
            .unwrap_or(false);
        SaveStatus::from_saving(saving)
    });

    let on_change = Callback::new(move |doc: Document| {
        nav.dispatch(NavEvent::ContentChanged(doc));
    });

    view! {
        <BackButton label=Signal::derive(move || template_name.get()) />

        {move || section.get().map(|s| view! {
            <div class="flex flex-col gap-1">
                <h1 class="text-xl font-semibold">{s.title}</h1>
                {s.prompt.map(|p| view! { <p class="text-sm text-muted-foreground">{p}</p> })}
            </div>
        })}

        <div class="flex items-center justify-between">
            <span class="text-xs text-muted-foreground" aria-live="polite">
                {move || if entry_ready.get() { status.get().to_string() } else { String::new() }}
            </span>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Sm
                attr:disabled=move || !has_entry.get()
                on:click=move |_| nav.dispatch(NavEvent::ToggleFavorite)
            >
                {move || favorite_label(is_favorite.get())}
            </Button>
        </div>

        // Mounted once per section, after the entry fetch settled.
        {move || {
            if !entry_ready.get() {
                return view! { <div class="flex justify-center py-8"><Spinner /></div> }.into_any();
            }
            let document = state
                .with_untracked(|s| section_view(s, |sv| sv.entry.document()))
                .flatten()
                .unwrap_or_else(Document::empty);
            view! { <ContentEditor document=document on_change=on_change /> }.into_any()
        }}
    }
}
