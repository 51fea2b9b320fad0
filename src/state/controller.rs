use crate::api::ApiError;
use crate::nav::{update, Command, NavEvent, NavState, Step};
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn log_info(msg: &str) {
    web_sys::console::log_1(&format!("[nav] {msg}").into());
}

fn log_failure(what: &str, e: &ApiError) {
    web_sys::console::error_1(&format!("[nav] {what} failed ({:?}): {e}", e.kind).into());
}

/// Drives the navigation state machine.
///
/// Responsibilities:
/// - run `nav::update` for every event and publish the new state
/// - execute the returned commands against the backend
/// - turn each outcome (success or failure) back into an event
///
/// Non-responsibilities:
/// - deciding what an outcome means (that is `nav::update`)
#[derive(Clone, Copy)]
pub(crate) struct NavController {
    app_state: AppContext,
}

impl NavController {
    pub fn new(app_state: AppContext) -> Self {
        Self { app_state }
    }

    pub fn state(&self) -> RwSignal<NavState> {
        self.app_state.0.nav
    }

    pub fn dispatch(&self, event: NavEvent) {
        let nav = self.app_state.0.nav;
        let Step {
            state,
            commands,
            changed,
        } = update(nav.get_untracked(), event);

        // Unchanged steps must not notify; the section page would re-render for nothing.
        if changed {
            nav.set(state);
        }

        for cmd in commands {
            self.run(cmd);
        }
    }

    fn run(&self, cmd: Command) {
        let api_client = self.app_state.0.api_client.get_untracked();
        let s2 = *self;

        match cmd {
            Command::FetchTemplates => spawn_local(async move {
                match api_client.list_templates().await {
                    Ok(list) => {
                        log_info(&format!("loaded {} templates", list.len()));
                        s2.dispatch(NavEvent::TemplatesLoaded(list));
                    }
                    Err(e) => {
                        log_failure("list templates", &e);
                        s2.dispatch(NavEvent::TemplatesFailed);
                    }
                }
            }),

            Command::FetchSections { template_id, visit } => spawn_local(async move {
                match api_client.list_sections(&template_id).await {
                    Ok(sections) => s2.dispatch(NavEvent::SectionsLoaded {
                        template_id,
                        visit,
                        sections,
                    }),
                    Err(e) => {
                        log_failure("list sections", &e);
                        s2.dispatch(NavEvent::SectionsFailed { template_id, visit });
                    }
                }
            }),

            Command::FetchEntry { section_id, visit } => spawn_local(async move {
                match api_client.get_entry(&section_id).await {
                    Ok(entry) => s2.dispatch(NavEvent::EntryLoaded {
                        section_id,
                        visit,
                        entry,
                    }),
                    Err(e) => {
                        log_failure("get entry", &e);
                        s2.dispatch(NavEvent::EntryFailed { section_id, visit });
                    }
                }
            }),

            Command::SaveEntry {
                section_id,
                visit,
                seq,
                content,
            } => spawn_local(async move {
                match api_client.save_entry(&section_id, content).await {
                    Ok(entry) => s2.dispatch(NavEvent::EntrySaved {
                        section_id,
                        visit,
                        seq,
                        entry,
                    }),
                    Err(e) => {
                        log_failure("save entry", &e);
                        s2.dispatch(NavEvent::SaveFailed {
                            section_id,
                            visit,
                            seq,
                        });
                    }
                }
            }),

            Command::SetFavorite {
                section_id,
                visit,
                entry_id,
                is_favorite,
            } => spawn_local(async move {
                match api_client.set_favorite(&entry_id, is_favorite).await {
                    Ok(entry) => s2.dispatch(NavEvent::FavoriteUpdated {
                        section_id,
                        visit,
                        entry,
                    }),
                    Err(e) => {
                        log_failure("update favorite", &e);
                        s2.dispatch(NavEvent::FavoriteFailed);
                    }
                }
            }),

            Command::FetchFavorites => spawn_local(async move {
                match api_client.list_favorites().await {
                    Ok(items) => s2.dispatch(NavEvent::FavoritesLoaded(items)),
                    Err(e) => {
                        log_failure("list favorites", &e);
                        s2.dispatch(NavEvent::FavoritesFailed);
                    }
                }
            }),
        }
    }
}
