use crate::models::{Document, Entry, Favorite, Section, Template};
use crate::nav::model::{
    EntrySlot, Loadable, NavState, SaveTracker, SectionView, TemplateView, View,
};
use crate::tree::{build_section_tree, find_node};

/// Everything that can move the navigation state: user intents and request completions.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NavEvent {
    // User
    /// Initial load of the template list.
    Start,
    SelectTemplate(Template),
    SelectSection(Section),
    /// Leave the current level (section → template → list).
    Back,
    /// Full editor document after a user edit.
    ContentChanged(Document),
    ToggleFavorite,
    ToggleFavoritesView,

    // Completions
    TemplatesLoaded(Vec<Template>),
    TemplatesFailed,
    SectionsLoaded {
        template_id: String,
        visit: u64,
        sections: Vec<Section>,
    },
    SectionsFailed {
        template_id: String,
        visit: u64,
    },
    /// `entry` is `None` when the section has no entry yet.
    EntryLoaded {
        section_id: String,
        visit: u64,
        entry: Option<Entry>,
    },
    EntryFailed {
        section_id: String,
        visit: u64,
    },
    EntrySaved {
        section_id: String,
        visit: u64,
        seq: u64,
        entry: Entry,
    },
    SaveFailed {
        section_id: String,
        visit: u64,
        seq: u64,
    },
    FavoriteUpdated {
        section_id: String,
        visit: u64,
        entry: Entry,
    },
    FavoriteFailed,
    FavoritesLoaded(Vec<Favorite>),
    FavoritesFailed,
}

/// Side effects requested by a transition. Executed by the controller.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Command {
    FetchTemplates,
    FetchSections {
        template_id: String,
        visit: u64,
    },
    FetchEntry {
        section_id: String,
        visit: u64,
    },
    SaveEntry {
        section_id: String,
        visit: u64,
        seq: u64,
        content: Document,
    },
    SetFavorite {
        section_id: String,
        visit: u64,
        entry_id: String,
        is_favorite: bool,
    },
    FetchFavorites,
}

/// Result of one transition.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Step {
    pub state: NavState,
    pub commands: Vec<Command>,
    /// False when the state is observably the same; the controller then skips the
    /// signal write so nothing downstream re-renders.
    pub changed: bool,
}

impl Step {
    fn unchanged(state: NavState) -> Self {
        Self {
            state,
            commands: Vec::new(),
            changed: false,
        }
    }

    fn changed(state: NavState) -> Self {
        Self {
            state,
            commands: Vec::new(),
            changed: true,
        }
    }

    fn with(mut self, cmd: Command) -> Self {
        self.commands.push(cmd);
        self
    }
}

fn live_section<'a>(
    state: &'a mut NavState,
    section_id: &str,
    visit: u64,
) -> Option<&'a mut SectionView> {
    match &mut state.view {
        View::SectionOpen(sv) if sv.section.id == section_id && sv.visit == visit => Some(sv),
        _ => None,
    }
}

fn live_template<'a>(
    state: &'a mut NavState,
    template_id: &str,
    visit: u64,
) -> Option<&'a mut TemplateView> {
    let tv = match &mut state.view {
        View::TemplateOpen(tv) => tv,
        View::SectionOpen(sv) => &mut sv.template,
        View::Browsing => return None,
    };
    (tv.template.id == template_id && tv.visit == visit).then_some(tv)
}

/// Pure transition function.
pub(crate) fn update(state: NavState, event: NavEvent) -> Step {
    let mut state = state;

    match event {
        NavEvent::Start => {
            state.templates = Loadable::Loading;
            Step::changed(state).with(Command::FetchTemplates)
        }

        NavEvent::SelectTemplate(template) => {
            let template_id = template.id.clone();
            let visit = state.next_visit();
            // Any open section (and its entry / pending saves) is dropped here.
            state.view = View::TemplateOpen(TemplateView::loading(template, visit));
            Step::changed(state).with(Command::FetchSections { template_id, visit })
        }

        NavEvent::SelectSection(section) => {
            let View::TemplateOpen(tv) = &state.view else {
                return Step::unchanged(state);
            };
            // Only sections of the open template are selectable.
            let known = tv
                .sections
                .ready()
                .map(|nodes| find_node(nodes, &section.id).is_some())
                .unwrap_or(false);
            if !known {
                return Step::unchanged(state);
            }

            let section_id = section.id.clone();
            let template = tv.clone();
            let visit = state.next_visit();
            state.view = View::SectionOpen(SectionView {
                template,
                section,
                visit,
                entry: EntrySlot::Loading,
                save: SaveTracker::default(),
            });
            Step::changed(state).with(Command::FetchEntry { section_id, visit })
        }

        NavEvent::Back => match std::mem::take(&mut state.view) {
            View::SectionOpen(sv) => {
                state.view = View::TemplateOpen(sv.template);
                Step::changed(state)
            }
            View::TemplateOpen(_) => {
                state.view = View::Browsing;
                Step::changed(state)
            }
            View::Browsing => Step::unchanged(state),
        },

        NavEvent::ContentChanged(content) => {
            let View::SectionOpen(sv) = &mut state.view else {
                return Step::unchanged(state);
            };
            // The editor is not mounted before the entry arrives.
            if matches!(sv.entry, EntrySlot::Loading) {
                return Step::unchanged(state);
            }

            let seq = sv.save.begin();
            let section_id = sv.section.id.clone();
            let visit = sv.visit;
            Step::changed(state).with(Command::SaveEntry {
                section_id,
                visit,
                seq,
                content,
            })
        }

        NavEvent::ToggleFavorite => {
            let View::SectionOpen(sv) = &state.view else {
                return Step::unchanged(state);
            };
            let Some(entry) = sv.entry.entry() else {
                return Step::unchanged(state);
            };

            let cmd = Command::SetFavorite {
                section_id: sv.section.id.clone(),
                visit: sv.visit,
                entry_id: entry.id.clone(),
                is_favorite: !entry.is_favorite,
            };
            Step::unchanged(state).with(cmd)
        }

        NavEvent::ToggleFavoritesView => {
            state.favorites.open = !state.favorites.open;
            if state.favorites.open {
                state.favorites.items = Loadable::Loading;
                Step::changed(state).with(Command::FetchFavorites)
            } else {
                Step::changed(state)
            }
        }

        NavEvent::TemplatesLoaded(templates) => {
            state.templates = Loadable::Ready(templates);
            Step::changed(state)
        }

        NavEvent::TemplatesFailed => {
            state.templates = Loadable::Failed;
            Step::changed(state)
        }

        NavEvent::SectionsLoaded {
            template_id,
            visit,
            sections,
        } => match live_template(&mut state, &template_id, visit) {
            Some(tv) => {
                tv.sections = Loadable::Ready(build_section_tree(&sections));
                Step::changed(state)
            }
            None => Step::unchanged(state),
        },

        NavEvent::SectionsFailed { template_id, visit } => {
            match live_template(&mut state, &template_id, visit) {
                Some(tv) => {
                    tv.sections = Loadable::Failed;
                    Step::changed(state)
                }
                None => Step::unchanged(state),
            }
        }

        NavEvent::EntryLoaded {
            section_id,
            visit,
            entry,
        } => match live_section(&mut state, &section_id, visit) {
            Some(sv) if matches!(sv.entry, EntrySlot::Loading) => {
                sv.entry = match entry {
                    Some(e) => EntrySlot::Present(e),
                    None => EntrySlot::Empty,
                };
                Step::changed(state)
            }
            _ => Step::unchanged(state),
        },

        NavEvent::EntryFailed { section_id, visit } => {
            match live_section(&mut state, &section_id, visit) {
                Some(sv) if matches!(sv.entry, EntrySlot::Loading) => {
                    sv.entry = EntrySlot::Empty;
                    Step::changed(state)
                }
                _ => Step::unchanged(state),
            }
        }

        NavEvent::EntrySaved {
            section_id,
            visit,
            seq,
            entry,
        } => {
            let Some(sv) = live_section(&mut state, &section_id, visit) else {
                return Step::unchanged(state);
            };

            let was_saving = sv.save.is_saving();
            let newest = sv.save.finish(seq);
            let mut changed = was_saving != sv.save.is_saving();

            if newest {
                let same_content = sv
                    .entry
                    .entry()
                    .map(|held| held.content == entry.content)
                    .unwrap_or(false);
                if !same_content {
                    sv.entry = EntrySlot::Present(entry);
                    changed = true;
                }
            }

            if changed {
                Step::changed(state)
            } else {
                Step::unchanged(state)
            }
        }

        NavEvent::SaveFailed {
            section_id,
            visit,
            seq: _,
        } => {
            let Some(sv) = live_section(&mut state, &section_id, visit) else {
                return Step::unchanged(state);
            };
            let was_saving = sv.save.is_saving();
            sv.save.fail();
            if was_saving != sv.save.is_saving() {
                Step::changed(state)
            } else {
                Step::unchanged(state)
            }
        }

        NavEvent::FavoriteUpdated {
            section_id,
            visit,
            entry,
        } => {
            // Only the flag is taken over; a save that landed meanwhile owns the content.
            let held = live_section(&mut state, &section_id, visit).map(|sv| &mut sv.entry);
            let flipped = match held {
                Some(EntrySlot::Present(held)) if held.is_favorite != entry.is_favorite => {
                    held.is_favorite = entry.is_favorite;
                    true
                }
                _ => false,
            };
            let step = if flipped {
                Step::changed(state)
            } else {
                Step::unchanged(state)
            };
            step.with(Command::FetchFavorites)
        }

        NavEvent::FavoriteFailed => Step::unchanged(state),

        NavEvent::FavoritesLoaded(items) => {
            state.favorites.items = Loadable::Ready(items);
            Step::changed(state)
        }

        NavEvent::FavoritesFailed => {
            state.favorites.items = Loadable::Failed;
            Step::changed(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Visit ids handed out by `template_open` / `section_open`.
    const T1_VISIT: u64 = 1;
    const SECTION_VISIT: u64 = 2;

    fn template(id: &str, name: &str) -> Template {
        Template {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            is_active: true,
        }
    }

    fn section(id: &str, title: &str, parent_id: Option<&str>) -> Section {
        Section {
            id: id.to_string(),
            title: title.to_string(),
            prompt: None,
            order_index: 0,
            parent_id: parent_id.map(|p| p.to_string()),
            template_id: Some("t1".to_string()),
        }
    }

    fn entry(id: &str, content: serde_json::Value, is_favorite: bool) -> Entry {
        Entry {
            id: id.to_string(),
            content: Document(content),
            is_favorite,
        }
    }

    fn t1_sections() -> Vec<Section> {
        vec![
            section("s1", "Intro", None),
            section("s2", "Detail", Some("s1")),
        ]
    }

    fn saved(visit: u64, seq: u64, e: Entry) -> NavEvent {
        NavEvent::EntrySaved {
            section_id: "s1".to_string(),
            visit,
            seq,
            entry: e,
        }
    }

    fn run(state: NavState, events: Vec<NavEvent>) -> NavState {
        events
            .into_iter()
            .fold(state, |s, ev| update(s, ev).state)
    }

    /// t1 open with sections s1 and s2 (child of s1).
    fn template_open() -> NavState {
        run(
            NavState::default(),
            vec![
                NavEvent::Start,
                NavEvent::TemplatesLoaded(vec![template("t1", "Roadmap A")]),
                NavEvent::SelectTemplate(template("t1", "Roadmap A")),
                NavEvent::SectionsLoaded {
                    template_id: "t1".to_string(),
                    visit: T1_VISIT,
                    sections: t1_sections(),
                },
            ],
        )
    }

    fn section_open(held: Option<Entry>) -> NavState {
        run(
            template_open(),
            vec![
                NavEvent::SelectSection(section("s1", "Intro", None)),
                NavEvent::EntryLoaded {
                    section_id: "s1".to_string(),
                    visit: SECTION_VISIT,
                    entry: held,
                },
            ],
        )
    }

    fn open_section(state: &NavState) -> &SectionView {
        match &state.view {
            View::SectionOpen(sv) => sv,
            other => panic!("expected SectionOpen, got {other:?}"),
        }
    }

    fn open_template(state: &NavState) -> &TemplateView {
        match &state.view {
            View::TemplateOpen(tv) => tv,
            other => panic!("expected TemplateOpen, got {other:?}"),
        }
    }

    #[test]
    fn test_start_fetches_templates() {
        let step = update(NavState::default(), NavEvent::Start);
        assert_eq!(step.state.templates, Loadable::Loading);
        assert_eq!(step.commands, vec![Command::FetchTemplates]);
    }

    #[test]
    fn test_inactive_templates_are_listed() {
        let mut archived = template("t2", "Old roadmap");
        archived.is_active = false;
        let state = run(
            NavState::default(),
            vec![
                NavEvent::Start,
                NavEvent::TemplatesLoaded(vec![template("t1", "Roadmap A"), archived]),
            ],
        );
        let ids: Vec<&str> = state
            .templates
            .ready()
            .map(|list| list.iter().map(|t| t.id.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_select_template_builds_tree_from_sections() {
        let state = template_open();
        let tv = open_template(&state);

        let roots = tv.sections.ready().expect("sections should be loaded");
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id(), "s1");
        assert_eq!(roots[0].children.len(), 1);
        assert_eq!(roots[0].children[0].id(), "s2");
    }

    #[test]
    fn test_select_template_issues_section_fetch() {
        let step = update(
            NavState::default(),
            NavEvent::SelectTemplate(template("t1", "Roadmap A")),
        );
        assert_eq!(
            step.commands,
            vec![Command::FetchSections {
                template_id: "t1".to_string(),
                visit: T1_VISIT,
            }]
        );
        assert_eq!(open_template(&step.state).template.id, "t1");
    }

    #[test]
    fn test_selecting_template_clears_section_and_entry() {
        let state = section_open(Some(entry("e1", json!({"blocks": []}), false)));
        assert_eq!(open_section(&state).section.id, "s1");

        let step = update(state, NavEvent::SelectTemplate(template("t2", "Roadmap B")));
        let tv = open_template(&step.state);
        assert_eq!(tv.template.id, "t2");
        assert_eq!(tv.sections, Loadable::Loading);
    }

    #[test]
    fn test_back_from_template_discards_sections() {
        let step = update(template_open(), NavEvent::Back);
        assert_eq!(step.state.view, View::Browsing);
        assert!(step.changed);
    }

    #[test]
    fn test_back_from_section_keeps_tree_and_drops_entry() {
        let state = section_open(Some(entry("e1", json!({"blocks": []}), false)));
        let step = update(state, NavEvent::Back);

        let tv = open_template(&step.state);
        assert_eq!(tv.sections.ready().map(|n| n.len()), Some(1));
    }

    #[test]
    fn test_back_on_template_list_is_noop() {
        let step = update(NavState::default(), NavEvent::Back);
        assert!(!step.changed);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn test_select_nested_section_fetches_entry() {
        let step = update(
            template_open(),
            NavEvent::SelectSection(section("s2", "Detail", Some("s1"))),
        );
        assert_eq!(
            step.commands,
            vec![Command::FetchEntry {
                section_id: "s2".to_string(),
                visit: SECTION_VISIT,
            }]
        );
        assert_eq!(open_section(&step.state).entry, EntrySlot::Loading);
    }

    #[test]
    fn test_select_unknown_section_is_ignored() {
        let step = update(
            template_open(),
            NavEvent::SelectSection(section("other", "Other", None)),
        );
        assert!(!step.changed);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn test_missing_entry_yields_empty_content() {
        let state = section_open(None);
        let sv = open_section(&state);
        assert_eq!(sv.entry, EntrySlot::Empty);
        assert_eq!(sv.entry.document(), Some(Document::empty()));
    }

    #[test]
    fn test_failed_entry_fetch_still_opens_editor() {
        let state = run(
            template_open(),
            vec![
                NavEvent::SelectSection(section("s1", "Intro", None)),
                NavEvent::EntryFailed {
                    section_id: "s1".to_string(),
                    visit: SECTION_VISIT,
                },
            ],
        );
        assert_eq!(open_section(&state).entry, EntrySlot::Empty);
    }

    #[test]
    fn test_entry_for_other_section_is_ignored() {
        let state = run(
            template_open(),
            vec![NavEvent::SelectSection(section("s1", "Intro", None))],
        );
        let step = update(
            state,
            NavEvent::EntryLoaded {
                section_id: "s2".to_string(),
                visit: SECTION_VISIT,
                entry: Some(entry("e2", json!({"blocks": []}), false)),
            },
        );
        assert!(!step.changed);
        assert_eq!(open_section(&step.state).entry, EntrySlot::Loading);
    }

    #[test]
    fn test_entry_from_earlier_visit_of_same_section_is_ignored() {
        let state = run(
            template_open(),
            vec![
                NavEvent::SelectSection(section("s1", "Intro", None)),
                NavEvent::Back,
                NavEvent::SelectSection(section("s1", "Intro", None)),
            ],
        );
        let reopened = open_section(&state).visit;
        assert_ne!(reopened, SECTION_VISIT);

        let step = update(
            state,
            NavEvent::EntryLoaded {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                entry: Some(entry("e1", json!({"blocks": [{"type": "paragraph"}]}), false)),
            },
        );
        assert!(!step.changed);
        assert_eq!(open_section(&step.state).entry, EntrySlot::Loading);

        let step = update(
            step.state,
            NavEvent::EntryLoaded {
                section_id: "s1".to_string(),
                visit: reopened,
                entry: None,
            },
        );
        assert_eq!(open_section(&step.state).entry, EntrySlot::Empty);
    }

    #[test]
    fn test_stale_sections_response_is_ignored() {
        let state = run(
            NavState::default(),
            vec![
                NavEvent::SelectTemplate(template("t1", "Roadmap A")),
                NavEvent::SelectTemplate(template("t2", "Roadmap B")),
            ],
        );
        let step = update(
            state,
            NavEvent::SectionsLoaded {
                template_id: "t1".to_string(),
                visit: T1_VISIT,
                sections: vec![section("s1", "Intro", None)],
            },
        );
        assert!(!step.changed);
        assert_eq!(open_template(&step.state).sections, Loadable::Loading);
    }

    #[test]
    fn test_sections_from_earlier_visit_of_same_template_are_ignored() {
        let state = run(
            NavState::default(),
            vec![
                NavEvent::SelectTemplate(template("t1", "Roadmap A")),
                NavEvent::SelectTemplate(template("t2", "Roadmap B")),
                NavEvent::SelectTemplate(template("t1", "Roadmap A")),
            ],
        );
        let reopened = open_template(&state).visit;
        assert_ne!(reopened, T1_VISIT);

        let step = update(
            state,
            NavEvent::SectionsFailed {
                template_id: "t1".to_string(),
                visit: T1_VISIT,
            },
        );
        assert!(!step.changed);
        assert_eq!(open_template(&step.state).sections, Loadable::Loading);

        let step = update(
            step.state,
            NavEvent::SectionsLoaded {
                template_id: "t1".to_string(),
                visit: reopened,
                sections: t1_sections(),
            },
        );
        assert_eq!(
            open_template(&step.state).sections.ready().map(|n| n.len()),
            Some(1)
        );
    }

    #[test]
    fn test_edit_issues_put_with_exact_content() {
        let held = entry("e1", json!({"blocks": []}), false);
        let edited = Document(json!({"blocks": [{"type": "paragraph", "data": {"text": "hi"}}]}));

        let step = update(section_open(Some(held)), NavEvent::ContentChanged(edited.clone()));

        assert_eq!(
            step.commands,
            vec![Command::SaveEntry {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                seq: 1,
                content: edited,
            }]
        );
        assert!(open_section(&step.state).save.is_saving());
    }

    #[test]
    fn test_save_response_with_new_content_replaces_entry() {
        let held = entry("e1", json!({"blocks": []}), false);
        let edited = json!({"blocks": [{"type": "paragraph", "data": {"text": "hi"}}]});

        let state = update(
            section_open(Some(held)),
            NavEvent::ContentChanged(Document(edited.clone())),
        )
        .state;
        let step = update(state, saved(SECTION_VISIT, 1, entry("e1", edited.clone(), false)));

        assert!(step.changed);
        let sv = open_section(&step.state);
        assert_eq!(sv.entry.document(), Some(Document(edited)));
        assert!(!sv.save.is_saving());
    }

    #[test]
    fn test_save_response_with_identical_content_leaves_entry_untouched() {
        let content = json!({"blocks": [{"type": "paragraph", "data": {"text": "hi"}}]});
        let held = entry("e1", content.clone(), true);

        // Two edits in flight; the first one comes back with what we already hold.
        let state = run(
            section_open(Some(held.clone())),
            vec![
                NavEvent::ContentChanged(Document(content.clone())),
                NavEvent::ContentChanged(Document(content.clone())),
            ],
        );
        // Server copy differs only outside `content`.
        let step = update(state, saved(SECTION_VISIT, 1, entry("e1", content, false)));

        assert!(!step.changed, "deep-equal content must not touch the state");
        let sv = open_section(&step.state);
        assert_eq!(sv.entry, EntrySlot::Present(held));
        assert!(sv.save.is_saving());
    }

    #[test]
    fn test_last_identical_save_only_clears_indicator() {
        let content = json!({"blocks": []});
        let held = entry("e1", content.clone(), false);

        let state = update(
            section_open(Some(held.clone())),
            NavEvent::ContentChanged(Document(content.clone())),
        )
        .state;
        let step = update(state, saved(SECTION_VISIT, 1, entry("e1", content, false)));

        assert!(step.changed);
        let sv = open_section(&step.state);
        assert!(!sv.save.is_saving());
        assert_eq!(sv.entry, EntrySlot::Present(held));
    }

    #[test]
    fn test_out_of_order_save_responses_keep_newest() {
        let first = json!({"blocks": [{"type": "paragraph", "data": {"text": "h"}}]});
        let second = json!({"blocks": [{"type": "paragraph", "data": {"text": "hi"}}]});

        let state = run(
            section_open(None),
            vec![
                NavEvent::ContentChanged(Document(first.clone())),
                NavEvent::ContentChanged(Document(second.clone())),
                saved(SECTION_VISIT, 2, entry("e1", second.clone(), false)),
                saved(SECTION_VISIT, 1, entry("e1", first, false)),
            ],
        );

        let sv = open_section(&state);
        assert_eq!(sv.entry.document(), Some(Document(second)));
        assert!(!sv.save.is_saving());
    }

    #[test]
    fn test_first_save_of_empty_section_stores_entry() {
        let content = json!({"blocks": [{"type": "header", "data": {"text": "Plan", "level": 2}}]});
        let state = run(
            section_open(None),
            vec![
                NavEvent::ContentChanged(Document(content.clone())),
                saved(SECTION_VISIT, 1, entry("e9", content, false)),
            ],
        );
        assert_eq!(
            open_section(&state).entry.entry().map(|e| e.id.as_str()),
            Some("e9")
        );
    }

    #[test]
    fn test_save_response_after_navigation_is_dropped() {
        let held = entry("e1", json!({"blocks": []}), false);
        let state = run(
            section_open(Some(held)),
            vec![
                NavEvent::ContentChanged(Document(json!({"blocks": [{"type": "paragraph"}]}))),
                NavEvent::Back,
                NavEvent::SelectSection(section("s2", "Detail", Some("s1"))),
            ],
        );
        let s2_visit = open_section(&state).visit;
        let state = update(
            state,
            NavEvent::EntryLoaded {
                section_id: "s2".to_string(),
                visit: s2_visit,
                entry: None,
            },
        )
        .state;

        let step = update(
            state,
            saved(SECTION_VISIT, 1, entry("e1", json!({"blocks": [{"type": "paragraph"}]}), false)),
        );

        assert!(!step.changed);
        let sv = open_section(&step.state);
        assert_eq!(sv.section.id, "s2");
        assert_eq!(sv.entry, EntrySlot::Empty);
    }

    #[test]
    fn test_save_from_earlier_visit_of_same_section_is_ignored() {
        let held = entry("e1", json!({"blocks": []}), false);
        let old_edit = json!({"blocks": [{"type": "paragraph", "data": {"text": "old"}}]});
        let new_edit = json!({"blocks": [{"type": "paragraph", "data": {"text": "new"}}]});

        // Edit, leave, come back and edit again before the first PUT returns.
        let state = run(
            section_open(Some(held.clone())),
            vec![
                NavEvent::ContentChanged(Document(old_edit.clone())),
                NavEvent::Back,
                NavEvent::SelectSection(section("s1", "Intro", None)),
            ],
        );
        let reopened = open_section(&state).visit;
        let state = run(
            state,
            vec![
                NavEvent::EntryLoaded {
                    section_id: "s1".to_string(),
                    visit: reopened,
                    entry: Some(held.clone()),
                },
                NavEvent::ContentChanged(Document(new_edit.clone())),
            ],
        );

        // Both visits used seq 1; only the visit tells them apart.
        let step = update(state, saved(SECTION_VISIT, 1, entry("e1", old_edit, false)));
        assert!(!step.changed);
        let sv = open_section(&step.state);
        assert!(sv.save.is_saving(), "older visit must not settle the new save");
        assert_eq!(sv.entry, EntrySlot::Present(held));

        let step = update(step.state, saved(reopened, 1, entry("e1", new_edit.clone(), false)));
        let sv = open_section(&step.state);
        assert!(!sv.save.is_saving());
        assert_eq!(sv.entry.document(), Some(Document(new_edit)));
    }

    #[test]
    fn test_save_failure_clears_saving_flag() {
        let state = update(
            section_open(None),
            NavEvent::ContentChanged(Document(json!({"blocks": []}))),
        )
        .state;
        let step = update(
            state,
            NavEvent::SaveFailed {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                seq: 1,
            },
        );
        assert!(step.changed);
        assert!(!open_section(&step.state).save.is_saving());
    }

    #[test]
    fn test_save_failure_from_earlier_visit_keeps_saving_flag() {
        let state = run(
            section_open(None),
            vec![
                NavEvent::ContentChanged(Document(json!({"blocks": []}))),
                NavEvent::Back,
                NavEvent::SelectSection(section("s1", "Intro", None)),
            ],
        );
        let reopened = open_section(&state).visit;
        let state = run(
            state,
            vec![
                NavEvent::EntryFailed {
                    section_id: "s1".to_string(),
                    visit: reopened,
                },
                NavEvent::ContentChanged(Document(json!({"blocks": []}))),
            ],
        );

        let step = update(
            state,
            NavEvent::SaveFailed {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                seq: 1,
            },
        );
        assert!(!step.changed);
        assert!(open_section(&step.state).save.is_saving());
    }

    #[test]
    fn test_edit_while_entry_loading_is_ignored() {
        let state = run(
            template_open(),
            vec![NavEvent::SelectSection(section("s1", "Intro", None))],
        );
        let step = update(state, NavEvent::ContentChanged(Document::empty()));
        assert!(step.commands.is_empty());
        assert!(!step.changed);
    }

    #[test]
    fn test_toggle_favorite_issues_patch_then_refreshes() {
        let held = entry("e1", json!({"blocks": []}), false);
        let step = update(section_open(Some(held)), NavEvent::ToggleFavorite);
        assert_eq!(
            step.commands,
            vec![Command::SetFavorite {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                entry_id: "e1".to_string(),
                is_favorite: true,
            }]
        );

        let step = update(
            step.state,
            NavEvent::FavoriteUpdated {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                entry: entry("e1", json!({"blocks": []}), true),
            },
        );
        assert!(step.changed);
        assert!(open_section(&step.state).entry.is_favorite());
        assert_eq!(step.commands, vec![Command::FetchFavorites]);
    }

    #[test]
    fn test_favorite_response_keeps_newer_saved_content() {
        let held = entry("e1", json!({"blocks": []}), false);
        let edited = json!({"blocks": [{"type": "paragraph", "data": {"text": "later"}}]});

        // The PATCH reply carries the content from before the edit.
        let state = run(
            section_open(Some(held)),
            vec![
                NavEvent::ToggleFavorite,
                NavEvent::ContentChanged(Document(edited.clone())),
                saved(SECTION_VISIT, 1, entry("e1", edited.clone(), false)),
            ],
        );
        let step = update(
            state,
            NavEvent::FavoriteUpdated {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                entry: entry("e1", json!({"blocks": []}), true),
            },
        );

        let sv = open_section(&step.state);
        assert!(sv.entry.is_favorite());
        assert_eq!(sv.entry.document(), Some(Document(edited)));
    }

    #[test]
    fn test_toggle_favorite_without_entry_is_noop() {
        let step = update(section_open(None), NavEvent::ToggleFavorite);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn test_favorite_response_after_leaving_still_refreshes_list() {
        let held = entry("e1", json!({"blocks": []}), false);
        let state = run(section_open(Some(held)), vec![NavEvent::Back]);

        let step = update(
            state,
            NavEvent::FavoriteUpdated {
                section_id: "s1".to_string(),
                visit: SECTION_VISIT,
                entry: entry("e1", json!({"blocks": []}), true),
            },
        );
        assert!(!step.changed);
        assert_eq!(step.commands, vec![Command::FetchFavorites]);
    }

    #[test]
    fn test_favorites_view_toggle() {
        let step = update(NavState::default(), NavEvent::ToggleFavoritesView);
        assert!(step.state.favorites.open);
        assert_eq!(step.state.favorites.items, Loadable::Loading);
        assert_eq!(step.commands, vec![Command::FetchFavorites]);

        let state = update(
            step.state,
            NavEvent::FavoritesLoaded(vec![Favorite {
                id: "e1".to_string(),
                content: Document::empty(),
                is_favorite: true,
                section_title: "Intro".to_string(),
            }]),
        )
        .state;
        assert_eq!(state.favorites.items.ready().map(|f| f.len()), Some(1));

        let step = update(state, NavEvent::ToggleFavoritesView);
        assert!(!step.state.favorites.open);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn test_templates_failure_is_recorded() {
        let state = run(NavState::default(), vec![NavEvent::Start, NavEvent::TemplatesFailed]);
        assert_eq!(state.templates, Loadable::Failed);
        assert_eq!(state.view, View::Browsing);
    }
}
