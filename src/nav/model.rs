use crate::models::{Document, Entry, Favorite, Section, SectionNode, Template};

/// Remote data as the views see it.
#[derive(Clone, Debug, PartialEq, Default)]
pub(crate) enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed,
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// A template with its section tree (once fetched).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TemplateView {
    pub template: Template,
    /// Visit that issued the section fetch.
    pub visit: u64,
    pub sections: Loadable<Vec<SectionNode>>,
}

impl TemplateView {
    pub fn loading(template: Template, visit: u64) -> Self {
        Self {
            template,
            visit,
            sections: Loadable::Loading,
        }
    }
}

/// Content slot of the open section.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum EntrySlot {
    Loading,
    /// No entry stored for this section yet.
    Empty,
    Present(Entry),
}

impl EntrySlot {
    /// Document to mount the editor with. `None` until the fetch finished.
    pub fn document(&self) -> Option<Document> {
        match self {
            Self::Loading => None,
            Self::Empty => Some(Document::empty()),
            Self::Present(e) => Some(e.content.clone()),
        }
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Present(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.entry().map(|e| e.is_favorite).unwrap_or(false)
    }
}

/// Orders overlapping saves of one section.
///
/// Every edit takes the next sequence number. A completion is applied only when its
/// number is above the last applied one, so a slow response for an older edit cannot
/// overwrite a newer one.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub(crate) struct SaveTracker {
    next_seq: u64,
    applied_seq: u64,
    pending: u32,
}

impl SaveTracker {
    pub fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.pending += 1;
        self.next_seq
    }

    /// Returns true when `seq` is the newest completion seen so far.
    pub fn finish(&mut self, seq: u64) -> bool {
        self.pending = self.pending.saturating_sub(1);
        if seq > self.applied_seq {
            self.applied_seq = seq;
            true
        } else {
            false
        }
    }

    pub fn fail(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn is_saving(&self) -> bool {
        self.pending > 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SectionView {
    /// Where `Back` returns to.
    pub template: TemplateView,
    pub section: Section,
    /// Completions carry the visit they were issued for; a reopened section gets a
    /// fresh one, so replies addressed to an earlier opening are dropped.
    pub visit: u64,
    pub entry: EntrySlot,
    pub save: SaveTracker,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub(crate) enum View {
    #[default]
    Browsing,
    TemplateOpen(TemplateView),
    SectionOpen(SectionView),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub(crate) struct FavoritesPanel {
    pub open: bool,
    pub items: Loadable<Vec<Favorite>>,
}

/// Whole navigation state. Owned by the controller's signal; replaced wholesale on
/// every accepted event.
#[derive(Clone, Debug, PartialEq, Default)]
pub(crate) struct NavState {
    pub templates: Loadable<Vec<Template>>,
    pub view: View,
    pub favorites: FavoritesPanel,
    visits: u64,
}

impl NavState {
    /// Id for a newly opened template or section. Never reused.
    pub fn next_visit(&mut self) -> u64 {
        self.visits += 1;
        self.visits
    }
}
