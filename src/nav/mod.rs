//! Navigation state machine: template list → template → section.
//!
//! `update` is pure. It returns the next state and the requests to issue; the
//! controller in `state::controller` runs those requests and feeds their outcome
//! back in as events.

pub(crate) mod model;
mod update;

pub(crate) use model::{Loadable, NavState, SectionView, View};
pub(crate) use update::{update, Command, NavEvent, Step};
