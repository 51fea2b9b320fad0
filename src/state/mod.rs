use crate::api::ApiClient;
use crate::nav::NavState;
use leptos::prelude::*;

pub(crate) mod controller;

pub(crate) use controller::NavController;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Single source of truth for what is on screen. Written only by `NavController`.
    pub nav: RwSignal<NavState>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_env()),
            nav: RwSignal::new(NavState::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
