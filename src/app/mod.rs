use crate::pages::Workspace;
use crate::state::{AppContext, AppState, NavController};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(NavController::new(AppContext(AppState::new())));

    // Navigation lives in `NavState`, not the URL; the router only serves the shell.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=Workspace />
            </Routes>
        </Router>
    }
}
