use std::sync::atomic::{AtomicUsize, Ordering};

// Element ids must stay valid as CSS selectors: no "/" and no leading digit.
const PREFIX: &str = "np";

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Page-unique element id such as `editor_np_7`. Editor.js locates its holder by id.
pub fn use_random_id_for(element: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{element}_{PREFIX}_{n}")
}
