//! Content editor adapter.
//!
//! The block editor is a third-party JS component. Everything it needs goes
//! through `EditorEngine`, so pages only ever see `Document` values.
//!
//! An adapter instance reads its document once, when it mounts. It never pushes
//! later prop values into a live engine; callers remount it (keyed by section)
//! to show different content.

use crate::components::hooks::use_random::use_random_id_for;
use crate::models::Document;
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

mod editorjs;

pub(crate) use editorjs::EditorJsEngine;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum EditorError {
    /// `window.EditorJS` is not available.
    MissingGlobal,
    AlreadyLoaded,
    Convert(String),
    Js(String),
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGlobal => write!(f, "EditorJS is not loaded on this page"),
            Self::AlreadyLoaded => write!(f, "engine is already mounted"),
            Self::Convert(m) => write!(f, "document conversion failed: {m}"),
            Self::Js(m) => write!(f, "{m}"),
        }
    }
}

impl From<JsValue> for EditorError {
    fn from(v: JsValue) -> Self {
        Self::Js(v.as_string().unwrap_or_else(|| format!("{v:?}")))
    }
}

/// A mountable rich-text engine.
pub(crate) trait EditorEngine {
    /// Register the listener for user edits. Call before `load`.
    fn on_change(&mut self, callback: Callback<Document>);

    /// Mount into the element with id `holder_id`, showing `document`.
    fn load(&mut self, holder_id: &str, document: &Document) -> Result<(), EditorError>;

    fn destroy(&mut self);
}

pub(crate) fn document_to_js(doc: &Document) -> Result<JsValue, EditorError> {
    let text = serde_json::to_string(&doc.0).map_err(|e| EditorError::Convert(e.to_string()))?;
    js_sys::JSON::parse(&text).map_err(EditorError::from)
}

pub(crate) fn document_from_js(value: &JsValue) -> Result<Document, EditorError> {
    let text: String = js_sys::JSON::stringify(value)?.into();
    serde_json::from_str(&text)
        .map(Document)
        .map_err(|e| EditorError::Convert(e.to_string()))
}

/// Mount `engine` into `holder_ref` once the element exists; destroy it with the owner.
fn mount_engine<E: EditorEngine + 'static>(
    holder_ref: NodeRef<html::Div>,
    holder_id: String,
    document: Document,
    engine: E,
) {
    let slot: StoredValue<Option<E>, LocalStorage> = StoredValue::new_local(None);
    let mut pending = Some(engine);

    Effect::new(move |_| {
        if holder_ref.get().is_none() {
            return;
        }
        // One engine per mount.
        let Some(mut engine) = pending.take() else {
            return;
        };

        match engine.load(&holder_id, &document) {
            Ok(()) => slot.set_value(Some(engine)),
            Err(e) => {
                web_sys::console::error_1(&format!("[editor] mount failed: {e}").into());
            }
        }
    });

    on_cleanup(move || {
        let _ = slot.try_update_value(|s| {
            if let Some(mut engine) = s.take() {
                engine.destroy();
            }
        });
    });
}

/// Editable block editor. `document` is read once; remount to show other content.
#[component]
pub fn ContentEditor(
    document: Document,
    #[prop(into)] on_change: Callback<Document>,
) -> impl IntoView {
    let holder_id = use_random_id_for("editor");
    let holder_ref: NodeRef<html::Div> = NodeRef::new();

    let mut engine = EditorJsEngine::new(false);
    engine.on_change(on_change);
    mount_engine(holder_ref, holder_id.clone(), document, engine);

    view! {
        <div
            id=holder_id
            node_ref=holder_ref
            class="min-h-40 rounded-md border border-border bg-background px-4 py-3 text-sm"
        ></div>
    }
}

/// Read-only rendering of a document.
#[component]
pub fn ContentViewer(document: Document) -> impl IntoView {
    let holder_id = use_random_id_for("viewer");
    let holder_ref: NodeRef<html::Div> = NodeRef::new();

    mount_engine(holder_ref, holder_id.clone(), document, EditorJsEngine::new(true));

    view! { <div id=holder_id node_ref=holder_ref class="text-sm"></div> }
}
