use crate::editor::{document_from_js, document_to_js, EditorEngine, EditorError};
use crate::models::Document;
use js_sys::{Function, Object, Promise, Reflect};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = EditorJS)]
    type EditorJs;

    #[wasm_bindgen(constructor, js_class = "EditorJS", catch)]
    fn new(config: &JsValue) -> Result<EditorJs, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &EditorJs) -> Result<(), JsValue>;
}

/// Block tools: (config key, global constructor name). Missing globals are skipped.
const BLOCK_TOOLS: [(&str, &str); 4] = [
    ("header", "Header"),
    ("list", "List"),
    ("quote", "Quote"),
    ("embed", "Embed"),
];

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), EditorError> {
    Reflect::set(target, &key.into(), value)?;
    Ok(())
}

fn tools(global: &JsValue) -> Result<Object, EditorError> {
    let tools = Object::new();
    for (key, name) in BLOCK_TOOLS {
        let class = Reflect::get(global, &name.into())?;
        if !class.is_function() {
            continue;
        }
        let tool = Object::new();
        set(&tool, "class", &class)?;
        set(&tool, "inlineToolbar", &JsValue::TRUE)?;
        set(&tools, key, &tool)?;
    }
    Ok(tools)
}

async fn save_document(api: JsValue) -> Result<Document, EditorError> {
    let saver = Reflect::get(&api, &"saver".into())?;
    let save: Function = Reflect::get(&saver, &"save".into())?.dyn_into()?;
    let promise: Promise = save.call0(&saver)?.dyn_into()?;
    let output = JsFuture::from(promise).await?;
    document_from_js(&output)
}

/// Editor.js loaded from the page (`window.EditorJS` plus optional tool globals).
pub(crate) struct EditorJsEngine {
    read_only: bool,
    callback: Option<Callback<Document>>,
    instance: Option<EditorJs>,
    /// Set to false on destroy; saves resolving afterwards are dropped.
    alive: Rc<Cell<bool>>,
    _on_change: Option<Closure<dyn FnMut(JsValue, JsValue)>>,
}

impl EditorJsEngine {
    pub fn new(read_only: bool) -> Self {
        Self {
            read_only,
            callback: None,
            instance: None,
            alive: Rc::new(Cell::new(false)),
            _on_change: None,
        }
    }

    fn change_listener(&self, callback: Callback<Document>) -> Closure<dyn FnMut(JsValue, JsValue)> {
        let alive = self.alive.clone();
        Closure::new(move |api: JsValue, _event: JsValue| {
            let alive = alive.clone();
            spawn_local(async move {
                match save_document(api).await {
                    Ok(doc) => {
                        if alive.get() {
                            callback.run(doc);
                        }
                    }
                    Err(e) => {
                        web_sys::console::error_1(&format!("[editor] save failed: {e}").into());
                    }
                }
            });
        })
    }
}

impl EditorEngine for EditorJsEngine {
    fn on_change(&mut self, callback: Callback<Document>) {
        self.callback = Some(callback);
    }

    fn load(&mut self, holder_id: &str, document: &Document) -> Result<(), EditorError> {
        if self.instance.is_some() {
            return Err(EditorError::AlreadyLoaded);
        }

        let global: JsValue = web_sys::window().ok_or(EditorError::MissingGlobal)?.into();
        if !Reflect::get(&global, &"EditorJS".into())?.is_function() {
            return Err(EditorError::MissingGlobal);
        }

        // Editor.js rejects `null` and block-less data.
        let data = if document.is_blank() {
            document_to_js(&Document::empty())?
        } else {
            document_to_js(document)?
        };

        let config = Object::new();
        set(&config, "holder", &holder_id.into())?;
        set(&config, "data", &data)?;
        set(&config, "readOnly", &JsValue::from_bool(self.read_only))?;
        let block_tools: JsValue = tools(&global)?.into();
        set(&config, "tools", &block_tools)?;

        if !self.read_only {
            if let Some(cb) = self.callback {
                let listener = self.change_listener(cb);
                set(&config, "onChange", listener.as_ref())?;
                self._on_change = Some(listener);
            }
        }

        let instance = EditorJs::new(&config)?;
        self.instance = Some(instance);
        self.alive.set(true);
        Ok(())
    }

    fn destroy(&mut self) {
        self.alive.set(false);
        if let Some(instance) = self.instance.take() {
            if let Err(e) = instance.destroy() {
                web_sys::console::error_1(&format!("[editor] destroy failed: {e:?}").into());
            }
        }
        self._on_change = None;
    }
}
