#![forbid(unsafe_code)]
//! WASM-friendly bridge for the workspace engine.
//! Exposes a small wasm-bindgen surface that matches what the web client's store needs.

mod session;

pub use session::Session;

use filetree_core::FolderId;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    // Plain objects rather than JS `Map`s for the flattened metadata.
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub struct WasmWorkspace {
    session: Session,
}

#[wasm_bindgen]
impl WasmWorkspace {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmWorkspace {
        WasmWorkspace {
            session: Session::new(),
        }
    }

    pub fn dispatch(&mut self, action_json: String) -> Result<(), JsValue> {
        self.session
            .dispatch_json(&action_json)
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = loadTree)]
    pub fn load_tree(&mut self, tree_json: String) -> Result<(), JsValue> {
        self.session
            .load_tree_json(&tree_json)
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.session
            .reset()
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.current())
    }

    #[wasm_bindgen(js_name = rootTree)]
    pub fn root_tree(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.current().root_tree())
    }

    pub fn folders(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.current().folders())
    }

    pub fn records(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.current().records())
    }

    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of(&self, parent: Option<String>) -> Result<JsValue, JsValue> {
        let parent = parent.map(FolderId::new);
        let view = self
            .session
            .current()
            .children_of(parent.as_ref())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&view)
    }

    pub fn breadcrumbs(&self, folder_id: String) -> Result<JsValue, JsValue> {
        let names = self
            .session
            .breadcrumbs(&folder_id)
            .map_err(|e| JsValue::from_str(&e))?;
        to_js(&names)
    }

    pub fn validate(&self) -> Result<(), JsValue> {
        self.session
            .current()
            .validate_invariants()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for WasmWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
