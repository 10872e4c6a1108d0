//! WASM bindings for simple-macros
//!
//! This module exposes a macro engine to JavaScript hosts (note-taking apps,
//! Markdown previewers) that keep their settings as JSON.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::session::MacroSession;
use crate::settings::Settings;

/// Single-span expansion result with warnings
#[derive(Serialize)]
pub struct ExpandResult {
    /// Expanded text, or the original span when nothing matched
    pub output: String,
    /// Whether the span was an invocation of a known macro
    pub matched: bool,
    pub warnings: Vec<String>,
}

/// Document expansion result
#[derive(Serialize)]
pub struct DocumentResult {
    pub output: String,
    /// Number of spans replaced
    pub expanded: usize,
    pub warnings: Vec<String>,
}

/// Serialize a value to JsValue, falling back to `null` on failure.
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Arity of a template body (highest `$n` plus one)
#[wasm_bindgen(js_name = "templateArity")]
pub fn template_arity_wasm(text: &str) -> usize {
    crate::template_arity(text)
}

/// Macro engine holding the definition list and its lookup table
#[wasm_bindgen]
pub struct MacroEngine {
    session: MacroSession,
}

#[wasm_bindgen]
impl MacroEngine {
    /// Create an engine from settings JSON (`{"replacements": [...]}`).
    /// An empty string starts with no macros.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: &str) -> Result<MacroEngine, JsError> {
        let settings = Settings::from_json(settings_json)?;
        Ok(MacroEngine {
            session: MacroSession::new(settings),
        })
    }

    /// Replace all definitions with the ones in `settings_json`.
    #[wasm_bindgen(js_name = "setDefinitions")]
    pub fn set_definitions(&mut self, settings_json: &str) -> Result<(), JsError> {
        let settings = Settings::from_json(settings_json)?;
        self.session.set_definitions(settings.replacements);
        Ok(())
    }

    /// Update one template and return its new arity.
    #[wasm_bindgen(js_name = "onTemplateTextChanged")]
    pub fn on_template_text_changed(&mut self, index: usize, text: &str) -> Result<usize, JsError> {
        self.session.on_template_text_changed(index, text)?;
        Ok(self.session.definitions()[index].arity())
    }

    /// Current settings as JSON, ready to persist.
    #[wasm_bindgen(js_name = "settingsJson")]
    pub fn settings_json(&self) -> Result<String, JsError> {
        Ok(self.session.settings().to_json()?)
    }

    /// Expand one code span. Returns `undefined` when it is not an invocation.
    #[wasm_bindgen(js_name = "tryExpand")]
    pub fn try_expand(&self, span: &str) -> Option<String> {
        self.session.try_expand(span)
    }

    /// Expand one code span and report missing arguments.
    #[wasm_bindgen(js_name = "tryExpandWithReport")]
    pub fn try_expand_with_report(&self, span: &str) -> JsValue {
        let result = match crate::try_expand_with_report(span, &self.session.snapshot()) {
            Some(expansion) => ExpandResult {
                output: expansion.content,
                matched: true,
                warnings: expansion.warnings.iter().map(|w| w.to_string()).collect(),
            },
            None => ExpandResult {
                output: span.to_string(),
                matched: false,
                warnings: vec![],
            },
        };
        to_js_value(&result)
    }

    /// Expand every invocation code span in a Markdown document.
    #[wasm_bindgen(js_name = "expandDocument")]
    pub fn expand_document(&self, markdown: &str) -> JsValue {
        let output = self.session.expand_document(markdown);
        to_js_value(&DocumentResult {
            output: output.content,
            expanded: output.expanded,
            warnings: output.warnings.iter().map(|w| w.to_string()).collect(),
        })
    }

    /// Number of distinct macro names currently defined.
    #[wasm_bindgen(getter, js_name = "macroCount")]
    pub fn macro_count(&self) -> usize {
        self.session.snapshot().len()
    }
}
