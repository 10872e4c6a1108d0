//! Macro editing session
//!
//! [`MacroSession`] owns the ordered definition list (the persisted source of
//! truth) and the [`TableHandle`] derived from it. Every mutation goes
//! through the session and ends with a full table rebuild, so renderers
//! holding a clone of the handle always see a table that matches some
//! complete state of the list.

use std::path::Path;
use std::sync::Arc;

use crate::core::definition::MacroDefinition;
use crate::core::expand::try_expand;
use crate::core::table::{MacroTable, TableHandle};
use crate::document::{expand_code_spans, DocumentOutput};
use crate::settings::Settings;
use crate::utils::error::{SettingsError, SettingsResult};

#[derive(Debug, Default)]
pub struct MacroSession {
    settings: Settings,
    table: TableHandle,
}

impl MacroSession {
    /// Start a session and build the initial table.
    pub fn new(settings: Settings) -> Self {
        let table = TableHandle::new(MacroTable::build(&settings.replacements));
        Self { settings, table }
    }

    /// Start a session from a settings file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        Ok(Self::new(Settings::load(path)?))
    }

    /// Persist the definition list, then rebuild the table.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.settings.save(path)?;
        self.on_definition_list_changed();
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn definitions(&self) -> &[MacroDefinition] {
        &self.settings.replacements
    }

    /// Shared handle for renderers. Clones follow later rebuilds.
    pub fn table(&self) -> &TableHandle {
        &self.table
    }

    pub fn snapshot(&self) -> Arc<MacroTable> {
        self.table.snapshot()
    }

    /// Rebuild the table from the current list.
    pub fn on_definition_list_changed(&self) -> Arc<MacroTable> {
        self.table.rebuild(&self.settings.replacements)
    }

    /// Re-parse the template of the definition at `index`, then rebuild.
    pub fn on_template_text_changed(&mut self, index: usize, text: &str) -> SettingsResult<()> {
        let def = self.definition_mut(index)?;
        def.set_template(text);
        tracing::debug!(index, name = %def.name, arity = def.arity(), "template changed");
        self.on_definition_list_changed();
        Ok(())
    }

    /// Rename the definition at `index`, then rebuild.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> SettingsResult<()> {
        let def = self.definition_mut(index)?;
        def.name = name.into();
        self.on_definition_list_changed();
        Ok(())
    }

    /// Append a definition and return its index.
    pub fn add_definition(&mut self, name: impl Into<String>, template: &str) -> usize {
        self.push(MacroDefinition::new(name, template))
    }

    /// Append a blank definition to be filled in later.
    pub fn push_empty(&mut self) -> usize {
        self.push(MacroDefinition::default())
    }

    fn push(&mut self, def: MacroDefinition) -> usize {
        self.settings.replacements.push(def);
        self.on_definition_list_changed();
        self.settings.replacements.len() - 1
    }

    /// Remove the definition at `index`.
    pub fn remove(&mut self, index: usize) -> SettingsResult<MacroDefinition> {
        let len = self.settings.replacements.len();
        if index >= len {
            return Err(SettingsError::IndexOutOfRange { index, len });
        }
        let removed = self.settings.replacements.remove(index);
        self.on_definition_list_changed();
        Ok(removed)
    }

    /// Remove every definition called `name` and return how many went.
    pub fn remove_named(&mut self, name: &str) -> SettingsResult<usize> {
        let before = self.settings.replacements.len();
        self.settings.replacements.retain(|def| def.name != name);
        let removed = before - self.settings.replacements.len();
        if removed == 0 {
            return Err(SettingsError::UnknownMacro(name.to_string()));
        }
        self.on_definition_list_changed();
        Ok(removed)
    }

    /// Replace the whole definition list.
    pub fn set_definitions(&mut self, definitions: Vec<MacroDefinition>) {
        self.settings.replacements = definitions;
        self.on_definition_list_changed();
    }

    /// Index of the definition the table resolves `name` to.
    ///
    /// With duplicate names this is the last one.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.settings
            .replacements
            .iter()
            .rposition(|def| def.name == name)
    }

    /// Expand one span against the current table.
    pub fn try_expand(&self, span: &str) -> Option<String> {
        try_expand(span, &self.snapshot())
    }

    /// Expand every invocation span of a Markdown document.
    pub fn expand_document(&self, text: &str) -> DocumentOutput {
        expand_code_spans(text, &self.snapshot())
    }

    fn definition_mut(&mut self, index: usize) -> SettingsResult<&mut MacroDefinition> {
        let len = self.settings.replacements.len();
        self.settings
            .replacements
            .get_mut(index)
            .ok_or(SettingsError::IndexOutOfRange { index, len })
    }
}
