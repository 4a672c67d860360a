use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use shadow_sync_shared::{DataMessage, StyleScopeId, StyleSheetId};

/// Prefix lookup for style scopes, supplied by the host framework
pub trait StyleScopeRegistry {
    fn query_name(&self, scope: StyleScopeId) -> Option<String>;
}

impl<F: Fn(StyleScopeId) -> Option<String>> StyleScopeRegistry for F {
    fn query_name(&self, scope: StyleScopeId) -> Option<String> {
        self(scope)
    }
}

/// Remembers every style registration issued over the channel, so a fresh
/// view side can be brought back to the same style state.
pub struct StyleRegistry {
    scope_registry: Box<dyn StyleScopeRegistry>,
    sheet_contents: Vec<(String, Value)>,
    scopes: Vec<(StyleScopeId, Option<String>)>,
    known_scopes: HashSet<StyleScopeId>,
    appended_sheets: Vec<(StyleSheetId, String, Option<StyleScopeId>)>,
    disabled_sheets: Vec<StyleSheetId>,
    next_sheet: u32,
}

impl StyleRegistry {
    pub fn new(scope_registry: Box<dyn StyleScopeRegistry>) -> Self {
        Self {
            scope_registry,
            sheet_contents: Vec::new(),
            scopes: Vec::new(),
            known_scopes: HashSet::new(),
            appended_sheets: Vec::new(),
            disabled_sheets: Vec::new(),
            next_sheet: 1,
        }
    }

    pub fn register_sheet_content(&mut self, path: &str, content: Value) -> DataMessage {
        self.sheet_contents.push((path.to_string(), content.clone()));
        DataMessage::RegisterStyleSheetContent {
            path: path.to_string(),
            content,
        }
    }

    /// Registration message for a scope seen for the first time, `None` for
    /// any later reference
    pub fn check_scope(&mut self, scope: Option<StyleScopeId>) -> Option<DataMessage> {
        let scope = scope?;
        if !self.known_scopes.insert(scope) {
            return None;
        }
        let prefix = self.scope_registry.query_name(scope);
        debug!("registering style scope {} with prefix {:?}", scope, prefix);
        self.scopes.push((scope, prefix.clone()));
        Some(DataMessage::RegisterStyleScope { scope, prefix })
    }

    pub fn append_sheet_path(
        &mut self,
        path: &str,
        scope: Option<StyleScopeId>,
    ) -> (StyleSheetId, DataMessage) {
        let sheet = StyleSheetId::new(self.next_sheet);
        self.next_sheet += 1;
        self.appended_sheets.push((sheet, path.to_string(), scope));
        (
            sheet,
            DataMessage::AppendStyleSheetPath {
                sheet,
                path: path.to_string(),
                scope,
            },
        )
    }

    pub fn disable_sheet(&mut self, sheet: StyleSheetId) -> DataMessage {
        if !self.disabled_sheets.contains(&sheet) {
            self.disabled_sheets.push(sheet);
        }
        DataMessage::DisableStyleSheet { sheet }
    }

    /// Every registration in its original order: sheet contents, then
    /// scopes, then appended paths, then the disables of appended sheets
    pub fn replay_messages(&self) -> Vec<DataMessage> {
        let contents = self
            .sheet_contents
            .iter()
            .map(|(path, content)| DataMessage::RegisterStyleSheetContent {
                path: path.clone(),
                content: content.clone(),
            });
        let scopes = self
            .scopes
            .iter()
            .map(|(scope, prefix)| DataMessage::RegisterStyleScope {
                scope: *scope,
                prefix: prefix.clone(),
            });
        let sheets = self
            .appended_sheets
            .iter()
            .map(|(sheet, path, scope)| DataMessage::AppendStyleSheetPath {
                sheet: *sheet,
                path: path.clone(),
                scope: *scope,
            });
        let disables = self
            .disabled_sheets
            .iter()
            .map(|sheet| DataMessage::DisableStyleSheet { sheet: *sheet });
        contents
            .chain(scopes)
            .chain(sheets)
            .chain(disables)
            .collect()
    }
}
