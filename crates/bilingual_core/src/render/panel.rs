//! "Translation" side panel of the record edit screen.

use super::escape::{escape_attr, escape_html};
use crate::model::record::RecordId;
use crate::service::save_guard::{TRANSLATION_FIELD, TRANSLATION_NONCE_FIELD};
use std::fmt::Write;

/// Panel title shown by the edit UI host.
pub const PANEL_TITLE: &str = "Translation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOption {
    pub id: RecordId,
    pub title: String,
    pub selected: bool,
}

/// Everything the panel shows for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPanel {
    /// Display name of the edited record's language, e.g. `PL`.
    pub current_language: String,
    /// Display name of the language offered in the select.
    pub opposite_language: String,
    /// Opposite-category records ordered by title.
    pub options: Vec<PanelOption>,
    /// Anti-forgery token embedded in the form.
    pub nonce: String,
}

impl TranslationPanel {
    pub fn selected(&self) -> Option<RecordId> {
        self.options
            .iter()
            .find(|option| option.selected)
            .map(|option| option.id)
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            html,
            r#"<input type="hidden" id="{field}" name="{field}" value="{}" />"#,
            escape_attr(&self.nonce),
            field = TRANSLATION_NONCE_FIELD,
        );
        let _ = writeln!(
            html,
            "<p><strong>Current language:</strong> {}</p>",
            escape_html(&self.current_language)
        );
        let _ = writeln!(
            html,
            r#"<label for="{TRANSLATION_FIELD}">Select {} translation:</label><br>"#,
            escape_html(&self.opposite_language)
        );
        let _ = writeln!(
            html,
            r#"<select name="{TRANSLATION_FIELD}" id="{TRANSLATION_FIELD}" style="width: 90%;">"#
        );
        html.push_str("<option value=\"\">-- None --</option>\n");
        for option in &self.options {
            let id = option.id.to_string();
            let _ = writeln!(
                html,
                r#"<option value="{}"{}>{} (ID: {})</option>"#,
                escape_attr(&id),
                if option.selected { " selected" } else { "" },
                escape_html(&option.title),
                escape_html(&id)
            );
        }
        html.push_str("</select>\n");
        html
    }
}
