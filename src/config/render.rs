//! Box template rendering
//!
//! Templates are handlebars text. Rendering is strict (unknown variables are errors) and never
//! HTML-escapes, since the output is HCL.
//!
//! A few string helpers are registered, with arguments in the same order as the Go template
//! functions yor users know: `{{ lower toggleName }}`, `{{ upper toggleName }}`,
//! `{{ trim tagsPrefix }}`, `{{ replace "/" "_" dirPath }}` and `{{ base dirPath }}`.

use crate::boxing::TemplateError;
use handlebars::{handlebars_helper, Handlebars};
use serde::Serialize;
use std::path::Path;

handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(replace: |from: str, to: str, s: str| s.replace(from, to));
handlebars_helper!(base: |s: str| Path::new(s)
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default());

/// Variables available to box templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVars {
    pub toggle_name: String,
    pub tags_prefix: String,
    pub dir_path: String,
}

pub fn render(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_helper("lower", Box::new(lower));
    handlebars.register_helper("upper", Box::new(upper));
    handlebars.register_helper("trim", Box::new(trim));
    handlebars.register_helper("replace", Box::new(replace));
    handlebars.register_helper("base", Box::new(base));
    handlebars
        .render_template(template, vars)
        .map_err(|e| TemplateError::Render(e.to_string()))
}
