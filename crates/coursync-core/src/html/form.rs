//! Form extraction: the first `<form>` of a document and its input fields.

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static FORM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").unwrap());
static DIV_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").unwrap());
static INPUT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("input").unwrap());

/// Which inputs of the first form are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    /// Every input anywhere inside the form.
    WholeForm,
    /// Only inputs under the first `<div>` nested in the form. Sibling
    /// controls outside that container (e.g. submit buttons) are left out.
    FirstContainer,
}

/// A form ready to be POSTed: target plus field name → value.
///
/// Fields are kept sorted by name so the encoded body is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    /// Raw `action` attribute; empty when the document has no form or the
    /// form has no action.
    pub action: String,
    pub fields: BTreeMap<String, String>,
}

impl FormSubmission {
    /// True when no field was found in the requested scope.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Drops the field called `name`, if present.
    pub fn without(mut self, name: &str) -> Self {
        self.fields.remove(name);
        self
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
    }
}

/// Extracts the first form of `document` in document order.
///
/// Never fails: a missing form or a missing container yields empty fields.
pub fn extract_form(document: &str, scope: FormScope) -> FormSubmission {
    let doc = Html::parse_document(document);
    let Some(form) = doc.select(&FORM_SELECTOR).next() else {
        return FormSubmission::default();
    };
    let action = form.value().attr("action").unwrap_or_default().to_string();

    let container = match scope {
        FormScope::WholeForm => Some(form),
        FormScope::FirstContainer => form.select(&DIV_SELECTOR).next(),
    };
    let fields = container.map(collect_inputs).unwrap_or_default();

    FormSubmission { action, fields }
}

/// Depth-first search for the first `<input name=...>` and return its `value`.
/// An input without a `value` attribute yields an empty string.
pub fn find_input_value(document: &str, name: &str) -> Option<String> {
    let doc = Html::parse_document(document);
    doc.select(&INPUT_SELECTOR)
        .find(|input| input.value().attr("name") == Some(name))
        .map(|input| input.value().attr("value").unwrap_or_default().to_string())
}

fn collect_inputs(container: ElementRef<'_>) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    for input in container.select(&INPUT_SELECTOR) {
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        let value = input.value().attr("value").unwrap_or_default();
        fields.insert(name.to_string(), value.to_string());
    }
    fields
}
