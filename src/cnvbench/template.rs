use std::collections::HashMap;

use regex::{Captures, Regex};
use thiserror::Error;

/// Fixed text with named `{{name}}` placeholders.
///
/// A template is checked once when it is built, so that rendering
/// only needs to look up bindings. Text outside of placeholders,
/// including single braces and shell `${...}` expansions, is copied
/// through untouched.
#[derive(Debug, Clone)]
pub struct Template {
    text: &'static str,
    names: Vec<String>,
}

/// Values bound to template placeholders, by name.
pub type Bindings<'a> = HashMap<&'a str, String>;

fn placeholder_re() -> Regex {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap()
}

impl Template {
    pub fn new(text: &'static str) -> Self {
        let names = placeholder_re()
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect();
        Template { text, names }
    }

    /// Returns the placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self.names.iter() {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }

    /// Substitutes every placeholder with its binding.
    ///
    /// # Errors
    ///
    /// An error variant is returned when a placeholder has no
    /// binding. Bindings with no placeholder are ignored.
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .names
            .iter()
            .find(|name| !bindings.contains_key(name.as_str()))
        {
            return Err(TemplateError::MissingPlaceholder(missing.to_string()));
        }

        let rendered = placeholder_re().replace_all(self.text, |cap: &Captures| {
            bindings[&cap[1]].clone()
        });
        Ok(rendered.into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("No value bound for template placeholder \"{0}\"")]
    MissingPlaceholder(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_named() {
        let tmpl = Template::new("sid <- \"{{sid}}\"\nscale <- \"{{ scale }}\"\n{{sid}}\n");
        assert_eq!(tmpl.placeholders(), vec!["sid", "scale"]);

        let mut bindings = Bindings::new();
        bindings.insert("sid", "P1".to_string());
        bindings.insert("scale", "gene".to_string());
        bindings.insert("unused", "x".to_string());

        assert_eq!(
            tmpl.render(&bindings).unwrap(),
            "sid <- \"P1\"\nscale <- \"gene\"\nP1\n"
        );
    }

    #[test]
    fn render_missing() {
        let tmpl = Template::new("cd {{run_dir}}\nqsub {{job}}\n");
        let mut bindings = Bindings::new();
        bindings.insert("run_dir", "/tmp".to_string());

        assert_eq!(
            tmpl.render(&bindings),
            Err(TemplateError::MissingPlaceholder("job".to_string()))
        );
    }

    #[test]
    fn render_literal_braces() {
        let text = "work_dir=`cd $(dirname $0) && pwd`\necho ${HOME} {x}\n";
        let tmpl = Template::new(text);
        assert!(tmpl.placeholders().is_empty());
        assert_eq!(tmpl.render(&Bindings::new()).unwrap(), text);
    }

    #[test]
    fn render_value_not_rescanned() {
        let tmpl = Template::new("{{a}}");
        let mut bindings = Bindings::new();
        bindings.insert("a", "{{b}}".to_string());
        assert_eq!(tmpl.render(&bindings).unwrap(), "{{b}}");
    }
}
