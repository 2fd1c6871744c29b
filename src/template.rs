use std::collections::HashMap;

use regex::Regex;

use crate::client::TemplateStore;
use crate::error::Result;

/// Variables passed to a template, by name
pub type TemplateValues = HashMap<&'static str, String>;

/// Renders an email body from a set of named values
pub trait Template: Send + Sync {
    fn render(&self, values: &TemplateValues) -> String;
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Variable(String),
}

/// A template with `{{ name }}` placeholders, parsed once and rendered many times.
///
/// Placeholders without a value render as empty text.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    pub fn compile(raw: &str) -> Self {
        lazy_static::lazy_static! {
            static ref PLACEHOLDER_REGEX: Regex =
                Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
        }

        let mut segments = Vec::new();
        let mut last = 0;
        for captures in PLACEHOLDER_REGEX.captures_iter(raw) {
            let (Some(placeholder), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if placeholder.start() > last {
                segments.push(Segment::Text(raw[last..placeholder.start()].to_string()));
            }
            segments.push(Segment::Variable(name.as_str().to_string()));
            last = placeholder.end();
        }
        if last < raw.len() {
            segments.push(Segment::Text(raw[last..].to_string()));
        }

        Self { segments }
    }
}

impl Template for CompiledTemplate {
    fn render(&self, values: &TemplateValues) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Variable(name) => values.get(name.as_str()).map_or("", String::as_str),
            })
            .collect()
    }
}

/// The two email bodies a notification can be built from
pub struct EmailTemplates {
    pub available: Box<dyn Template>,
    pub fully_booked: Box<dyn Template>,
}

impl EmailTemplates {
    pub fn new(available: impl Template + 'static, fully_booked: impl Template + 'static) -> Self {
        Self {
            available: Box::new(available),
            fully_booked: Box::new(fully_booked),
        }
    }
}

impl std::fmt::Debug for EmailTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailTemplates").finish_non_exhaustive()
    }
}

/// Fetch and compile both templates, failing if either cannot be fetched
#[tracing::instrument(name = "Fetch email templates", skip(store))]
pub async fn fetch_templates<S>(
    store: &S,
    available: &str,
    fully_booked: &str,
) -> Result<EmailTemplates>
where
    S: TemplateStore + ?Sized,
{
    let (available, fully_booked) = futures::try_join!(
        store.get_template(available),
        store.get_template(fully_booked)
    )?;

    Ok(EmailTemplates::new(
        CompiledTemplate::compile(&available),
        CompiledTemplate::compile(&fully_booked),
    ))
}
