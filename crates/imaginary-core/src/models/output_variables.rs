use std::collections::BTreeMap;

/// Variables available to output header templates.
///
/// Substitution is a plain replacement of each recognized variable name; there is no
/// escaping or expression syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputVariables {
    /// Byte length of the encoded result.
    pub output_length: usize,
}

impl OutputVariables {
    pub const OUTPUT_LENGTH: &'static str = "OUTPUT_LENGTH";

    pub fn new(output_length: usize) -> Self {
        Self { output_length }
    }

    fn entries(&self) -> [(&'static str, String); 1] {
        [(Self::OUTPUT_LENGTH, self.output_length.to_string())]
    }

    pub fn substitute(&self, template: &str) -> String {
        self.entries()
            .iter()
            .fold(template.to_string(), |acc, (name, value)| {
                acc.replace(name, value)
            })
    }

    /// Render every header value template.
    pub fn render_headers(&self, templates: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        templates
            .iter()
            .map(|(name, template)| (name.clone(), self.substitute(template)))
            .collect()
    }
}
