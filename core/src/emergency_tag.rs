//! `[EMERGENCY_DATA]` block parser.
//!
//! Grammar (line oriented, both fields optional, any order):
//!
//! ```text
//! [EMERGENCY_DATA]
//! Type: <free text>
//! SOP: <step>[;<step>]*
//! [/EMERGENCY_DATA]
//! ```
//!
//! Tolerant: missing fields come back as `None`, an opening tag with no
//! closing tag means there is no block, and only the first block counts.

pub const OPEN_TAG: &str = "[EMERGENCY_DATA]";
pub const CLOSE_TAG: &str = "[/EMERGENCY_DATA]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmergencyBlock {
    pub medical_type: Option<String>,
    pub sop_steps:    Option<Vec<String>>,
}

/// Extract the first well-formed block from `text`.
pub fn parse_emergency_block(text: &str) -> Option<EmergencyBlock> {
    let start = text.find(OPEN_TAG)? + OPEN_TAG.len();
    let len = text[start..].find(CLOSE_TAG)?;
    let body = &text[start..start + len];

    let mut block = EmergencyBlock::default();
    for line in body.lines() {
        let line = line.trim().trim_start_matches(['-', '*']).trim_start();
        if block.medical_type.is_none() {
            if let Some(value) = field_value(line, "type") {
                if !value.is_empty() {
                    block.medical_type = Some(value.to_string());
                }
                continue;
            }
        }
        if block.sop_steps.is_none() {
            if let Some(value) = field_value(line, "sop") {
                let steps: Vec<String> = value
                    .split(';')
                    .map(strip_emphasis)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if !steps.is_empty() {
                    block.sop_steps = Some(steps);
                }
            }
        }
    }
    Some(block)
}

/// `"Type: Cardiac"` or `"**Type:** Cardiac"` with key `"type"` gives
/// `Some("Cardiac")`. Key match is case-insensitive.
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let (head, rest) = line.split_once(':')?;
    strip_emphasis(head).eq_ignore_ascii_case(key).then(|| strip_emphasis(rest))
}

/// Markdown bold/italic markers and surrounding whitespace.
fn strip_emphasis(text: &str) -> &str {
    text.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
}
