use super::ast::Section;

/// Serialize sections to a pretty-printed JSON string.
pub fn to_pretty_json(sections: &[Section]) -> String {
    serde_json::to_string_pretty(sections).expect("Section serialization cannot fail")
}
