use super::ast::Section;
use super::code::process_code;
use super::commands::process_commands;
use keyscript_diagnostics::{Diagnostic, codes};
use keyscript_profile::{ProfileRegistry, ToolProfile};

/// Canonical stream assembled from a section sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Assembly {
    /// The canonical stream.
    pub stream: String,
    /// Tool resolution and command diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Concatenate every section's output in order, with no separators.
///
/// Text sections pass through verbatim. Tool names are resolved against
/// `registry` here; unregistered tools fall back to the generic table.
pub fn assemble(sections: &[Section], registry: &ProfileRegistry) -> Assembly {
    let mut out = Assembly::default();

    for section in sections {
        match section {
            Section::Text { content, .. } => out.stream.push_str(content),
            Section::Code { lines, .. } => {
                let profile = resolve_tool(section, registry, &mut out.diagnostics);
                out.stream.push_str(&process_code(lines, profile));
            }
            Section::Commands { lines, .. } => {
                resolve_tool(section, registry, &mut out.diagnostics);
                let table = registry.command_table(section.tool());
                let rendered = process_commands(lines, &table, &mut out.diagnostics);
                out.stream.push_str(&rendered);
            }
        }
    }

    out
}

fn resolve_tool<'r>(
    section: &Section,
    registry: &'r ProfileRegistry,
    diags: &mut Vec<Diagnostic>,
) -> Option<&'r ToolProfile> {
    let tool = section.tool()?;
    let profile = registry.get(tool);
    if profile.is_none() {
        diags.push(
            Diagnostic::from_code(
                codes::UNKNOWN_TOOL,
                format!("no profile registered for tool '{tool}'; using generic behavior"),
            )
            .at(section.span())
            .with("tool", tool),
        );
    }
    profile
}
