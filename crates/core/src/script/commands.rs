use super::ast::BodyLine;
use super::dedent::dedent_commands;
use keyscript_diagnostics::{Diagnostic, codes};
use keyscript_profile::CommandTable;

/// Most repetitions a single command line may produce.
pub const MAX_REPEAT: i64 = 10_000;

/// Render a commands section body against `table`.
///
/// Each line is `NAME [COUNT]`. Bad lines are skipped with a diagnostic;
/// nothing here fails.
pub fn process_commands(
    lines: &[BodyLine],
    table: &CommandTable<'_>,
    diags: &mut Vec<Diagnostic>,
) -> String {
    let normalized = dedent_commands(lines.iter().map(|l| l.text.as_str()));
    let mut out = String::new();

    for (line, source) in normalized.iter().zip(lines) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };
        let name = first.to_ascii_uppercase();

        let count = match tokens.next() {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    diags.push(
                        Diagnostic::from_code(
                            codes::MALFORMED_COUNT,
                            format!("count '{raw}' for {name} is not an integer; line skipped"),
                        )
                        .at(source.span)
                        .with("command", name.clone())
                        .with("value", raw),
                    );
                    continue;
                }
            },
        };

        let Some(expansion) = table.resolve(&name) else {
            let mut diag = Diagnostic::from_code(
                codes::UNKNOWN_COMMAND,
                format!("unknown command '{name}'; line skipped"),
            )
            .at(source.span)
            .with("command", name.clone());
            if let Some(tool) = table.tool() {
                diag = diag.with("tool", tool.id.clone());
            }
            diags.push(diag);
            continue;
        };

        if keyscript_stream::is_repeatable(expansion) {
            if count <= 0 {
                diags.push(
                    Diagnostic::from_code(
                        codes::NON_POSITIVE_COUNT,
                        format!("{name} repeated {count} times emits nothing"),
                    )
                    .at(source.span)
                    .with("command", name.clone())
                    .with("count", count.to_string()),
                );
                continue;
            }
            let times = if count > MAX_REPEAT {
                diags.push(
                    Diagnostic::from_code(
                        codes::REPEAT_LIMIT,
                        format!("{name} count {count} clamped to {MAX_REPEAT}"),
                    )
                    .at(source.span)
                    .with("command", name.clone())
                    .with("count", count.to_string())
                    .with("limit", MAX_REPEAT.to_string()),
                );
                MAX_REPEAT
            } else {
                count
            };
            // `times` is in 1..=MAX_REPEAT here.
            out.push_str(&expansion.repeat(times as usize));
        } else {
            if count > 1 {
                diags.push(
                    Diagnostic::from_code(
                        codes::REPEAT_IGNORED,
                        format!("{name} cannot repeat; count {count} ignored"),
                    )
                    .at(source.span)
                    .with("command", name.clone())
                    .with("count", count.to_string()),
                );
            }
            out.push_str(expansion);
        }
    }

    out
}
