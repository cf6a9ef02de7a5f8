use super::ast::BodyLine;
use super::dedent::dedent;
use keyscript_profile::ToolProfile;

/// Render a code section body: dedent, join with `\n`, expand macros.
///
/// Macros are only expanded when `profile` is present.
pub fn process_code(lines: &[BodyLine], profile: Option<&ToolProfile>) -> String {
    let text = dedent(lines.iter().map(|l| l.text.as_str())).join("\n");
    match profile {
        Some(p) if !p.macros.is_empty() => expand_macros(&text, p),
        _ => text,
    }
}

/// Replace every `{{NAME}}` that names one of `profile`'s macros.
///
/// One left-to-right pass; expansions are not rescanned. Unknown names are
/// left as written.
pub fn expand_macros(text: &str, profile: &ToolProfile) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let expansion = after
            .find("}}")
            .and_then(|close| profile.macro_expansion(&after[..close]).map(|e| (close, e)));
        match expansion {
            Some((close, e)) => {
                out.push_str(e);
                rest = &after[close + 2..];
            }
            None => {
                // Retry one brace later so `{{{NAME}}` still expands.
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyscript_diagnostics::Span;
    use std::collections::BTreeMap;

    fn profile() -> ToolProfile {
        ToolProfile {
            id: "T".into(),
            description: None,
            macros: BTreeMap::from([
                ("A".into(), "alpha".into()),
                ("LOOP".into(), "{{A}}".into()),
            ]),
            commands: BTreeMap::new(),
        }
    }

    fn body(lines: &[&str]) -> Vec<BodyLine> {
        lines
            .iter()
            .map(|t| BodyLine {
                text: (*t).to_string(),
                span: Span::new(0, 0),
            })
            .collect()
    }

    #[test]
    fn expands_known_names() {
        assert_eq!(expand_macros("x {{A}} y {{A}}", &profile()), "x alpha y alpha");
    }

    #[test]
    fn leaves_unknown_names() {
        assert_eq!(expand_macros("{{B}} and {{a}}", &profile()), "{{B}} and {{a}}");
    }

    #[test]
    fn expansions_are_not_rescanned() {
        assert_eq!(expand_macros("{{LOOP}}", &profile()), "{{A}}");
    }

    #[test]
    fn extra_brace_is_kept() {
        assert_eq!(expand_macros("{{{A}}}", &profile()), "{alpha}");
        assert_eq!(expand_macros("{{A", &profile()), "{{A");
    }

    #[test]
    fn no_profile_no_expansion() {
        assert_eq!(process_code(&body(&["  {{A}}"]), None), "{{A}}");
        assert_eq!(process_code(&body(&["  {{A}}", "    b"]), Some(&profile())), "alpha\n  b");
    }
}
