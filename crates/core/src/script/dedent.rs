//! Common-indentation removal for section bodies.

/// Leading whitespace characters of `line`.
fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn strip_chars(line: &str, n: usize) -> &str {
    match line.char_indices().nth(n) {
        Some((i, _)) => &line[i..],
        None => "",
    }
}

/// Remove the smallest indentation shared by all non-blank lines.
///
/// Blank lines become empty; relative indentation is kept.
pub fn dedent<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let lines = lines.into_iter();
    let min = lines
        .clone()
        .filter(|l| !l.trim().is_empty())
        .map(indent_of)
        .min()
        .unwrap_or(0);
    lines
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                strip_chars(l, min).to_string()
            }
        })
        .collect()
}

/// [`dedent`] for command bodies: `#` comment lines do not count toward the
/// shared indentation and are trimmed on their own.
pub fn dedent_commands<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let lines = lines.into_iter();
    let min = lines
        .clone()
        .filter(|l| !l.trim().is_empty() && !is_comment(l))
        .map(indent_of)
        .min()
        .unwrap_or(0);
    lines
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else if is_comment(l) {
                l.trim().to_string()
            } else {
                strip_chars(l, min).to_string()
            }
        })
        .collect()
}
