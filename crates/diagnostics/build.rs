//! Build script for generating diagnostic code tables at compile time.
//!
//! Reads `data/diagnostics.json` and writes into `OUT_DIR`:
//! - `generated_codes.rs`: one `pub const` per diagnostic plus `ALL`
//! - `generated_explain.rs`: id → long description
//! - `generated_severity.rs`: id → default severity

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let table_path = Path::new("data/diagnostics.json");
    println!("cargo:rerun-if-changed={}", table_path.display());

    let raw = fs::read_to_string(table_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", table_path.display()));

    let table: serde_json::Value =
        serde_json::from_str(&raw).expect("failed to parse diagnostics.json");

    let diagnostics = table["diagnostics"]
        .as_array()
        .expect("diagnostics.json: expected `diagnostics` array");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let out_path = Path::new(&out_dir);

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    let mut entries = Vec::with_capacity(diagnostics.len());

    for (i, entry) in diagnostics.iter().enumerate() {
        let id = entry["id"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] missing `id`"));
        let const_name = entry["constName"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] ({id}) missing `constName`"));
        let summary = entry["summary"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] ({id}) missing `summary`"));
        let description = entry["description"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] ({id}) missing `description`"));
        let severity = match entry["severity"].as_str() {
            Some("error") => "Severity::Error",
            Some("warn") => "Severity::Warn",
            Some("info") => "Severity::Info",
            other => panic!("diagnostics[{i}] ({id}): invalid severity {other:?}"),
        };
        assert!(
            entry["contextKeys"].is_array(),
            "diagnostics[{i}] ({id}) missing `contextKeys`"
        );

        assert!(
            id.len() == 6 && id.starts_with("KS") && id[2..].bytes().all(|b| b.is_ascii_digit()),
            "diagnostics[{i}]: id '{id}' must look like KSnnnn"
        );
        assert!(
            !const_name.is_empty()
                && const_name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
                && const_name.as_bytes()[0].is_ascii_uppercase(),
            "diagnostics[{i}] ({id}): constName '{const_name}' is not SCREAMING_SNAKE_CASE"
        );
        assert!(seen_ids.insert(id), "diagnostics[{i}]: duplicate id '{id}'");
        assert!(
            seen_names.insert(const_name),
            "diagnostics[{i}] ({id}): duplicate constName '{const_name}'"
        );

        entries.push((id, const_name, summary, description, severity));
    }

    // ── generated_codes.rs ──────────────────────────────────────────────
    let mut codes = String::from("// Generated from data/diagnostics.json. Do not edit.\n\n");
    for (id, const_name, summary, _, _) in &entries {
        codes.push_str(&format!("/// {summary}\n"));
        codes.push_str(&format!("pub const {const_name}: &str = \"{id}\";\n\n"));
    }
    codes.push_str("/// Every known diagnostic code, in table order.\n");
    codes.push_str("pub const ALL: &[&str] = &[\n");
    for (_, const_name, _, _, _) in &entries {
        codes.push_str(&format!("    {const_name},\n"));
    }
    codes.push_str("];\n");
    fs::write(out_path.join("generated_codes.rs"), &codes)
        .expect("failed to write generated_codes.rs");

    // ── generated_explain.rs ────────────────────────────────────────────
    let mut explain = String::from("match id {\n");
    for (id, _, _, description, _) in &entries {
        let escaped = escape_rust_string_literal(description);
        explain.push_str(&format!("    \"{id}\" => Some(\"{escaped}\"),\n"));
    }
    explain.push_str("    _ => None,\n}\n");
    fs::write(out_path.join("generated_explain.rs"), &explain)
        .expect("failed to write generated_explain.rs");

    // ── generated_severity.rs ───────────────────────────────────────────
    let mut severity = String::from("match id {\n");
    for (id, _, _, _, sev) in &entries {
        severity.push_str(&format!("    \"{id}\" => Some({sev}),\n"));
    }
    severity.push_str("    _ => None,\n}\n");
    fs::write(out_path.join("generated_severity.rs"), &severity)
        .expect("failed to write generated_severity.rs");
}

fn escape_rust_string_literal(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
