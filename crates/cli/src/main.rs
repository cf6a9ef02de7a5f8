//! `keyscript` command-line interface.

mod render;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use keyscript_core::{
    SimConfig, Simulation, compile_with_registry, preview_at_line, simulate, to_pretty_json,
};
use keyscript_diagnostics::{self as diag, Summary};
use keyscript_profile::{ProfileRegistry, ToolProfile, builtin, load_profile_from_str};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keyscript",
    version,
    about = "Compile keyscript typing scripts into keystroke streams and preview the result"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Extra tool profile (JSON) layered over the built-in registry.
    /// May be given more than once; later files replace earlier ones.
    #[arg(long = "profile", global = true, value_name = "FILE")]
    profiles: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compile a script and print its keystroke stream.
    Compile {
        /// Script file, or `-` for stdin.
        file: String,
        /// Print the stream as raw characters instead of escaped text.
        #[arg(long)]
        raw: bool,
        /// Write the raw stream to this file instead of stdout.
        #[arg(long, short, value_name = "PATH")]
        write: Option<PathBuf>,
    },

    /// Report diagnostics for a script without printing the stream.
    Check {
        /// Script file, or `-` for stdin.
        file: String,
        /// Exit with status 1 when any warning is reported. For CI.
        #[arg(long)]
        strict: bool,
    },

    /// Dump the sections of a script as JSON.
    Sections {
        /// Script file, or `-` for stdin.
        file: String,
    },

    /// Run a script through the buffer interpreter and print the result.
    Simulate {
        /// Script file, or `-` for stdin.
        file: String,
        /// Preview the state after this line (1-based) instead of the
        /// whole script.
        #[arg(long, value_name = "N", conflicts_with = "stream")]
        line: Option<usize>,
        /// Treat the input as an escaped keystroke stream rather than a
        /// script.
        #[arg(long)]
        stream: bool,
        /// Columns inserted for a tab.
        #[arg(long, default_value_t = SimConfig::default().tab_width)]
        tab_width: usize,
        /// Lines moved by page up / page down.
        #[arg(long, default_value_t = SimConfig::default().page_size)]
        page_size: usize,
        /// Glyph drawn at the cursor position.
        #[arg(long, default_value_t = SimConfig::default().cursor_marker)]
        marker: char,
        /// Print the buffer text without the cursor marker.
        #[arg(long)]
        plain: bool,
    },

    /// List registered tool profiles, or show one in detail.
    Profiles {
        /// Profile id to show (case-insensitive).
        id: Option<String>,
    },

    /// Explain a diagnostic ID (e.g. KS2001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{e:#}"),
                });
                let json = serde_json::to_string_pretty(&out)
                    .expect("envelope JSON serialization cannot fail");
                println!("{json}");
            }
            Format::Pretty => eprintln!("error: {e:#}"),
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli, format: Format) -> Result<()> {
    let registry = load_registry(&cli.profiles)?;

    match cli.cmd {
        Cmd::Compile { file, raw, write } => {
            cmd_compile(&file, raw, write.as_deref(), &registry, format)
        }
        Cmd::Check { file, strict } => cmd_check(&file, strict, &registry, format),
        Cmd::Sections { file } => cmd_sections(&file, &registry, format),
        Cmd::Simulate {
            file,
            line,
            stream,
            tab_width,
            page_size,
            marker,
            plain,
        } => {
            let config = SimConfig {
                tab_width,
                page_size,
                cursor_marker: marker,
            };
            if stream {
                cmd_simulate_stream(&file, &config, plain, format)
            } else {
                cmd_simulate(&file, line, &config, plain, &registry, format)
            }
        }
        Cmd::Profiles { id } => cmd_profiles(id.as_deref(), &registry, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_compile(
    file: &str,
    raw: bool,
    write: Option<&Path>,
    registry: &ProfileRegistry,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;
    let res = compile_with_registry(&input, registry);
    let escaped = keyscript_stream::escape(&res.stream);

    if let Some(path) = write {
        fs::write(path, &res.stream)
            .with_context(|| format!("failed to write stream to '{}'", path.display()))?;
        tracing::info!(path = %path.display(), bytes = res.stream.len(), "wrote stream");
    }

    match format {
        Format::Json => {
            let mut out = serde_json::json!({
                "stream": res.stream,
                "escaped": escaped,
                "diagnostics": res.diagnostics,
                "summary": Summary::of(&res.diagnostics),
            });
            if let Some(path) = write {
                out["written"] = serde_json::json!(path.display().to_string());
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, file, &res.diagnostics);
            print_summary(&res.diagnostics);
            match write {
                Some(path) => eprintln!("wrote {}", path.display()),
                None if raw => print!("{}", res.stream),
                None => println!("{escaped}"),
            }
        }
    }
    Ok(())
}

fn cmd_check(file: &str, strict: bool, registry: &ProfileRegistry, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = compile_with_registry(&input, registry);
    let summary = Summary::of(&res.diagnostics);
    // Info notes never fail a check.
    let ok = summary.errors + summary.warnings == 0;

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "diagnostics": res.diagnostics,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, file, &res.diagnostics);
            print_summary(&res.diagnostics);
            if ok {
                eprintln!("check ok");
            }
        }
    }

    if strict && !ok {
        process::exit(1);
    }
    Ok(())
}

fn cmd_sections(file: &str, registry: &ProfileRegistry, format: Format) -> Result<()> {
    let input = read_input(file)?;
    let res = compile_with_registry(&input, registry);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "sections": res.sections,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Sections to stdout, diagnostics to stderr.
            println!("{}", to_pretty_json(&res.sections));
            render_diagnostics(&input, file, &res.diagnostics);
            print_summary(&res.diagnostics);
        }
    }
    Ok(())
}

fn cmd_simulate(
    file: &str,
    line: Option<usize>,
    config: &SimConfig,
    plain: bool,
    registry: &ProfileRegistry,
    format: Format,
) -> Result<()> {
    let input = read_input(file)?;

    let (simulation, script, diagnostics) = match line {
        Some(0) => bail!("--line is 1-based; got 0"),
        Some(n) => {
            let p = preview_at_line(&input, n - 1, registry, config);
            (p.simulation, Some(p.script), p.diagnostics)
        }
        None => {
            let res = compile_with_registry(&input, registry);
            (simulate(&res.stream, config), None, res.diagnostics)
        }
    };

    match format {
        Format::Json => {
            let mut out = simulation_json(&simulation, config);
            out["diagnostics"] = serde_json::to_value(&diagnostics)?;
            if let Some(script) = script {
                out["script"] = serde_json::json!(script);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Preview spans point into the reconstructed prefix, not the file.
            match (&script, line) {
                (Some(prefix), Some(n)) => {
                    let name = format!("{file} (through line {n})");
                    render_diagnostics(prefix, &name, &diagnostics);
                }
                _ => render_diagnostics(&input, file, &diagnostics),
            }
            print_summary(&diagnostics);
            print_lines(&simulation, config, plain);
        }
    }
    Ok(())
}

fn cmd_simulate_stream(file: &str, config: &SimConfig, plain: bool, format: Format) -> Result<()> {
    let input = read_input(file)?;
    // Escaped stream files usually end with the newline the editor added.
    let stream = keyscript_stream::unescape(input.strip_suffix('\n').unwrap_or(&input));
    keyscript_stream::validate(&stream).with_context(|| format!("invalid stream in '{file}'"))?;
    let simulation = simulate(&stream, config);

    match format {
        Format::Json => {
            let out = simulation_json(&simulation, config);
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => print_lines(&simulation, config, plain),
    }
    Ok(())
}

/// One registered profile as listed by `keyscript profiles`.
#[derive(Serialize)]
struct ProfileListing<'a> {
    id: &'a str,
    description: Option<&'a str>,
    commands: usize,
    macros: usize,
}

impl<'a> From<&'a ToolProfile> for ProfileListing<'a> {
    fn from(p: &'a ToolProfile) -> Self {
        Self {
            id: &p.id,
            description: p.description.as_deref(),
            commands: p.commands.len(),
            macros: p.macros.len(),
        }
    }
}

fn cmd_profiles(id: Option<&str>, registry: &ProfileRegistry, format: Format) -> Result<()> {
    let Some(id) = id else {
        let listing: Vec<ProfileListing<'_>> =
            registry.profiles.iter().map(ProfileListing::from).collect();
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "schema_version": registry.schema_version,
                    "generic_commands": registry.generic.len(),
                    "profiles": listing,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            Format::Pretty => {
                println!("generic ({} commands)", registry.generic.len());
                for p in &listing {
                    println!(
                        "{:<10} {:>3} commands {:>3} macros  {}",
                        p.id,
                        p.commands,
                        p.macros,
                        p.description.unwrap_or("")
                    );
                }
            }
        }
        return Ok(());
    };

    let profile = registry.get(id).with_context(|| {
        let known: Vec<&str> = registry.ids().collect();
        format!("unknown profile '{id}' (known: {})", known.join(", "))
    })?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(profile)?),
        Format::Pretty => {
            use ariadne::Fmt;
            println!("{}", profile.id.as_str().fg(ariadne::Color::Cyan));
            if let Some(desc) = &profile.description {
                println!("{desc}");
            }
            if !profile.commands.is_empty() {
                println!("\ncommands:");
                for (name, expansion) in &profile.commands {
                    println!("  {name:<20} {}", keyscript_stream::escape(expansion));
                }
            }
            if !profile.macros.is_empty() {
                println!("\nmacros:");
                for (name, expansion) in &profile.macros {
                    println!("  {{{{{name}}}}} {}", keyscript_stream::escape(expansion));
                }
            }
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "severity": diag::default_severity(id),
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read a script or stream from a path, or stdin for `-`.
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read '{file}'"))
}

/// Built-in registry with each `--profile` file layered on top.
fn load_registry(paths: &[PathBuf]) -> Result<ProfileRegistry> {
    let mut registry = builtin().clone();
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile file '{}'", path.display()))?;
        let profile = load_profile_from_str(&text)
            .with_context(|| format!("invalid profile file '{}'", path.display()))?;
        tracing::info!(id = %profile.id, path = %path.display(), "loaded profile");
        registry = registry.with_profile(profile);
    }
    Ok(registry)
}

fn simulation_json(simulation: &Simulation, config: &SimConfig) -> serde_json::Value {
    serde_json::json!({
        "lines": simulation.lines,
        "cursor": simulation.cursor,
        "rendered": simulation.render(config.cursor_marker),
        "text": simulation.text(),
    })
}

fn print_lines(simulation: &Simulation, config: &SimConfig, plain: bool) {
    if plain {
        println!("{}", simulation.text());
        return;
    }
    for line in simulation.render(config.cursor_marker) {
        println!("{line}");
    }
}
