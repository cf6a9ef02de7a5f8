//! Tool profiles and command tables for the keyscript toolchain.
//!
//! A [`ToolProfile`] names a tool (`VIM`, `PYTHON`, ...) and carries two
//! tables: code macros expanded from `{{NAME}}` inside `<CODE: TOOL>`
//! sections, and commands that override or extend the generic command table
//! inside `<COMMANDS: TOOL>` sections. A [`ProfileRegistry`] holds the
//! generic table and every known profile; [`builtin`] returns the one
//! embedded in the binary.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use keyscript_stream::StreamError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// JSON deserialization failed.
    #[error("invalid profile JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is not acceptable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A command or macro expands to a malformed token sequence.
    #[error("invalid expansion for {table}.{name}: {source}")]
    InvalidExpansion {
        /// `"<PROFILE>.commands"`, `"<PROFILE>.macros"`, or `"generic"`.
        table: String,
        /// Command or macro name.
        name: String,
        /// Underlying stream error.
        source: StreamError,
    },
}

// ── ToolProfile ──────────────────────────────────────────────────────────

/// Macro and command tables for one tool.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// let profile = keyscript_profile::ToolProfile {
///     id: "NANO".into(),
///     description: None,
///     macros: BTreeMap::new(),
///     commands: BTreeMap::from([("SAVE".into(), "\u{7}s".into())]),
/// };
/// assert_eq!(profile.command("save"), Some("\u{7}s"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolProfile {
    /// Tool name as written after the colon in a section tag. Upper-case.
    pub id: String,
    /// Short human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `{{NAME}}` → expansion. Names are case-sensitive.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub macros: BTreeMap<String, String>,
    /// Command name → canonical token sequence. Names are upper-case.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, String>,
}

impl ToolProfile {
    /// Look up a command by name, case-insensitively.
    pub fn command(&self, name: &str) -> Option<&str> {
        self.commands
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Look up a macro expansion by its exact name.
    pub fn macro_expansion(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }
}

// ── ProfileRegistry ──────────────────────────────────────────────────────

/// The generic command table and all registered tool profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRegistry {
    /// Registry schema version (e.g., `"1.0.0"`).
    pub schema_version: String,
    /// Commands available in every `<COMMANDS>` section.
    pub generic: BTreeMap<String, String>,
    /// Tool profiles, unique by upper-cased id.
    #[serde(default)]
    pub profiles: Vec<ToolProfile>,
}

impl ProfileRegistry {
    /// Find a profile by tool name, case-insensitively.
    pub fn get(&self, tool: &str) -> Option<&ToolProfile> {
        self.profiles
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(tool))
    }

    /// Return a copy of this registry with `profile` added, replacing any
    /// profile with the same id.
    pub fn with_profile(mut self, profile: ToolProfile) -> Self {
        match self
            .profiles
            .iter_mut()
            .find(|p| p.id.eq_ignore_ascii_case(&profile.id))
        {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
        self
    }

    /// Ids of all registered profiles, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.id.as_str())
    }

    /// The command table for a section tagged with `tool`.
    ///
    /// Unregistered or absent tools get the generic table alone.
    pub fn command_table(&self, tool: Option<&str>) -> CommandTable<'_> {
        CommandTable {
            generic: &self.generic,
            tool: tool.and_then(|t| self.get(t)),
        }
    }
}

/// Generic commands layered under one tool's commands.
#[derive(Debug, Clone, Copy)]
pub struct CommandTable<'a> {
    generic: &'a BTreeMap<String, String>,
    tool: Option<&'a ToolProfile>,
}

impl<'a> CommandTable<'a> {
    /// Resolve an upper-cased command name. Tool entries win.
    pub fn resolve(&self, name: &str) -> Option<&'a str> {
        self.tool
            .and_then(|p| p.commands.get(name))
            .or_else(|| self.generic.get(name))
            .map(String::as_str)
    }

    /// The tool profile layered on top, if any.
    pub fn tool(&self) -> Option<&'a ToolProfile> {
        self.tool
    }
}

// ── Built-in registry ────────────────────────────────────────────────────

static BUILTIN: OnceLock<ProfileRegistry> = OnceLock::new();

/// The registry embedded from `data/builtin.json`.
///
/// Parsed and validated once, on first use.
pub fn builtin() -> &'static ProfileRegistry {
    BUILTIN.get_or_init(|| {
        let json = include_str!("../data/builtin.json");
        let registry = load_registry_from_str(json)
            .expect("embedded builtin.json is invalid; this is a build bug");
        tracing::debug!(
            profiles = registry.profiles.len(),
            generic = registry.generic.len(),
            "built-in profile registry loaded"
        );
        registry
    })
}

// ── Loading ──────────────────────────────────────────────────────────────

/// Load and validate a single [`ToolProfile`] from JSON.
///
/// - `id` must be non-empty and match `[A-Za-z0-9_-]+`; it is upper-cased
/// - command names must be non-empty without whitespace; they are upper-cased
///   and must stay unique afterwards
/// - macro names must be non-empty without whitespace or braces
/// - every expansion must be a well-formed token sequence
pub fn load_profile_from_str(s: &str) -> Result<ToolProfile, ProfileError> {
    let profile: ToolProfile = serde_json::from_str(s)?;
    normalize_profile(profile)
}

/// Load and validate a whole [`ProfileRegistry`] from JSON.
///
/// Each profile is checked as in [`load_profile_from_str`]; the generic
/// table follows the same rules as profile commands, and profile ids must
/// be unique.
pub fn load_registry_from_str(s: &str) -> Result<ProfileRegistry, ProfileError> {
    let raw: ProfileRegistry = serde_json::from_str(s)?;

    if raw.schema_version.trim().is_empty() {
        return Err(ProfileError::InvalidField {
            field: "schema_version".into(),
            reason: "must not be empty".into(),
        });
    }

    let generic = normalize_commands("generic", raw.generic)?;

    let mut profiles: Vec<ToolProfile> = Vec::with_capacity(raw.profiles.len());
    for profile in raw.profiles {
        let profile = normalize_profile(profile)?;
        if profiles.iter().any(|p| p.id == profile.id) {
            return Err(ProfileError::InvalidField {
                field: "profiles".into(),
                reason: format!("duplicate profile id '{}'", profile.id),
            });
        }
        profiles.push(profile);
    }

    Ok(ProfileRegistry {
        schema_version: raw.schema_version,
        generic,
        profiles,
    })
}

fn normalize_profile(profile: ToolProfile) -> Result<ToolProfile, ProfileError> {
    let id = profile.id.trim();
    if id.is_empty() {
        return Err(ProfileError::InvalidField {
            field: "id".into(),
            reason: "must not be empty".into(),
        });
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(ProfileError::InvalidField {
            field: "id".into(),
            reason: format!("'{id}' may only contain letters, digits, '_' and '-'"),
        });
    }
    let id = id.to_ascii_uppercase();

    for (name, expansion) in &profile.macros {
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '{' || c == '}') {
            return Err(ProfileError::InvalidField {
                field: format!("{id}.macros"),
                reason: format!("'{name}' is not a valid macro name"),
            });
        }
        check_expansion(&format!("{id}.macros"), name, expansion)?;
    }

    let commands = normalize_commands(&format!("{id}.commands"), profile.commands)?;

    Ok(ToolProfile {
        id,
        description: profile.description,
        macros: profile.macros,
        commands,
    })
}

fn normalize_commands(
    table: &str,
    commands: BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ProfileError> {
    let mut out = BTreeMap::new();
    for (name, expansion) in commands {
        if name.is_empty() || name.chars().any(char::is_whitespace) || name.starts_with('#') {
            return Err(ProfileError::InvalidField {
                field: table.to_string(),
                reason: format!("'{name}' is not a valid command name"),
            });
        }
        check_expansion(table, &name, &expansion)?;
        let upper = name.to_ascii_uppercase();
        if out.insert(upper.clone(), expansion).is_some() {
            return Err(ProfileError::InvalidField {
                field: table.to_string(),
                reason: format!("duplicate command '{upper}'"),
            });
        }
    }
    Ok(out)
}

fn check_expansion(table: &str, name: &str, expansion: &str) -> Result<(), ProfileError> {
    keyscript_stream::validate(expansion).map_err(|source| ProfileError::InvalidExpansion {
        table: table.to_string(),
        name: name.to_string(),
        source,
    })
}
