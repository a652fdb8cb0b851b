//! YAML configuration parsing for binding documents
//!
//! Parses binding YAML into `KeyBinding`s, and key strings like
//! `ctrl+shift+s` into `KeyCombination`s.
//!
//! ```yaml
//! bindings:
//!   - key: cmd+s
//!     action: Save
//!   - key: z
//!     action: Key1
//!     ruleset: taiko
//!     variant: 0
//!   - key: cmd+q
//!     action: QuickExit
//!     platform: macos
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::binding::KeyBinding;
use super::types::{InputKey, KeyCombination};

/// Root structure of a binding YAML file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    pub action: String,
    /// Ruleset short name; absent for global bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// A parsed binding together with the scope it was declared for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedBinding<A> {
    pub ruleset: Option<String>,
    pub variant: Option<i32>,
    pub binding: KeyBinding<A>,
}

/// Load bindings from a YAML file
pub fn load_keymap_file<A: Action>(path: &Path) -> Result<Vec<ScopedBinding<A>>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse bindings from YAML string
///
/// Entries for another platform are skipped.
pub fn parse_keymap_yaml<A: Action>(yaml: &str) -> Result<Vec<ScopedBinding<A>>, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let current_platform = get_current_platform();
    let mut bindings = Vec::with_capacity(config.bindings.len());

    for entry in config.bindings {
        if let Some(ref platform) = entry.platform {
            if platform != current_platform {
                continue;
            }
        }

        let combination = parse_combination(&entry.key)?;
        let action = parse_action(&entry.action)?;

        bindings.push(ScopedBinding {
            ruleset: entry.ruleset,
            variant: entry.variant,
            binding: KeyBinding::new(combination, action),
        });
    }

    Ok(bindings)
}

/// Serialize bindings for one scope back into a YAML document
pub fn to_keymap_yaml<A: Action>(
    bindings: &[KeyBinding<A>],
    ruleset: Option<&str>,
    variant: Option<i32>,
) -> Result<String, KeymapError> {
    let config = KeymapConfig {
        bindings: bindings
            .iter()
            .map(|b| BindingConfig {
                key: b.combination.to_string(),
                action: b.action.to_string(),
                ruleset: ruleset.map(str::to_string),
                variant,
                platform: None,
            })
            .collect(),
    };
    serde_yaml::to_string(&config).map_err(|e| KeymapError::ParseError(e.to_string()))
}

/// Parse a key string like "cmd+shift+s" into a KeyCombination
pub fn parse_combination(key_str: &str) -> Result<KeyCombination, KeymapError> {
    let trimmed = key_str.trim();
    if trimmed.is_empty() {
        return Err(KeymapError::InvalidKey(key_str.to_string()));
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(KeyCombination::none());
    }

    let mut combination = KeyCombination::none();
    for part in trimmed.split('+') {
        let key = parse_input_key(part)?;
        if !combination.insert(key) {
            return Err(KeymapError::InvalidKey(format!(
                "Duplicate key in binding: {}",
                key_str
            )));
        }
    }

    Ok(combination)
}

/// Parse a single key name
///
/// Accepts every form `InputKey`'s `Display` produces, plus aliases.
pub fn parse_input_key(key: &str) -> Result<InputKey, KeymapError> {
    let trimmed = key.trim();

    // Single character, checked before lowercasing so multi-char lowercase
    // forms stay intact
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(InputKey::char(c));
    }

    let key = trimmed.to_lowercase();

    // Escaped character: U{A0}
    if let Some(hex) = key.strip_prefix("u{").and_then(|rest| rest.strip_suffix('}')) {
        if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            return Ok(InputKey::char(c));
        }
    }

    if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return Ok(InputKey::F(n));
    }

    for prefix in ["numpad", "num"] {
        if let Some(n) = key.strip_prefix(prefix).and_then(|n| n.parse::<u8>().ok()) {
            return Ok(InputKey::Numpad(n));
        }
    }

    if let Some(n) = key.strip_prefix("mouse").and_then(|n| n.parse::<u8>().ok()) {
        return Ok(InputKey::MouseButton(n));
    }

    match key.as_str() {
        // Platform command key
        "cmd" => Ok(if cfg!(target_os = "macos") {
            InputKey::Super
        } else {
            InputKey::Control
        }),
        "ctrl" | "control" => Ok(InputKey::Control),
        "shift" => Ok(InputKey::Shift),
        "alt" | "option" | "opt" => Ok(InputKey::Alt),
        "meta" | "super" | "win" => Ok(InputKey::Super),

        "enter" | "return" => Ok(InputKey::Enter),
        "escape" | "esc" => Ok(InputKey::Escape),
        "tab" => Ok(InputKey::Tab),
        "backspace" | "back" => Ok(InputKey::Backspace),
        "delete" | "del" => Ok(InputKey::Delete),
        "space" => Ok(InputKey::Space),
        "plus" => Ok(InputKey::Char('+')),

        "up" | "arrowup" => Ok(InputKey::Up),
        "down" | "arrowdown" => Ok(InputKey::Down),
        "left" | "arrowleft" => Ok(InputKey::Left),
        "right" | "arrowright" => Ok(InputKey::Right),

        "home" => Ok(InputKey::Home),
        "end" => Ok(InputKey::End),
        "pageup" | "pgup" => Ok(InputKey::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(InputKey::PageDown),
        "insert" | "ins" => Ok(InputKey::Insert),

        "numpad_add" | "numadd" | "numplus" => Ok(InputKey::NumpadAdd),
        "numpad_subtract" | "numsub" | "numminus" => Ok(InputKey::NumpadSubtract),
        "numpad_multiply" | "nummul" => Ok(InputKey::NumpadMultiply),
        "numpad_divide" | "numdiv" => Ok(InputKey::NumpadDivide),
        "numpad_enter" | "numenter" => Ok(InputKey::NumpadEnter),
        "numpad_decimal" | "numdot" => Ok(InputKey::NumpadDecimal),

        "mouseleft" | "lmb" => Ok(InputKey::MouseLeft),
        "mouseright" | "rmb" => Ok(InputKey::MouseRight),
        "mousemiddle" | "mmb" => Ok(InputKey::MouseMiddle),
        "wheelup" | "mousewheelup" => Ok(InputKey::MouseWheelUp),
        "wheeldown" | "mousewheeldown" => Ok(InputKey::MouseWheelDown),

        _ => Err(KeymapError::InvalidKey(format!("Unknown key: {}", key))),
    }
}

/// Parse an action name string into an action of type `A`
fn parse_action<A: Action>(action: &str) -> Result<A, KeymapError> {
    action
        .parse::<A>()
        .map_err(|_| KeymapError::InvalidAction(action.to_string()))
}

/// Get the current platform identifier
fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Errors that can occur when parsing binding documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
    InvalidAction(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
            KeymapError::InvalidAction(a) => write!(f, "Invalid action: {}", a),
        }
    }
}

impl std::error::Error for KeymapError {}
