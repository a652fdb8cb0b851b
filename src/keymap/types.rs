//! Core types for physical input: InputKey and KeyCombination

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::config::KeymapError;

/// A physical key or button that can be held down
///
/// Modifier keys are ordinary members of a combination; the derived `Ord`
/// puts them first so combinations print as `Ctrl+Shift+S`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputKey {
    // Modifiers
    Control,
    Shift,
    Alt,
    Super,

    /// A character key; combinations hold it in [`InputKey::normalized`] form
    Char(char),

    // Named keys
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8),

    // Numpad (physical keys)
    Numpad(u8),
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
    NumpadDecimal,

    // Mouse buttons
    MouseLeft,
    MouseRight,
    MouseMiddle,
    MouseButton(u8),
    MouseWheelUp,
    MouseWheelDown,
}

impl InputKey {
    /// Create a character key in canonical form
    pub fn char(c: char) -> Self {
        InputKey::Char(c).normalized()
    }

    /// The canonical form of a key
    ///
    /// Characters with a named key of their own (space, tab, newline) become
    /// that key, and letters are lowercased when that maps to one character.
    pub fn normalized(self) -> Self {
        match self {
            InputKey::Char(' ') => InputKey::Space,
            InputKey::Char('\t') => InputKey::Tab,
            InputKey::Char('\n' | '\r') => InputKey::Enter,
            InputKey::Char(c) => {
                let mut lower = c.to_lowercase();
                match (lower.next(), lower.next()) {
                    (Some(l), None) => InputKey::Char(l),
                    _ => InputKey::Char(c),
                }
            }
            other => other,
        }
    }

    /// Check if this is one of the modifier keys
    #[inline]
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            InputKey::Control | InputKey::Shift | InputKey::Alt | InputKey::Super
        )
    }

    /// Check if this is a mouse button or wheel direction
    #[inline]
    pub const fn is_mouse(self) -> bool {
        matches!(
            self,
            InputKey::MouseLeft
                | InputKey::MouseRight
                | InputKey::MouseMiddle
                | InputKey::MouseButton(_)
                | InputKey::MouseWheelUp
                | InputKey::MouseWheelDown
        )
    }
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKey::Control => write!(f, "Ctrl"),
            InputKey::Shift => write!(f, "Shift"),
            InputKey::Alt => write!(f, "Alt"),
            InputKey::Super => write!(f, "Super"),
            InputKey::Char('+') => write!(f, "Plus"),
            InputKey::Char(c) if c.is_whitespace() || c.is_control() => {
                write!(f, "U{{{:X}}}", *c as u32)
            }
            InputKey::Char(c) => {
                // Uppercase only when lowercasing gives the same key back
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(u), None) if InputKey::char(u) == InputKey::Char(*c) => {
                        write!(f, "{}", u)
                    }
                    _ => write!(f, "{}", c),
                }
            }
            InputKey::Enter => write!(f, "Enter"),
            InputKey::Escape => write!(f, "Escape"),
            InputKey::Tab => write!(f, "Tab"),
            InputKey::Backspace => write!(f, "Backspace"),
            InputKey::Delete => write!(f, "Delete"),
            InputKey::Space => write!(f, "Space"),
            InputKey::Up => write!(f, "Up"),
            InputKey::Down => write!(f, "Down"),
            InputKey::Left => write!(f, "Left"),
            InputKey::Right => write!(f, "Right"),
            InputKey::Home => write!(f, "Home"),
            InputKey::End => write!(f, "End"),
            InputKey::PageUp => write!(f, "PageUp"),
            InputKey::PageDown => write!(f, "PageDown"),
            InputKey::Insert => write!(f, "Insert"),
            InputKey::F(n) => write!(f, "F{}", n),
            InputKey::Numpad(n) => write!(f, "Num{}", n),
            InputKey::NumpadAdd => write!(f, "NumAdd"),
            InputKey::NumpadSubtract => write!(f, "NumSub"),
            InputKey::NumpadMultiply => write!(f, "NumMul"),
            InputKey::NumpadDivide => write!(f, "NumDiv"),
            InputKey::NumpadEnter => write!(f, "NumEnter"),
            InputKey::NumpadDecimal => write!(f, "NumDot"),
            InputKey::MouseLeft => write!(f, "MouseLeft"),
            InputKey::MouseRight => write!(f, "MouseRight"),
            InputKey::MouseMiddle => write!(f, "MouseMiddle"),
            InputKey::MouseButton(n) => write!(f, "Mouse{}", n),
            InputKey::MouseWheelUp => write!(f, "WheelUp"),
            InputKey::MouseWheelDown => write!(f, "WheelDown"),
        }
    }
}

impl FromStr for InputKey {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::config::parse_input_key(s)
    }
}

/// A set of physical keys held simultaneously
///
/// Order of insertion is irrelevant: `Ctrl+S` and `S+Ctrl` are the same
/// combination. Keys are stored normalized, so the display form always
/// parses back to an equal combination.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCombination {
    keys: BTreeSet<InputKey>,
}

impl KeyCombination {
    /// Create a combination from any collection of keys
    pub fn new(keys: impl IntoIterator<Item = InputKey>) -> Self {
        Self {
            keys: keys.into_iter().map(InputKey::normalized).collect(),
        }
    }

    /// Create a combination holding a single key
    pub fn single(key: InputKey) -> Self {
        Self::new([key])
    }

    /// The combination with no keys; never matches anything
    pub fn none() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = InputKey> + '_ {
        self.keys.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: InputKey) -> bool {
        self.keys.contains(&key.normalized())
    }

    /// Add a key to the combination (builder pattern)
    pub fn with(mut self, key: InputKey) -> Self {
        self.insert(key);
        self
    }

    /// Check if every key of this combination is held in `pressed`
    pub fn is_subset_of(&self, pressed: &KeyCombination) -> bool {
        self.keys.is_subset(&pressed.keys)
    }

    pub(crate) fn insert(&mut self, key: InputKey) -> bool {
        self.keys.insert(key.normalized())
    }

    pub(crate) fn remove(&mut self, key: InputKey) -> bool {
        self.keys.remove(&key.normalized())
    }

    pub(crate) fn clear(&mut self) {
        self.keys.clear();
    }

    /// Display the combination using platform-specific modifier names
    pub fn display_string(&self) -> String {
        self.keys
            .iter()
            .map(|key| match key {
                InputKey::Super if cfg!(target_os = "macos") => "Cmd".to_string(),
                InputKey::Alt if cfg!(target_os = "macos") => "Option".to_string(),
                InputKey::Super if cfg!(target_os = "windows") => "Win".to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("+")
    }
}

impl FromIterator<InputKey> for KeyCombination {
    fn from_iter<T: IntoIterator<Item = InputKey>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.keys.is_empty() {
            return write!(f, "None");
        }
        let mut first = true;
        for key in &self.keys {
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", key)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for KeyCombination {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::config::parse_combination(s)
    }
}

impl Serialize for KeyCombination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCombination {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
