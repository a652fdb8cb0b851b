//! Logical actions that bindings resolve to
//!
//! The resolver is generic over the action type. Any closed set of actions
//! works as long as it can be named: persisted records store the action by
//! name and parse it back when detached.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// A logical action from a closed, context-defined set
pub trait Action:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + FromStr + Send + Sync + 'static
{
    /// Every action in the set, in declaration order
    fn all() -> &'static [Self];
}

/// Defines an action enum with `Display`/`FromStr` through its variant names
macro_rules! action_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = UnknownAction;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok($name::$variant),)+
                    _ => Err(UnknownAction(s.to_string())),
                }
            }
        }

        impl Action for $name {
            fn all() -> &'static [Self] {
                Self::ALL
            }
        }
    };
}

/// An action name that does not belong to the requested action set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

action_set! {
    /// Actions available everywhere, regardless of the active ruleset
    pub enum GlobalAction {
        /// Save the current item
        Save,
        /// Save the current item under a new name
        SaveAs,
        Undo,
        Redo,
        Back,
        Select,
        SelectNext,
        SelectPrevious,
        ToggleSettings,
        ToggleChat,
        ToggleMute,
        IncreaseVolume,
        DecreaseVolume,
        TakeScreenshot,
        /// Hold to leave the current screen
        QuickExit,
    }
}

action_set! {
    /// Actions used during gameplay by rulesets with up to four input lanes
    pub enum GameplayAction {
        Key1,
        Key2,
        Key3,
        Key4,
        Pause,
        Retry,
        SkipCutscene,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_name_round_trip() {
        for action in GlobalAction::ALL {
            assert_eq!(action.name().parse::<GlobalAction>(), Ok(*action));
        }
    }

    #[test]
    fn test_unknown_action() {
        let err = "Key1".parse::<GlobalAction>().unwrap_err();
        assert_eq!(err, UnknownAction("Key1".to_string()));
        assert!("Key1".parse::<GameplayAction>().is_ok());
    }

    #[test]
    fn test_all_preserves_declaration_order() {
        assert_eq!(GameplayAction::all().first(), Some(&GameplayAction::Key1));
        assert_eq!(GlobalAction::all().last(), Some(&GlobalAction::QuickExit));
    }
}
