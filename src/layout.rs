// src/layout.rs

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::WorkbenchError;

/// Display modes a container can switch on and off.
///
/// Flags are independent; if several are set the page stylesheet decides
/// which one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutFlag {
    Maximize,
    PinLeft,
    PinRight,
    Overlay,
    Fullscreen,
}

impl LayoutFlag {
    pub const ALL: [LayoutFlag; 5] = [
        LayoutFlag::Maximize,
        LayoutFlag::PinLeft,
        LayoutFlag::PinRight,
        LayoutFlag::Overlay,
        LayoutFlag::Fullscreen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutFlag::Maximize => "maximize",
            LayoutFlag::PinLeft => "pinLeft",
            LayoutFlag::PinRight => "pinRight",
            LayoutFlag::Overlay => "overlay",
            LayoutFlag::Fullscreen => "fullscreen",
        }
    }

    /// Button caption on the page.
    pub fn label(&self) -> &'static str {
        match self {
            LayoutFlag::Maximize => "Max/min",
            LayoutFlag::PinLeft => "←",
            LayoutFlag::PinRight => "→",
            LayoutFlag::Overlay => "Overlay",
            LayoutFlag::Fullscreen => "Fullscreen",
        }
    }
}

impl fmt::Display for LayoutFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutFlag {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| WorkbenchError::UnknownFlag(s.to_string()))
    }
}

/// Set of flags currently switched on for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayoutFlags(BTreeSet<LayoutFlag>);

impl LayoutFlags {
    pub fn with(flag: LayoutFlag) -> Self {
        Self(BTreeSet::from([flag]))
    }

    /// Flips `flag` and returns whether it is now set.
    pub fn toggle(&mut self, flag: LayoutFlag) -> bool {
        if self.0.remove(&flag) {
            false
        } else {
            self.0.insert(flag);
            true
        }
    }

    pub fn is_set(&self, flag: LayoutFlag) -> bool {
        self.0.contains(&flag)
    }

    /// Space separated class list for the container element.
    pub fn css_classes(&self) -> String {
        self.0
            .iter()
            .map(LayoutFlag::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_twice_restores_state() {
        let mut flags = LayoutFlags::default();
        assert!(flags.toggle(LayoutFlag::Overlay));
        assert!(flags.toggle(LayoutFlag::PinLeft));
        assert_eq!(flags.css_classes(), "pinLeft overlay");
        assert!(!flags.toggle(LayoutFlag::Overlay));
        assert!(flags.is_set(LayoutFlag::PinLeft));
        assert!(!flags.is_set(LayoutFlag::Overlay));
    }

    #[test]
    fn parses_flag_names() {
        assert_eq!("pinRight".parse::<LayoutFlag>().unwrap(), LayoutFlag::PinRight);
        assert!(matches!(
            "sideways".parse::<LayoutFlag>(),
            Err(WorkbenchError::UnknownFlag(_))
        ));
    }
}
