// SPDX-License-Identifier: GPL-3.0-only

//! Decoder for the 10-character positional `lv_attr` status code
//!
//! Every position carries one independent categorical field with its own
//! closed vocabulary, as printed by `lvs`. Decoding is all-or-nothing: a
//! code of the wrong length, or with a character outside its position's
//! vocabulary, yields an error and no partial result. `encode` is the
//! exact inverse of `parse`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute code decoding failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttrError {
    #[error("attr must not be empty")]
    Empty,

    #[error("malformed attr '{0}' - must be 10 chars")]
    BadLength(String),

    #[error("unexpected character '{ch}' at lv attr position {position}")]
    UnexpectedChar { position: usize, ch: char },
}

macro_rules! attr_position {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $ch:literal => $label:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub fn from_char(ch: char) -> Option<Self> {
                match ch {
                    $($ch => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_char(self) -> char {
                match self {
                    $(Self::$variant => $ch,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

attr_position! {
    /// Position 0: what kind of volume this is
    VolumeType {
        Cache = 'C' => "cache",
        Mirrored = 'm' => "mirrored",
        MirroredNoSync = 'M' => "mirrored without initial sync",
        Origin = 'o' => "origin",
        MergingOrigin = 'O' => "origin with merging snapshot",
        Raid = 'r' => "raid",
        RaidNoSync = 'R' => "raid without initial sync",
        Snapshot = 's' => "snapshot",
        MergingSnapshot = 'S' => "merging snapshot",
        Pvmove = 'p' => "pvmove",
        Virtual = 'v' => "virtual",
        Image = 'i' => "mirror or raid image",
        ImageOutOfSync = 'I' => "mirror or raid image out-of-sync",
        MirrorLog = 'l' => "mirror log device",
        UnderConversion = 'c' => "under conversion",
        ThinVolume = 'V' => "thin volume",
        ThinPool = 't' => "thin pool",
        ThinPoolData = 'T' => "thin pool data",
        Metadata = 'e' => "raid or pool metadata",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 1: volume permissions
    Permissions {
        Writeable = 'w' => "writeable",
        ReadOnly = 'r' => "read-only",
        ReadOnlyActivation = 'R' => "read-only activation of non-read-only volume",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 2: allocation policy; capitalized while locked against change
    AllocationPolicy {
        Anywhere = 'a' => "anywhere",
        AnywhereLocked = 'A' => "anywhere locked",
        Contiguous = 'c' => "contiguous",
        ContiguousLocked = 'C' => "contiguous locked",
        Inherited = 'i' => "inherited",
        InheritedLocked = 'I' => "inherited locked",
        Cling = 'l' => "cling",
        ClingLocked = 'L' => "cling locked",
        Normal = 'n' => "normal",
        NormalLocked = 'N' => "normal locked",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 3: fixed minor device number
    FixedMinor {
        Fixed = 'm' => "fixed minor",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 4: activation state
    State {
        Active = 'a' => "active",
        Historical = 'h' => "historical",
        Suspended = 's' => "suspended",
        InvalidSnapshot = 'I' => "invalid snapshot",
        InvalidSuspendedSnapshot = 'S' => "invalid suspended snapshot",
        MergeFailed = 'm' => "snapshot merge failed",
        SuspendedMergeFailed = 'M' => "suspended snapshot merge failed",
        DeviceWithoutTables = 'd' => "mapped device present without tables",
        DeviceWithInactiveTable = 'i' => "mapped device present with inactive table",
        CheckNeeded = 'c' => "thin-pool check needed",
        SuspendedCheckNeeded = 'C' => "suspended thin-pool check needed",
        Unknown = 'X' => "unknown",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 5: whether the underlying device is held open
    DeviceState {
        Open = 'o' => "open",
        Unknown = 'X' => "unknown",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 6: device-mapper target in use
    TargetType {
        Cache = 'C' => "cache",
        Mirror = 'm' => "mirror",
        Raid = 'r' => "raid",
        Snapshot = 's' => "snapshot",
        Thin = 't' => "thin",
        Unknown = 'u' => "unknown",
        Virtual = 'v' => "virtual",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 7: zeroing of newly allocated blocks
    ZeroPolicy {
        Zero = 'z' => "overwrite by zero",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 8: volume health
    VolumeHealth {
        Partial = 'p' => "partial",
        RefreshNeeded = 'r' => "refresh needed",
        Mismatches = 'm' => "mismatches exist",
        WriteMostly = 'w' => "writemostly",
        Unknown = 'X' => "unknown",
        Unset = '-' => "-",
    }
}

attr_position! {
    /// Position 9: skip-activation flag
    SkipActivation {
        Skip = 'k' => "skip activation",
        Unset = '-' => "-",
    }
}

/// Fully decoded `lv_attr` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LvAttr {
    pub volume_type: VolumeType,
    pub permissions: Permissions,
    pub allocation_policy: AllocationPolicy,
    pub fixed_minor: FixedMinor,
    pub state: State,
    pub device_state: DeviceState,
    pub target_type: TargetType,
    pub zero: ZeroPolicy,
    pub health: VolumeHealth,
    pub skip_activation: SkipActivation,
}

impl LvAttr {
    /// Decode a raw 10-character attr code.
    pub fn parse(attr: &str) -> Result<Self, AttrError> {
        if attr.is_empty() {
            return Err(AttrError::Empty);
        }

        let chars: Vec<char> = attr.chars().collect();
        if chars.len() != 10 {
            return Err(AttrError::BadLength(attr.to_string()));
        }

        let pos = |position: usize| AttrError::UnexpectedChar {
            position,
            ch: chars[position],
        };

        Ok(Self {
            volume_type: VolumeType::from_char(chars[0]).ok_or_else(|| pos(0))?,
            permissions: Permissions::from_char(chars[1]).ok_or_else(|| pos(1))?,
            allocation_policy: AllocationPolicy::from_char(chars[2]).ok_or_else(|| pos(2))?,
            fixed_minor: FixedMinor::from_char(chars[3]).ok_or_else(|| pos(3))?,
            state: State::from_char(chars[4]).ok_or_else(|| pos(4))?,
            device_state: DeviceState::from_char(chars[5]).ok_or_else(|| pos(5))?,
            target_type: TargetType::from_char(chars[6]).ok_or_else(|| pos(6))?,
            zero: ZeroPolicy::from_char(chars[7]).ok_or_else(|| pos(7))?,
            health: VolumeHealth::from_char(chars[8]).ok_or_else(|| pos(8))?,
            skip_activation: SkipActivation::from_char(chars[9]).ok_or_else(|| pos(9))?,
        })
    }

    /// Re-encode into the raw code this value was parsed from.
    pub fn encode(&self) -> String {
        [
            self.volume_type.as_char(),
            self.permissions.as_char(),
            self.allocation_policy.as_char(),
            self.fixed_minor.as_char(),
            self.state.as_char(),
            self.device_state.as_char(),
            self.target_type.as_char(),
            self.zero.as_char(),
            self.health.as_char(),
            self.skip_activation.as_char(),
        ]
        .iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fails_with_empty() {
        assert_eq!(LvAttr::parse(""), Err(AttrError::Empty));
    }

    #[test]
    fn fails_with_wrong_length() {
        assert!(matches!(LvAttr::parse("aa"), Err(AttrError::BadLength(_))));
        assert!(matches!(
            LvAttr::parse("aaaaaaaaaaaasssssaaaaaa"),
            Err(AttrError::BadLength(_))
        ));
    }

    #[test]
    fn fails_with_unexpected_chars() {
        assert_eq!(
            LvAttr::parse("Ç---------"),
            Err(AttrError::UnexpectedChar {
                position: 0,
                ch: 'Ç'
            })
        );
        assert_eq!(
            LvAttr::parse("m         "),
            Err(AttrError::UnexpectedChar {
                position: 1,
                ch: ' '
            })
        );
    }

    #[test]
    fn parses_volume_type_alone() {
        let attr = LvAttr::parse("t---------").expect("valid code");
        assert_eq!(attr.volume_type, VolumeType::ThinPool);
        assert_eq!(attr.permissions, Permissions::Unset);
        assert_eq!(attr.state, State::Unset);
    }

    #[test]
    fn parses_thin_pool_code() {
        let attr = LvAttr::parse("twi-aotz--").expect("valid code");
        assert_eq!(attr.volume_type, VolumeType::ThinPool);
        assert_eq!(attr.permissions, Permissions::Writeable);
        assert_eq!(attr.allocation_policy, AllocationPolicy::Inherited);
        assert_eq!(attr.fixed_minor, FixedMinor::Unset);
        assert_eq!(attr.state, State::Active);
        assert_eq!(attr.device_state, DeviceState::Open);
        assert_eq!(attr.target_type, TargetType::Thin);
        assert_eq!(attr.zero, ZeroPolicy::Zero);
        assert_eq!(attr.health, VolumeHealth::Unset);
        assert_eq!(attr.skip_activation, SkipActivation::Unset);
    }

    #[test]
    fn encode_inverts_parse() {
        for code in ["twi-aotz--", "-wi-ao----", "swi-a-s---", "Vwi-a-tz-k"] {
            let attr = LvAttr::parse(code).expect("valid code");
            assert_eq!(attr.encode(), code);
        }
    }
}
