use crate::{Error, Number};
use core::{fmt, str::FromStr};

/// A supported lottery game.
///
/// The draw type fixes how many numbers a coupon holds and the range they are
/// drawn from. It is also the key under which a [`ControllerRegistry`] keeps
/// at most one active generation run.
///
/// [`ControllerRegistry`]: crate::ControllerRegistry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DrawType {
    /// 6 numbers out of 49.
    Lotto,
    /// 5 numbers out of 42.
    MiniLotto,
    /// 5 main numbers out of 50.
    EuroJackpot,
}

impl DrawType {
    pub const ALL: [Self; 3] = [Self::Lotto, Self::MiniLotto, Self::EuroJackpot];

    /// How many numbers a coupon for this game holds.
    pub const fn valid_numbers_count(self) -> usize {
        match self {
            Self::Lotto => 6,
            Self::MiniLotto | Self::EuroJackpot => 5,
        }
    }

    /// Largest number in the game's universe (numbers start at 1).
    pub const fn max_number(self) -> Number {
        match self {
            Self::Lotto => 49,
            Self::MiniLotto => 42,
            Self::EuroJackpot => 50,
        }
    }

    /// Stable kebab-case key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Lotto => "lotto",
            Self::MiniLotto => "mini-lotto",
            Self::EuroJackpot => "euro-jackpot",
        }
    }
}

impl fmt::Display for DrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DrawType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|draw_type| draw_type.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidRequest {
                reason: format!("Unknown draw type `{s}`"),
            })
    }
}
