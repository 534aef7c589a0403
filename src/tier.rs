//! Sigil tiers, spell grades and the shared sigil pool.
//!
//! Every sigil node consumes one unit of its tier from a character-wide
//! `SigilCounts` pool. Spells carry a `Grade` used by MAP selection quotas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Rarity tier of a sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigilTier {
    Kaarn,
    Purth,
    Juathas,
    Xuth,
    Lekolu,
    Sinthru,
}

impl SigilTier {
    /// All tiers in pool order.
    pub const ALL: [SigilTier; 6] = [
        SigilTier::Kaarn,
        SigilTier::Purth,
        SigilTier::Juathas,
        SigilTier::Xuth,
        SigilTier::Lekolu,
        SigilTier::Sinthru,
    ];

    /// Blessing Point cost of a node of this tier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::SigilTier;
    ///
    /// assert_eq!(SigilTier::Kaarn.bp_cost(), 3);
    /// assert_eq!(SigilTier::Xuth.bp_cost(), 12);
    /// ```
    pub fn bp_cost(self) -> i32 {
        match self {
            SigilTier::Kaarn => 3,
            SigilTier::Purth => 5,
            SigilTier::Juathas => 8,
            SigilTier::Xuth => 12,
            SigilTier::Lekolu => 4,
            SigilTier::Sinthru => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SigilTier::Kaarn => "kaarn",
            SigilTier::Purth => "purth",
            SigilTier::Juathas => "juathas",
            SigilTier::Xuth => "xuth",
            SigilTier::Lekolu => "lekolu",
            SigilTier::Sinthru => "sinthru",
        }
    }

    /// Read the tier from an image path's file-stem suffix.
    ///
    /// The directory and extension are ignored and matching is
    /// case-insensitive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magecraft::SigilTier;
    ///
    /// assert_eq!(SigilTier::from_image("/img/sigils/Push-Purth.webp"), Some(SigilTier::Purth));
    /// assert_eq!(SigilTier::from_image("plain.png"), None);
    /// ```
    pub fn from_image(src: &str) -> Option<SigilTier> {
        let file = src.rsplit(['/', '\\']).next().unwrap_or(src);
        let stem = match file.rfind('.') {
            Some(dot) if dot > 0 => &file[..dot],
            _ => file,
        };
        let stem = stem.to_ascii_lowercase();
        SigilTier::ALL
            .into_iter()
            .find(|tier| stem.ends_with(tier.as_str()))
    }

    fn index(self) -> usize {
        match self {
            SigilTier::Kaarn => 0,
            SigilTier::Purth => 1,
            SigilTier::Juathas => 2,
            SigilTier::Xuth => 3,
            SigilTier::Lekolu => 4,
            SigilTier::Sinthru => 5,
        }
    }
}

impl fmt::Display for SigilTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Power grade of a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Kaarn,
    Purth,
    Xuth,
    Lekolu,
    Sinthru,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Kaarn => "kaarn",
            Grade::Purth => "purth",
            Grade::Xuth => "xuth",
            Grade::Lekolu => "lekolu",
            Grade::Sinthru => "sinthru",
        };
        f.write_str(name)
    }
}

/// One counter per sigil tier.
///
/// Used both for what the character has been granted (`available`) and
/// for what the sigil trees consume (`used`).
///
/// # Examples
///
/// ```rust
/// use magecraft::{SigilCounts, SigilTier};
///
/// let available = SigilCounts::new().with(SigilTier::Kaarn, 2);
/// let used = SigilCounts::new().with(SigilTier::Kaarn, 1);
///
/// assert!(used.fits_within(&available));
/// assert_eq!(available.remaining(&used).get(SigilTier::Kaarn), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigilCounts {
    #[serde(default)]
    pub kaarn: u32,
    #[serde(default)]
    pub purth: u32,
    #[serde(default)]
    pub juathas: u32,
    #[serde(default)]
    pub xuth: u32,
    #[serde(default)]
    pub lekolu: u32,
    #[serde(default)]
    pub sinthru: u32,
}

impl SigilCounts {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, tier: SigilTier, count: u32) -> Self {
        self.set(tier, count);
        self
    }

    pub fn get(&self, tier: SigilTier) -> u32 {
        self.as_array()[tier.index()]
    }

    pub fn set(&mut self, tier: SigilTier, count: u32) {
        let slot = match tier {
            SigilTier::Kaarn => &mut self.kaarn,
            SigilTier::Purth => &mut self.purth,
            SigilTier::Juathas => &mut self.juathas,
            SigilTier::Xuth => &mut self.xuth,
            SigilTier::Lekolu => &mut self.lekolu,
            SigilTier::Sinthru => &mut self.sinthru,
        };
        *slot = count;
    }

    /// Add `count` units of `tier`.
    pub fn add(&mut self, tier: SigilTier, count: u32) {
        self.set(tier, self.get(tier) + count);
    }

    /// Sum of every counter.
    pub fn total(&self) -> u32 {
        self.as_array().iter().sum()
    }

    /// `true` if no counter exceeds the matching counter in `available`.
    pub fn fits_within(&self, available: &SigilCounts) -> bool {
        SigilTier::ALL
            .into_iter()
            .all(|tier| self.get(tier) <= available.get(tier))
    }

    /// Unused capacity per tier, saturating at zero.
    pub fn remaining(&self, used: &SigilCounts) -> SigilCounts {
        *self - *used
    }

    /// First tier whose counter exceeds `available`, in pool order.
    pub fn first_overdrawn(&self, available: &SigilCounts) -> Option<SigilTier> {
        SigilTier::ALL
            .into_iter()
            .find(|tier| self.get(*tier) > available.get(*tier))
    }

    fn as_array(&self) -> [u32; 6] {
        [
            self.kaarn,
            self.purth,
            self.juathas,
            self.xuth,
            self.lekolu,
            self.sinthru,
        ]
    }
}

impl Add for SigilCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        out += rhs;
        out
    }
}

impl AddAssign for SigilCounts {
    fn add_assign(&mut self, rhs: Self) {
        for tier in SigilTier::ALL {
            SigilCounts::add(self, tier, rhs.get(tier));
        }
    }
}

/// Saturating subtraction per tier.
impl Sub for SigilCounts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut out = SigilCounts::new();
        for tier in SigilTier::ALL {
            out.set(tier, self.get(tier).saturating_sub(rhs.get(tier)));
        }
        out
    }
}

impl std::iter::Sum for SigilCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(SigilCounts::new(), |acc, c| acc + c)
    }
}
