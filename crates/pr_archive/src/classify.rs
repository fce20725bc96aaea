//! Encoding strategies and their priority.
//!
//! Every [`Persist`] type carries a [`Strategy`] in its `STRATEGY` constant.
//! When a type qualifies for several, [`Strategy::resolve`] picks one by
//! the fixed order
//!
//! Member-Defined > Externally-Registered > Trivial-Copy > Container-Recursive.
//!
//! `#[derive(Persist)]` computes the constant through `resolve`, so the
//! order lives in exactly one place.

use core::fmt;

use crate::Persist;

// -----------------------------------------------------------------------------
// StrategySet

bitflags::bitflags! {
    /// Strategies a type qualifies for.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct StrategySet: u8 {
        const MEMBER_DEFINED = 1 << 0;
        const EXTERNALLY_REGISTERED = 1 << 1;
        const TRIVIAL_COPY = 1 << 2;
        const CONTAINER_RECURSIVE = 1 << 3;
    }
}

// -----------------------------------------------------------------------------
// Strategy

/// How the values of a type are written and read.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// The type's own `save`/`load` pair.
    MemberDefined,
    /// Free functions found by `TypeId` in the archive's [`Registry`](crate::Registry).
    ExternallyRegistered,
    /// One bulk copy of the value's bytes.
    TrivialCopy,
    /// A count followed by each element.
    ContainerRecursive,
}

impl Strategy {
    /// All strategies, highest priority first.
    pub const PRIORITY: [Strategy; 4] = [
        Strategy::MemberDefined,
        Strategy::ExternallyRegistered,
        Strategy::TrivialCopy,
        Strategy::ContainerRecursive,
    ];

    /// Picks the highest-priority strategy in `candidates`.
    ///
    /// Returns `None` for an empty set; such a type cannot be archived.
    ///
    /// # Examples
    ///
    /// ```
    /// use pr_archive::{Strategy, StrategySet};
    ///
    /// let both = StrategySet::TRIVIAL_COPY | StrategySet::EXTERNALLY_REGISTERED;
    /// assert_eq!(Strategy::resolve(both), Some(Strategy::ExternallyRegistered));
    /// assert_eq!(Strategy::resolve(StrategySet::empty()), None);
    /// ```
    pub const fn resolve(candidates: StrategySet) -> Option<Strategy> {
        let mut i = 0;
        while i < Self::PRIORITY.len() {
            let strategy = Self::PRIORITY[i];
            if candidates.contains(strategy.flag()) {
                return Some(strategy);
            }
            i += 1;
        }
        None
    }

    /// The flag of this strategy in a [`StrategySet`].
    #[inline]
    pub const fn flag(self) -> StrategySet {
        match self {
            Self::MemberDefined => StrategySet::MEMBER_DEFINED,
            Self::ExternallyRegistered => StrategySet::EXTERNALLY_REGISTERED,
            Self::TrivialCopy => StrategySet::TRIVIAL_COPY,
            Self::ContainerRecursive => StrategySet::CONTAINER_RECURSIVE,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MemberDefined => "member-defined",
            Self::ExternallyRegistered => "externally-registered",
            Self::TrivialCopy => "trivial-copy",
            Self::ContainerRecursive => "container-recursive",
        }
    }

    #[inline]
    pub const fn is_trivial(self) -> bool {
        matches!(self, Self::TrivialCopy)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Queries

/// The strategy `T` is archived with.
///
/// # Examples
///
/// ```
/// use pr_archive::Strategy;
/// use pr_archive::classify::strategy_of;
///
/// assert_eq!(strategy_of::<u64>(), Strategy::TrivialCopy);
/// assert_eq!(strategy_of::<Vec<u64>>(), Strategy::ContainerRecursive);
/// assert_eq!(strategy_of::<(u8, u8)>(), Strategy::MemberDefined);
/// ```
#[inline]
pub const fn strategy_of<T: Persist>() -> Strategy {
    T::STRATEGY
}

/// Returns `true` if `T` is archived by bulk copy.
#[inline]
pub const fn is_trivial<T: Persist>() -> bool {
    T::STRATEGY.is_trivial()
}

// -----------------------------------------------------------------------------
// Tests
