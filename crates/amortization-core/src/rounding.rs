//! Currency rounding for schedule amounts.
//!
//! Every monetary field of a schedule passes through [`RoundingPolicy`].
//! The policy is also the only place allowed to correct a computed value:
//! [`RoundingPolicy::finalize_last_period`] makes the final principal
//! portion consume whatever balance is left, so rounding drift never leaves
//! a residual tail.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::methods::PeriodSplit;
use crate::types::Money;

/// Smallest currency unit, in decimal places.
pub const CURRENCY_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 0.005 rounds to 0.01.
    #[default]
    HalfUp,
    /// 0.005 rounds to the even neighbour (0.00), 0.015 to 0.02.
    Bankers,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::Bankers => RoundingStrategy::MidpointNearestEven,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundingPolicy {
    mode: RoundingMode,
}

impl RoundingPolicy {
    pub fn new(mode: RoundingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> RoundingMode {
        self.mode
    }

    /// Round to the smallest currency unit. The result always carries
    /// exactly [`CURRENCY_SCALE`] decimal places.
    pub fn round(&self, amount: Money) -> Money {
        let mut rounded = amount.round_dp_with_strategy(CURRENCY_SCALE, self.mode.strategy());
        rounded.rescale(CURRENCY_SCALE);
        rounded
    }

    /// Override the last period's principal with the exact balance left
    /// before that period. Interest and fee are untouched.
    pub fn finalize_last_period(&self, split: PeriodSplit, remaining_before: Money) -> PeriodSplit {
        PeriodSplit {
            principal: remaining_before.max(Decimal::ZERO),
            ..split
        }
    }

    /// Round all components of a period split.
    pub fn round_split(&self, split: PeriodSplit) -> PeriodSplit {
        PeriodSplit {
            principal: self.round(split.principal),
            interest: self.round(split.interest),
            fee: self.round(split.fee),
        }
    }
}
