//! Action Space
//!
//! A two-component continuous action: the first component selects buy, sell
//! or hold by range, the second is the fraction of the affordable (buy) or
//! held (sell) shares to trade.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Exclusive upper bound of the action type component
pub const ACTION_TYPE_HIGH: f64 = 3.0;

/// Discrete decision encoded by the action type component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Spend a fraction of the balance on shares
    Buy,
    /// Liquidate a fraction of the held shares
    Sell,
    /// Leave balance and position untouched
    Hold,
}

impl ActionKind {
    /// Classify an action type value: `< 1` buys, `< 2` sells, anything else holds
    pub fn from_action_type(action_type: f64) -> Self {
        if action_type < 1.0 {
            Self::Buy
        } else if action_type < 2.0 {
            Self::Sell
        } else {
            Self::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

/// Raw action as produced by an agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// In `[0, 3)`
    pub action_type: f64,
    /// In `[0, 1]`
    pub amount: f64,
}

impl Action {
    pub fn new(action_type: f64, amount: f64) -> Self {
        Self {
            action_type,
            amount,
        }
    }

    /// Canonical buy action for the given fraction
    pub fn buy(amount: f64) -> Self {
        Self::new(0.5, amount)
    }

    /// Canonical sell action for the given fraction
    pub fn sell(amount: f64) -> Self {
        Self::new(1.5, amount)
    }

    pub fn hold() -> Self {
        Self::new(2.5, 0.0)
    }

    pub fn kind(&self) -> ActionKind {
        ActionKind::from_action_type(self.action_type)
    }

    /// Reject NaN and infinite components. Range bounds are the caller's
    /// contract and are not enforced here.
    pub fn check_finite(&self) -> Result<()> {
        if !self.action_type.is_finite() || !self.amount.is_finite() {
            return Err(SimError::InvalidAction(format!(
                "components must be finite, got ({}, {})",
                self.action_type, self.amount
            )));
        }
        Ok(())
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::hold()
    }
}

impl From<[f64; 2]> for Action {
    fn from(raw: [f64; 2]) -> Self {
        Self::new(raw[0], raw[1])
    }
}

impl From<(f64, f64)> for Action {
    fn from((action_type, amount): (f64, f64)) -> Self {
        Self::new(action_type, amount)
    }
}
