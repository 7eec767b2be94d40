//! Episode State
//!
//! Account bookkeeping for one episode. All quantities are real-valued;
//! fractional shares are allowed.

use serde::{Deserialize, Serialize};

use super::action::ActionKind;

/// Outcome of applying one action at one execution price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub kind: ActionKind,
    pub price: f64,
    /// Shares bought or sold (0 for hold)
    pub shares: f64,
    /// Cash moved by the fill (0 for hold)
    pub value: f64,
}

/// Mutable state of the current episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    /// Index of the first row of the observation window
    pub current_step: usize,
    pub balance: f64,
    pub shares_held: f64,
    /// Weighted-average purchase price of held shares; 0 when flat
    pub cost_basis: f64,
    pub net_worth: f64,
    pub max_net_worth: f64,
    pub total_shares_sold: f64,
    pub total_sales_value: f64,
}

impl EpisodeState {
    /// Fresh account at `start_step`
    pub fn new(initial_balance: f64, start_step: usize) -> Self {
        Self {
            current_step: start_step,
            balance: initial_balance,
            shares_held: 0.0,
            cost_basis: 0.0,
            net_worth: initial_balance,
            max_net_worth: initial_balance,
            total_shares_sold: 0.0,
            total_sales_value: 0.0,
        }
    }

    /// Apply an action at `price`, then mark the account to market.
    ///
    /// A buy at a non-positive price is rejected by the caller before this is
    /// reached.
    pub fn apply(&mut self, kind: ActionKind, price: f64, amount: f64) -> Fill {
        let (shares, value) = match kind {
            ActionKind::Buy => self.buy(price, amount),
            ActionKind::Sell => self.sell(price, amount),
            ActionKind::Hold => (0.0, 0.0),
        };

        self.mark_to_market(price);

        Fill {
            kind,
            price,
            shares,
            value,
        }
    }

    fn buy(&mut self, price: f64, amount: f64) -> (f64, f64) {
        if amount == 0.0 {
            return (0.0, 0.0);
        }

        let total_possible = self.balance / price;
        let shares_bought = total_possible * amount;
        if shares_bought == 0.0 {
            return (0.0, 0.0);
        }

        let prev_cost = self.cost_basis * self.shares_held;
        let additional_cost = shares_bought * price;
        let new_shares = self.shares_held + shares_bought;

        // Rounding in balance / price * price can leave a dust-sized negative
        self.balance = (self.balance - additional_cost).max(0.0);
        if new_shares > 0.0 {
            self.cost_basis = (prev_cost + additional_cost) / new_shares;
        }
        self.shares_held = new_shares;

        (shares_bought, additional_cost)
    }

    fn sell(&mut self, price: f64, amount: f64) -> (f64, f64) {
        let shares_sold = self.shares_held * amount;
        let proceeds = shares_sold * price;

        self.balance += proceeds;
        self.shares_held -= shares_sold;
        self.total_shares_sold += shares_sold;
        self.total_sales_value += proceeds;

        (shares_sold, proceeds)
    }

    fn mark_to_market(&mut self, price: f64) {
        self.net_worth = self.balance + self.shares_held * price;

        if self.net_worth > self.max_net_worth {
            self.max_net_worth = self.net_worth;
        }

        if self.shares_held == 0.0 {
            self.cost_basis = 0.0;
        }
    }

    /// Ruin: nothing left to trade with
    pub fn is_ruined(&self) -> bool {
        self.net_worth <= 0.0
    }

    pub fn profit(&self, initial_balance: f64) -> f64 {
        self.net_worth - initial_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_buy_then_full_sell() {
        let mut state = EpisodeState::new(10_000.0, 0);

        let fill = state.apply(ActionKind::Buy, 100.0, 1.0);
        assert_eq!(fill.shares, 100.0);
        assert_eq!(fill.value, 10_000.0);
        assert_eq!(state.balance, 0.0);
        assert_eq!(state.shares_held, 100.0);
        assert_eq!(state.cost_basis, 100.0);
        assert_eq!(state.net_worth, 10_000.0);

        let fill = state.apply(ActionKind::Sell, 120.0, 1.0);
        assert_eq!(fill.shares, 100.0);
        assert_eq!(state.balance, 12_000.0);
        assert_eq!(state.shares_held, 0.0);
        assert_eq!(state.cost_basis, 0.0);
        assert_eq!(state.total_shares_sold, 100.0);
        assert_eq!(state.total_sales_value, 12_000.0);
        assert_eq!(state.net_worth, 12_000.0);
        assert_eq!(state.max_net_worth, 12_000.0);
    }

    #[test]
    fn test_cost_basis_is_weighted_average() {
        let mut state = EpisodeState::new(10_000.0, 0);
        state.apply(ActionKind::Buy, 100.0, 0.5); // 50 shares @ 100, 5000 left
        state.apply(ActionKind::Buy, 50.0, 1.0); // 100 shares @ 50

        assert_eq!(state.shares_held, 150.0);
        assert_eq!(state.balance, 0.0);
        let expected = (50.0 * 100.0 + 100.0 * 50.0) / 150.0;
        assert!((state.cost_basis - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_amount_is_no_op() {
        let mut state = EpisodeState::new(10_000.0, 0);
        let fill = state.apply(ActionKind::Buy, 100.0, 0.0);
        assert_eq!(fill.shares, 0.0);
        assert_eq!(state.balance, 10_000.0);
        assert_eq!(state.shares_held, 0.0);
        assert_eq!(state.cost_basis, 0.0);

        state.apply(ActionKind::Buy, 100.0, 0.25);
        let before = state.clone();
        state.apply(ActionKind::Sell, 100.0, 0.0);
        assert_eq!(state.balance, before.balance);
        assert_eq!(state.shares_held, before.shares_held);
        assert_eq!(state.total_shares_sold, 0.0);
    }

    #[test]
    fn test_buy_with_empty_balance_keeps_basis_defined() {
        let mut state = EpisodeState::new(0.0, 0);
        state.apply(ActionKind::Buy, 100.0, 1.0);
        assert_eq!(state.shares_held, 0.0);
        assert_eq!(state.cost_basis, 0.0);
        assert!(!state.cost_basis.is_nan());
        assert!(state.is_ruined());
    }

    #[test]
    fn test_full_buy_never_leaves_negative_balance() {
        for i in 0..2_000 {
            let price = 10.0 + 0.37 * i as f64;
            let mut state = EpisodeState::new(10_000.0, 0);
            state.apply(ActionKind::Buy, price, 1.0);
            assert!(state.balance >= 0.0, "balance {} at price {price}", state.balance);
            assert!(state.net_worth > 0.0);
        }

        let mut state = EpisodeState::new(10_000.0, 0);
        state.apply(ActionKind::Buy, 10.37, 1.0);
        assert!(state.balance >= 0.0);
        assert!(state.balance < 1e-9);
    }

    #[test]
    fn test_zero_fraction_buy_skips_price_division() {
        let mut state = EpisodeState::new(10_000.0, 0);
        let fill = state.apply(ActionKind::Buy, 0.0, 0.0);
        assert_eq!(fill.shares, 0.0);
        assert_eq!(state.balance, 10_000.0);
        assert_eq!(state.cost_basis, 0.0);
        assert_eq!(state.net_worth, 10_000.0);
    }

    #[test]
    fn test_hold_marks_to_market() {
        let mut state = EpisodeState::new(10_000.0, 0);
        state.apply(ActionKind::Buy, 100.0, 1.0);
        state.apply(ActionKind::Hold, 80.0, 0.7);

        assert_eq!(state.balance, 0.0);
        assert_eq!(state.shares_held, 100.0);
        assert_eq!(state.net_worth, 8_000.0);
        // max only ratchets upward
        assert_eq!(state.max_net_worth, 10_000.0);
        assert_eq!(state.profit(10_000.0), -2_000.0);
    }
}
