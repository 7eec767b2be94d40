use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::EpisodeState;

/// Snapshot of the account, as shown by `render`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub step: usize,
    pub balance: f64,
    pub shares_held: f64,
    pub total_shares_sold: f64,
    pub cost_basis: f64,
    pub total_sales_value: f64,
    pub net_worth: f64,
    pub max_net_worth: f64,
    pub profit: f64,
}

impl EpisodeReport {
    pub fn from_state(state: &EpisodeState, initial_balance: f64) -> Self {
        Self {
            step: state.current_step,
            balance: state.balance,
            shares_held: state.shares_held,
            total_shares_sold: state.total_shares_sold,
            cost_basis: state.cost_basis,
            total_sales_value: state.total_sales_value,
            net_worth: state.net_worth,
            max_net_worth: state.max_net_worth,
            profit: state.profit(initial_balance),
        }
    }
}

impl fmt::Display for EpisodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step: {}", self.step)?;
        writeln!(f, "Balance: {}", self.balance)?;
        writeln!(f, "Shares held: {}", self.shares_held)?;
        writeln!(f, "Total sold: {}", self.total_shares_sold)?;
        writeln!(f, "Avg cost for held shares: {}", self.cost_basis)?;
        writeln!(f, "Total sales value: {}", self.total_sales_value)?;
        writeln!(f, "Net worth: {}", self.net_worth)?;
        writeln!(f, "Max net worth: {}", self.max_net_worth)?;
        writeln!(f, "Profit: {}", self.profit)
    }
}
