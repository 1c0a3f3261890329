//! Display state for a public portfolio page.

#[cfg(test)]
#[path = "portfolio_test.rs"]
mod portfolio_test;

use serde::Serialize;

use crate::net::types::{Portfolio, PortfolioStats, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    pub portfolio: Option<Portfolio>,
    pub stats: PortfolioStats,
    pub user_details: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self { portfolio: None, stats: PortfolioStats::default(), user_details: None, loading: true, error: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioAction {
    SetLoading(bool),
    /// Also ends loading.
    SetError(String),
    SetPortfolio(Portfolio),
    SetUserDetails(User),
    SetStats(PortfolioStats),
    /// Back to the initial state.
    Clear,
}

impl PortfolioState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: PortfolioAction) {
        match action {
            PortfolioAction::SetLoading(loading) => self.loading = loading,
            PortfolioAction::SetError(message) => {
                self.error = Some(message);
                self.loading = false;
            }
            PortfolioAction::SetPortfolio(portfolio) => self.portfolio = Some(portfolio),
            PortfolioAction::SetUserDetails(user) => self.user_details = Some(user),
            PortfolioAction::SetStats(stats) => self.stats = stats,
            PortfolioAction::Clear => *self = Self::default(),
        }
    }
}
