//! Public portfolio loader.
//!
//! Drives a [`PortfolioState`] through the same sequence of actions a
//! portfolio page dispatches: loading, portfolio, optional viewer details,
//! aggregated stats, done. Any failure of the portfolio or stats requests
//! lands in `error`.

#[cfg(test)]
#[path = "portfolio_test.rs"]
mod portfolio_test;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::net::api::ApiClient;
use crate::net::types::{InvoiceStats, Portfolio, PortfolioStats, ProjectStats, TimeSummary, User};
use crate::services::session::USER_PATH;
use crate::state::portfolio::{PortfolioAction, PortfolioState};

pub const PORTFOLIO_NOT_FOUND_MESSAGE: &str = "This portfolio does not exist or is private";
pub const PORTFOLIO_FAILED_MESSAGE: &str = "Failed to load portfolio";

/// Load `username`'s portfolio into `state`.
pub async fn load_portfolio(api: &ApiClient, username: &str, state: &mut PortfolioState) {
    state.dispatch(PortfolioAction::SetLoading(true));
    match fetch(api, username, state).await {
        Ok(()) => state.dispatch(PortfolioAction::SetLoading(false)),
        Err(e) => {
            warn!(%username, error = %e, status = ?e.status(), "portfolio: load failed");
            state.dispatch(PortfolioAction::SetError(error_message(&e).to_owned()));
        }
    }
}

fn error_message(err: &ApiError) -> &'static str {
    if err.status() == Some(404) { PORTFOLIO_NOT_FOUND_MESSAGE } else { PORTFOLIO_FAILED_MESSAGE }
}

async fn fetch(api: &ApiClient, username: &str, state: &mut PortfolioState) -> Result<(), ApiError> {
    let portfolio: Portfolio = api.get_segments(&["portfolio", username]).await?;
    state.dispatch(PortfolioAction::SetPortfolio(portfolio));

    let query = [("username", username)];

    if api.has_token() {
        match api.get_with_query::<User, _>(USER_PATH, &query).await {
            Ok(user) => state.dispatch(PortfolioAction::SetUserDetails(user)),
            Err(e) => debug!(error = %e, "portfolio: viewer details unavailable"),
        }
    }

    let (projects, time, invoices, clients) = tokio::try_join!(
        api.get_with_query::<ProjectStats, _>("/projects/stats", &query),
        api.get_with_query::<TimeSummary, _>("/time/summary", &query),
        api.get_with_query::<InvoiceStats, _>("/invoices/stats", &query),
        api.get_with_query::<Value, _>("/clients/", &query),
    )?;

    state.dispatch(PortfolioAction::SetStats(PortfolioStats {
        projects,
        time,
        invoices,
        clients: clients.as_array().map_or(0, Vec::len),
    }));
    Ok(())
}
