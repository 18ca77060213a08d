//! Order submission shared by the trading strategies
//!
//! Each helper issues one call, logs the result under the agent's id and
//! records it in the cycle report. Nothing here retries.

use crate::strategy::CycleReport;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use stampede_core::{OrderId, Price, Trade};
use stampede_gateway::{ExchangeClient, NewOrder, Outcome, Placement};

/// Snap a price to the nearest multiple of `tick`
///
/// Returns the price unchanged when the tick is not positive or the
/// division would overflow.
pub fn round_to_tick(price: Price, tick: Price) -> Price {
    if tick <= Decimal::ZERO {
        return price;
    }
    price
        .checked_div(tick)
        .and_then(|steps| steps.round().checked_mul(tick))
        .unwrap_or(price)
}

fn log_trades(agent: &str, ticker: &str, trades: &[Trade]) {
    for trade in trades {
        info!(
            "[{}] Trade {} {} @ {} (buyer {}, seller {})",
            agent, ticker, trade.volume, trade.price, trade.bid_user_id, trade.ask_user_id
        );
    }
}

/// Place one order; `None` when nothing usable came back
pub async fn place(
    client: &ExchangeClient,
    order: &NewOrder,
    report: &mut CycleReport,
) -> Option<Placement> {
    let agent = order.user_id.as_str();
    if order.price <= Decimal::ZERO {
        debug!("[{}] Skipping {} at non-positive price {}", agent, order.side, order.price);
        report.orders_skipped += 1;
        return None;
    }

    match client.place_order(order).await {
        Outcome::Ok(placement) => {
            report.orders_placed += 1;
            report.trades_observed += placement.trades.len() as u64;
            match placement.order_id {
                Some(id) => debug!(
                    "[{}] {} {} @ {} resting as #{}",
                    agent, order.side, order.volume, order.price, id
                ),
                None => debug!(
                    "[{}] {} {} @ {} did not rest",
                    agent, order.side, order.volume, order.price
                ),
            }
            log_trades(agent, &order.ticker, &placement.trades);
            Some(placement)
        }
        Outcome::Rejected(reason) => {
            debug!(
                "[{}] {} {} @ {} rejected: {}",
                agent, order.side, order.volume, order.price, reason
            );
            report.rejections += 1;
            None
        }
        Outcome::Failed(e) => {
            warn!("[{}] Order placement failed: {}", agent, e);
            report.transport_failures += 1;
            None
        }
    }
}

/// Cancel one order; `true` only if the service removed it
///
/// A `false` answer is expected when a concurrent agent already consumed
/// the order.
pub async fn cancel(
    client: &ExchangeClient,
    agent: &str,
    ticker: &str,
    order_id: OrderId,
    report: &mut CycleReport,
) -> bool {
    report.cancels_attempted += 1;
    match client.cancel_order(agent, ticker, order_id).await {
        Outcome::Ok(true) => {
            debug!("[{}] Cancelled #{}", agent, order_id);
            report.cancels_succeeded += 1;
            true
        }
        Outcome::Ok(false) => {
            debug!("[{}] Cancel of #{} refused (already gone)", agent, order_id);
            false
        }
        Outcome::Rejected(reason) => {
            debug!("[{}] Cancel of #{} rejected: {}", agent, order_id, reason);
            report.rejections += 1;
            false
        }
        Outcome::Failed(e) => {
            warn!("[{}] Cancel of #{} failed: {}", agent, order_id, e);
            report.transport_failures += 1;
            false
        }
    }
}
