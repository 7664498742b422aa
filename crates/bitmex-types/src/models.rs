//! Table row shapes streamed by the realtime API
//!
//! `update` and `delete` actions only carry the key fields plus whatever
//! changed, so everything that is not part of a table's key is optional.

use crate::decimal::deserialize_opt_decimal;
use crate::enums::Side;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

// ============================================================================
// Public tables
// ============================================================================

/// Site announcement
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: i64,
    pub link: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Trollbox chat message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub user: Option<String>,
    pub message: Option<String>,
    pub html: Option<String>,
    pub from_bot: Option<bool>,
    #[serde(rename = "channelID")]
    pub channel_id: Option<i64>,
}

/// Connected users and bots
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectedUsers {
    pub users: Option<i64>,
    pub bots: Option<i64>,
}

/// Funding rate update
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funding {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    pub funding_interval: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub funding_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub funding_rate_daily: Option<Decimal>,
}

impl Funding {
    /// Annualised rate from the daily rate
    pub fn annualized(&self) -> Option<Decimal> {
        Some(self.funding_rate_daily? * Decimal::from(365))
    }
}

/// Tradeable contract, index or spot pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    pub root_symbol: Option<String>,
    pub state: Option<String>,
    pub typ: Option<String>,
    pub listing: Option<DateTime<Utc>>,
    pub front: Option<DateTime<Utc>>,
    pub expiry: Option<DateTime<Utc>>,
    pub settle: Option<DateTime<Utc>>,
    pub position_currency: Option<String>,
    pub underlying: Option<String>,
    pub quote_currency: Option<String>,
    pub underlying_symbol: Option<String>,
    pub reference: Option<String>,
    pub reference_symbol: Option<String>,
    pub max_order_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub max_price: Option<Decimal>,
    pub lot_size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub tick_size: Option<Decimal>,
    pub multiplier: Option<i64>,
    pub settl_currency: Option<String>,
    pub is_quanto: Option<bool>,
    pub is_inverse: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub init_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub maint_margin: Option<Decimal>,
    pub risk_limit: Option<i64>,
    pub risk_step: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub maker_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub taker_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub settlement_fee: Option<Decimal>,
    pub funding_base_symbol: Option<String>,
    pub funding_quote_symbol: Option<String>,
    pub funding_premium_symbol: Option<String>,
    pub funding_timestamp: Option<DateTime<Utc>>,
    pub funding_interval: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub funding_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub indicative_funding_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub prev_close_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub limit_down_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub limit_up_price: Option<Decimal>,
    pub prev_total_volume: Option<i64>,
    pub total_volume: Option<i64>,
    pub volume: Option<i64>,
    pub volume24h: Option<i64>,
    pub prev_total_turnover: Option<i64>,
    pub total_turnover: Option<i64>,
    pub turnover: Option<i64>,
    pub turnover24h: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub prev_price24h: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub vwap: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub high_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub low_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub last_price: Option<Decimal>,
    pub last_tick_direction: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub last_change_pcnt: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub bid_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub mid_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub ask_price: Option<Decimal>,
    pub open_interest: Option<i64>,
    pub open_value: Option<i64>,
    pub fair_method: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub fair_basis_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub fair_basis: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub fair_price: Option<Decimal>,
    pub mark_method: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub mark_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub indicative_settle_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub settled_price: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Instrument {
    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask_price? - self.bid_price?)
    }

    /// Premium of the mark price over the fair price, in percent
    pub fn mark_premium_pct(&self) -> Option<Decimal> {
        let mark = self.mark_price?;
        let fair = self.fair_price?;
        if fair.is_zero() {
            return None;
        }
        Some((mark - fair) / fair * Decimal::from(100))
    }
}

/// Insurance fund balance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    pub currency: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub wallet_balance: Option<i64>,
}

/// Liquidation order in the book
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liquidation {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub symbol: Option<String>,
    pub side: Option<Side>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub price: Option<Decimal>,
    pub leaves_qty: Option<i64>,
}

/// Level 2 orderbook row, keyed by (symbol, id, side)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookL2 {
    pub symbol: String,
    pub id: i64,
    pub side: Side,
    pub size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub price: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Top of book
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    pub bid_size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub bid_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub ask_price: Option<Decimal>,
    pub ask_size: Option<i64>,
}

impl Quote {
    /// Spread between ask and bid
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.ask_price? - self.bid_price?)
    }

    /// Mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.ask_price? + self.bid_price?) / Decimal::TWO)
    }
}

/// Contract settlement
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    pub settlement_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub settled_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub option_strike_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub option_underlying_price: Option<Decimal>,
    pub bankrupt: Option<i64>,
    pub tax_base: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub tax_rate: Option<Decimal>,
}

/// Public or private notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub ttl: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub closable: Option<bool>,
    pub persist: Option<bool>,
    pub wait_for_visibility: Option<bool>,
    pub sound: Option<String>,
}

/// Executed trade
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    pub side: Option<Side>,
    pub size: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub price: Option<Decimal>,
    pub tick_direction: Option<String>,
    #[serde(rename = "trdMatchID")]
    pub trd_match_id: Option<String>,
    pub gross_value: Option<i64>,
    pub home_notional: Option<f64>,
    pub foreign_notional: Option<f64>,
}

/// Aggregated trade bucket
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeBin {
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: String,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub open: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub high: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub low: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub close: Option<Decimal>,
    pub trades: Option<i64>,
    pub volume: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub vwap: Option<Decimal>,
    pub last_size: Option<i64>,
    pub turnover: Option<i64>,
    pub home_notional: Option<f64>,
    pub foreign_notional: Option<f64>,
}

impl TradeBin {
    /// Close minus open
    pub fn change(&self) -> Option<Decimal> {
        Some(self.close? - self.open?)
    }
}

// ============================================================================
// Private tables
// ============================================================================

/// Affiliate payout status
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Affiliate {
    pub account: i64,
    pub currency: String,
    pub prev_payout: Option<i64>,
    pub prev_turnover: Option<i64>,
    pub prev_comm: Option<i64>,
    pub exec_turnover: Option<i64>,
    pub exec_comm: Option<i64>,
    pub total_referrals: Option<i64>,
    pub total_turnover: Option<i64>,
    pub total_comm: Option<i64>,
    pub payout_pcnt: Option<f64>,
    pub pending_payout: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub referrer_account: Option<i64>,
}

/// Order execution (fill, cancel, funding, ...)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    #[serde(rename = "execID")]
    pub exec_id: String,
    #[serde(rename = "orderID")]
    pub order_id: Option<String>,
    #[serde(rename = "clOrdID")]
    pub cl_ord_id: Option<String>,
    pub account: Option<i64>,
    pub symbol: Option<String>,
    /// Empty for funding executions, hence not a [`Side`]
    pub side: Option<String>,
    pub last_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub last_px: Option<Decimal>,
    pub order_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub price: Option<Decimal>,
    pub exec_type: Option<String>,
    pub ord_type: Option<String>,
    pub ord_status: Option<String>,
    pub leaves_qty: Option<i64>,
    pub cum_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub avg_px: Option<Decimal>,
    pub commission: Option<f64>,
    pub exec_comm: Option<i64>,
    #[serde(rename = "trdMatchID")]
    pub trd_match_id: Option<String>,
    pub text: Option<String>,
    pub transact_time: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Live order
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "clOrdID")]
    pub cl_ord_id: Option<String>,
    pub account: Option<i64>,
    pub symbol: Option<String>,
    pub side: Option<Side>,
    pub order_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub stop_px: Option<Decimal>,
    pub ord_type: Option<String>,
    pub time_in_force: Option<String>,
    pub exec_inst: Option<String>,
    pub ord_status: Option<String>,
    pub working_indicator: Option<bool>,
    pub leaves_qty: Option<i64>,
    pub cum_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub avg_px: Option<Decimal>,
    pub text: Option<String>,
    pub transact_time: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns true once the order can no longer trade
    pub fn is_closed(&self) -> bool {
        matches!(
            self.ord_status.as_deref(),
            Some("Filled") | Some("Canceled") | Some("Rejected")
        )
    }
}

/// Account margin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Margin {
    pub account: i64,
    pub currency: String,
    pub risk_limit: Option<i64>,
    pub amount: Option<i64>,
    pub realised_pnl: Option<i64>,
    pub unrealised_pnl: Option<i64>,
    pub wallet_balance: Option<i64>,
    pub margin_balance: Option<i64>,
    pub margin_leverage: Option<f64>,
    pub margin_used_pcnt: Option<f64>,
    pub excess_margin: Option<i64>,
    pub available_margin: Option<i64>,
    pub withdrawable_margin: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Open position
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub account: i64,
    pub symbol: String,
    pub currency: Option<String>,
    pub leverage: Option<f64>,
    pub cross_margin: Option<bool>,
    pub current_qty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub avg_entry_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub mark_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub liquidation_price: Option<Decimal>,
    pub realised_pnl: Option<i64>,
    pub unrealised_pnl: Option<i64>,
    pub is_open: Option<bool>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    /// Returns true for a positive quantity
    pub fn is_long(&self) -> bool {
        self.current_qty.is_some_and(|qty| qty > 0)
    }
}

/// Deposit, withdrawal or realised PnL transfer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(rename = "transactID")]
    pub transact_id: String,
    pub account: Option<i64>,
    pub currency: Option<String>,
    pub transact_type: Option<String>,
    pub amount: Option<i64>,
    pub fee: Option<i64>,
    pub transact_status: Option<String>,
    pub address: Option<String>,
    pub tx: Option<String>,
    pub text: Option<String>,
    pub transact_time: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Wallet balance
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub account: i64,
    pub currency: String,
    pub deposited: Option<i64>,
    pub withdrawn: Option<i64>,
    pub transfer_in: Option<i64>,
    pub transfer_out: Option<i64>,
    pub amount: Option<i64>,
    pub pending_credit: Option<i64>,
    pub pending_debit: Option<i64>,
    pub addr: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}
