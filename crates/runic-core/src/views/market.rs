//! Market Panel
//!
//! Buy agent tokens with bitcoin or sell them back on the bonding curve.
//! The minimum-received amount is a required field; the canister rejects a
//! trade that would pay out less.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::amount::Denomination;
use crate::error::{Result, RunicError};
use crate::model::{AgentBy, BuyArgs, SellArgs};
use crate::service::CanisterConnector;
use crate::store::AppStore;
use crate::task::{ScopeHandle, ViewScope};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TradeSide {
    #[default]
    Buy,
    Sell,
}

impl TradeSide {
    /// Denomination of the amount the user spends
    pub const fn input(self) -> Denomination {
        match self {
            Self::Buy => Denomination::Bitcoin,
            Self::Sell => Denomination::Rune,
        }
    }

    /// Denomination of the amount the user receives
    pub const fn output(self) -> Denomination {
        match self {
            Self::Buy => Denomination::Rune,
            Self::Sell => Denomination::Bitcoin,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        }
    }
}

/// Raw form input
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TradeForm {
    pub side: TradeSide,
    pub amount: String,
    pub min_out: String,
}

/// A validated trade in minor units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeOrder {
    Buy { spend: u128, min_tokens: u128 },
    Sell { tokens: u128, min_collateral: u128 },
}

impl TradeForm {
    /// Convert the decimal inputs to minor units
    pub fn order(&self) -> Result<TradeOrder> {
        let amount = self.side.input().parse_minor(&self.amount)?;
        if amount == 0 {
            return Err(RunicError::Validation("Amount must be greater than zero".into()));
        }
        if self.min_out.trim().is_empty() {
            return Err(RunicError::Validation("Enter the minimum amount to receive".into()));
        }
        let min_out = self.side.output().parse_minor(&self.min_out)?;

        Ok(match self.side {
            TradeSide::Buy => TradeOrder::Buy {
                spend: amount,
                min_tokens: min_out,
            },
            TradeSide::Sell => TradeOrder::Sell {
                tokens: amount,
                min_collateral: min_out,
            },
        })
    }
}

/// Controller of the market tab
pub struct MarketPanel {
    agent: AgentBy,
    symbol: String,
    connector: Arc<dyn CanisterConnector>,
    store: AppStore,
    scope: ViewScope,
    busy: AtomicBool,
}

impl MarketPanel {
    pub fn new(
        agent: AgentBy,
        symbol: impl Into<String>,
        connector: Arc<dyn CanisterConnector>,
        store: AppStore,
    ) -> Self {
        Self {
            agent,
            symbol: symbol.into(),
            connector,
            store,
            scope: ViewScope::new(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn scope(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Submit a trade.
    ///
    /// Returns the notice shown to the user, or `None` when nothing was
    /// submitted (a trade already in flight, or the view was closed).
    pub async fn submit(&self, form: &TradeForm) -> Option<String> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return None;
        }
        let outcome = self.execute(form).await;
        self.busy.store(false, Ordering::Release);

        let notice = match outcome? {
            Ok(notice) => notice,
            Err(e) => {
                self.store.report(&e);
                return Some(e.user_message());
            }
        };
        self.scope.handle().apply(|| {
            self.store.set_warning(notice.clone());
            notice
        })
    }

    async fn execute(&self, form: &TradeForm) -> Option<Result<String>> {
        let order = match form.order() {
            Ok(order) => order,
            Err(e) => return Some(Err(e)),
        };
        let Some(wallet) = self.store.wallet() else {
            return Some(Err(RunicError::NotAuthenticated));
        };
        tracing::debug!(agent = %self.agent, ?order, "submitting trade");

        self.scope
            .handle()
            .guard(async {
                let service = self.connector.connect(Some(&wallet)).await?;
                let notice = match order {
                    TradeOrder::Buy { spend, min_tokens } => {
                        let received = service
                            .buy(BuyArgs {
                                id: self.agent.clone(),
                                amount_out_min: min_tokens,
                                buy_exact_in: spend,
                            })
                            .await?;
                        self.received(TradeSide::Buy, received)
                    }
                    TradeOrder::Sell {
                        tokens,
                        min_collateral,
                    } => {
                        let received = service
                            .sell(SellArgs {
                                id: self.agent.clone(),
                                token_amount: tokens,
                                amount_collateral_min: min_collateral,
                            })
                            .await?;
                        self.received(TradeSide::Sell, received)
                    }
                };
                Ok(notice)
            })
            .await
    }

    fn received(&self, side: TradeSide, amount: u128) -> String {
        let unit = match side {
            TradeSide::Buy => self.symbol.as_str(),
            TradeSide::Sell => side.output().label(),
        };
        format!("You received {} {unit}.", side.output().format_minor(amount))
    }

    pub fn close(&self) {
        self.scope.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Wallet;
    use crate::mock::{MockCall, MockCanister, TestIdentity};

    fn panel(canister: &MockCanister, signed_in: bool) -> MarketPanel {
        let store = AppStore::new();
        if signed_in {
            store.sign_in(Wallet::from_identity(Arc::new(TestIdentity::named("alice"))).unwrap());
        }
        MarketPanel::new(AgentBy::Id(1), "R", Arc::new(canister.clone()), store)
    }

    fn form(side: TradeSide, amount: &str, min_out: &str) -> TradeForm {
        TradeForm {
            side,
            amount: amount.into(),
            min_out: min_out.into(),
        }
    }

    #[test]
    fn test_order_scaling() {
        let buy = form(TradeSide::Buy, "0.00000001", "0.5").order().unwrap();
        assert_eq!(buy, TradeOrder::Buy { spend: 1, min_tokens: 500 });

        let sell = form(TradeSide::Sell, "2.5", "0.0001").order().unwrap();
        assert_eq!(sell, TradeOrder::Sell { tokens: 2_500, min_collateral: 10_000 });
    }

    #[test]
    fn test_min_out_is_required() {
        assert!(form(TradeSide::Buy, "1", "").order().is_err());
        assert!(form(TradeSide::Buy, "0", "0").order().is_err());
        assert!(form(TradeSide::Buy, "1", "0").order().is_ok());
    }

    #[tokio::test]
    async fn test_buy_sends_minor_units() {
        let canister = MockCanister::new();
        let panel = panel(&canister, true);

        let notice = panel.submit(&form(TradeSide::Buy, "0.001", "1")).await.unwrap();
        assert_eq!(
            canister.calls(),
            vec![MockCall::Buy(BuyArgs {
                id: AgentBy::Id(1),
                amount_out_min: 1_000,
                buy_exact_in: 100_000,
            })]
        );
        // mock pays out spend / 10
        assert_eq!(notice, "You received 10.000 R.");
        assert_eq!(panel.store.warning(), Some(notice));
        assert!(!panel.is_busy());
    }

    #[tokio::test]
    async fn test_sell_reports_bitcoin() {
        let canister = MockCanister::new();
        let panel = panel(&canister, true);
        let notice = panel.submit(&form(TradeSide::Sell, "1", "0")).await.unwrap();
        assert_eq!(notice, "You received 0.00010000 BTC.");
    }

    #[tokio::test]
    async fn test_rejection_is_surfaced() {
        let canister = MockCanister::new();
        canister.reject("buy", "Canister called `ic0.trap` with message: 'Insufficient funds'");
        let panel = panel(&canister, true);

        let notice = panel.submit(&form(TradeSide::Buy, "1", "0")).await.unwrap();
        assert_eq!(notice, "Insufficient funds");
        assert_eq!(panel.store.warning().as_deref(), Some("Insufficient funds"));
    }

    #[tokio::test]
    async fn test_requires_wallet_and_valid_input() {
        let canister = MockCanister::new();
        let panel = panel(&canister, false);
        let notice = panel.submit(&form(TradeSide::Buy, "1", "0")).await.unwrap();
        assert_eq!(notice, "Please connect your wallet first.");

        let panel = self::panel(&canister, true);
        let notice = panel.submit(&form(TradeSide::Buy, "abc", "0")).await.unwrap();
        assert_eq!(notice, "'abc' is not a valid amount");
        assert!(canister.calls().is_empty());
    }
}
