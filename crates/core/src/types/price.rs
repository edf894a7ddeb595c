//! Price-tier resolution using decimal arithmetic.
//!
//! Products carry a retail price and, optionally, an original (pre-discount)
//! price and a wholesale price. Which one a viewer sees depends on the
//! account tier of their session, resolved at read time; stored prices are
//! never rewritten.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing tier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountTier {
    /// Regular customer pricing (the default, also used for anonymous
    /// visitors).
    #[default]
    Retail,
    /// Wholesale accounts see the wholesale price where one is set.
    Wholesale,
}

impl AccountTier {
    /// Resolve the price to display for this tier.
    ///
    /// Wholesale accounts get `wholesale` when it is set; everyone else, and
    /// wholesale accounts on products without a wholesale price, get
    /// `retail`.
    #[must_use]
    pub fn resolve(self, retail: Decimal, wholesale: Option<Decimal>) -> Decimal {
        match (self, wholesale) {
            (Self::Wholesale, Some(price)) => price,
            _ => retail,
        }
    }
}

/// A resolved price as shown to one viewer.
///
/// `original` is present only when the product is discounted, so templates
/// can render a strike-through price next to the effective one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceView {
    /// The effective price after tier resolution.
    pub amount: Decimal,
    /// The pre-discount price, if the product is discounted.
    pub original: Option<Decimal>,
}

impl PriceView {
    /// Build a price view for a viewer tier.
    #[must_use]
    pub fn for_tier(
        tier: AccountTier,
        retail: Decimal,
        original: Option<Decimal>,
        wholesale: Option<Decimal>,
    ) -> Self {
        let amount = tier.resolve(retail, wholesale);
        // The strike-through price only makes sense against the retail price;
        // wholesale buyers see their price with no discount framing.
        let original = match tier {
            AccountTier::Wholesale if wholesale.is_some() => None,
            _ => original.filter(|orig| *orig > amount),
        };
        Self { amount, original }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn d(units: i64) -> Decimal {
        Decimal::from(units)
    }

    #[test]
    fn test_retail_tier_ignores_wholesale() {
        let price = AccountTier::Retail.resolve(d(30), Some(d(22)));
        assert_eq!(price, d(30));
    }

    #[test]
    fn test_wholesale_tier_uses_wholesale_price() {
        let price = AccountTier::Wholesale.resolve(d(30), Some(d(22)));
        assert_eq!(price, d(22));
    }

    #[test]
    fn test_wholesale_tier_without_wholesale_price_falls_back() {
        let price = AccountTier::Wholesale.resolve(d(30), None);
        assert_eq!(price, d(30));
    }

    #[test]
    fn test_price_view_keeps_original_when_discounted() {
        let view = PriceView::for_tier(AccountTier::Retail, d(25), Some(d(40)), None);
        assert_eq!(view.amount, d(25));
        assert_eq!(view.original, Some(d(40)));
    }

    #[test]
    fn test_price_view_drops_original_for_wholesale() {
        let view = PriceView::for_tier(AccountTier::Wholesale, d(25), Some(d(40)), Some(d(18)));
        assert_eq!(view.amount, d(18));
        assert_eq!(view.original, None);
    }

    #[test]
    fn test_price_view_drops_non_discount_original() {
        // original not above the effective price carries no information
        let view = PriceView::for_tier(AccountTier::Retail, d(25), Some(d(25)), None);
        assert_eq!(view.original, None);
    }

    #[test]
    fn test_fractional_prices() {
        // 25.99 retail, 19.50 wholesale
        let retail = Decimal::new(2599, 2);
        let wholesale = Decimal::new(1950, 2);
        assert_eq!(
            AccountTier::Wholesale.resolve(retail, Some(wholesale)),
            wholesale
        );
    }
}
