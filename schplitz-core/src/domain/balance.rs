//! Balance summary between the two participants

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::{to_base, RateTable};
use super::expense::Expense;

/// Totals paid by each side in EUR and who owes whom.
///
/// `net_balance > 0` means B owes A that amount, `< 0` means A owes B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub name_a: String,
    pub name_b: String,
    pub total_a: Decimal,
    pub total_b: Decimal,
    pub net_balance: Decimal,
}

/// Direction of the settlement implied by a summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Settled,
    Owes {
        debtor: String,
        creditor: String,
        amount: Decimal,
    },
}

impl BalanceSummary {
    pub fn settlement(&self) -> Settlement {
        if self.net_balance.is_zero() {
            Settlement::Settled
        } else if self.net_balance > Decimal::ZERO {
            Settlement::Owes {
                debtor: self.name_b.clone(),
                creditor: self.name_a.clone(),
                amount: self.net_balance,
            }
        } else {
            Settlement::Owes {
                debtor: self.name_a.clone(),
                creditor: self.name_b.clone(),
                amount: -self.net_balance,
            }
        }
    }
}

/// Reduce a ledger to a summary.
///
/// Entries paid by anyone other than `name_a` or `name_b` are left out of
/// both totals.
pub fn summarize(entries: &[Expense], name_a: &str, name_b: &str, rates: &RateTable) -> BalanceSummary {
    let mut total_a = Decimal::ZERO;
    let mut total_b = Decimal::ZERO;

    for expense in entries {
        let base = to_base(expense.amount, expense.currency, rates);
        if expense.paid_by == name_a {
            total_a = total_a.saturating_add(base);
        } else if expense.paid_by == name_b {
            total_b = total_b.saturating_add(base);
        }
    }

    // A - (A + B) / 2, without forming A + B
    let net_balance = total_a.saturating_sub(total_b) / Decimal::TWO;

    BalanceSummary {
        name_a: name_a.to_string(),
        name_b: name_b.to_string(),
        total_a,
        total_b,
        net_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;
    use chrono::NaiveDate;

    fn expense(id: &str, amount: Decimal, currency: Currency, paid_by: &str) -> Expense {
        Expense {
            id: id.to_string(),
            description: "x".to_string(),
            amount,
            currency,
            paid_by: paid_by.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_b_owes_a() {
        let entries = vec![
            expense("1", Decimal::new(100, 0), Currency::Eur, "A"),
            expense("2", Decimal::new(50, 0), Currency::Eur, "B"),
        ];
        let summary = summarize(&entries, "A", "B", &RateTable::fallback());

        assert_eq!(summary.total_a, Decimal::new(100, 0));
        assert_eq!(summary.total_b, Decimal::new(50, 0));
        assert_eq!(summary.net_balance, Decimal::new(25, 0));
        assert_eq!(
            summary.settlement(),
            Settlement::Owes {
                debtor: "B".to_string(),
                creditor: "A".to_string(),
                amount: Decimal::new(25, 0),
            }
        );
    }

    #[test]
    fn test_equal_spend_is_settled_exactly() {
        let entries = vec![
            expense("1", Decimal::new(3333, 2), Currency::Eur, "A"),
            expense("2", Decimal::new(3333, 2), Currency::Eur, "B"),
        ];
        let summary = summarize(&entries, "A", "B", &RateTable::fallback());
        assert!(summary.net_balance.is_zero());
        assert_eq!(summary.settlement(), Settlement::Settled);
    }

    #[test]
    fn test_unknown_payer_is_excluded() {
        let entries = vec![
            expense("1", Decimal::new(10, 0), Currency::Eur, "A"),
            expense("2", Decimal::new(999, 0), Currency::Eur, "C"),
        ];
        let summary = summarize(&entries, "A", "B", &RateTable::fallback());
        assert_eq!(summary.total_a, Decimal::new(10, 0));
        assert_eq!(summary.total_b, Decimal::ZERO);
        assert_eq!(summary.net_balance, Decimal::new(5, 0));
    }

    #[test]
    fn test_converts_foreign_currency() {
        let mut rates = RateTable::fallback();
        rates.rates.insert(Currency::Usd, Decimal::new(2, 0));
        let entries = vec![expense("1", Decimal::new(40, 0), Currency::Usd, "B")];

        let summary = summarize(&entries, "A", "B", &rates);
        assert_eq!(summary.total_b, Decimal::new(20, 0));
        assert_eq!(summary.net_balance, Decimal::new(-10, 0));
    }

    #[test]
    fn test_huge_totals_saturate() {
        let huge = Decimal::MAX / Decimal::TWO + Decimal::ONE;
        let entries = vec![
            expense("1", huge, Currency::Eur, "A"),
            expense("2", huge, Currency::Eur, "A"),
            expense("3", huge, Currency::Eur, "A"),
            expense("4", Decimal::ONE, Currency::Eur, "B"),
        ];
        let summary = summarize(&entries, "A", "B", &RateTable::fallback());
        assert_eq!(summary.total_a, Decimal::MAX);
        assert!(summary.net_balance > Decimal::ZERO);

        let mut rates = RateTable::fallback();
        rates.rates.insert(Currency::Usd, Decimal::new(1, 28));
        let tiny_rate = vec![expense("1", Decimal::MAX, Currency::Usd, "B")];
        let summary = summarize(&tiny_rate, "A", "B", &rates);
        assert!(summary.net_balance < Decimal::ZERO);
    }

    #[test]
    fn test_empty_ledger() {
        let summary = summarize(&[], "A", "B", &RateTable::fallback());
        assert_eq!(summary.settlement(), Settlement::Settled);
    }
}
