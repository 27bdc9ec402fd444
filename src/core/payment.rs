//! Payment allocation - applies a payment to a named bill or credit card.
//!
//! The amount is validated and the target looked up before anything is
//! written. The balance update and the payment record are committed in one
//! database transaction.
//!
//! Overpayment is floored at zero: whatever exceeds the outstanding amount is
//! discarded and reported back in [`PaymentOutcome::discarded`]. There is no
//! idempotency key, so submitting the same payment twice applies it twice.

use crate::{
    entities::{Payment, bill, credit_card, payment},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// What a payment is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// A bill, addressed by bill name
    Bill,
    /// A credit card, addressed by bank name
    Card,
}

impl PaymentKind {
    /// Name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bill" => Ok(Self::Bill),
            "card" => Ok(Self::Card),
            other => Err(Error::validation(format!("Invalid payment type '{other}'"))),
        }
    }
}

/// How a payment splits against an outstanding amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// Outstanding amount after the payment, never negative
    pub remaining: f64,
    /// Portion of the payment that reduced the outstanding amount
    pub applied: f64,
    /// Portion of the payment beyond the outstanding amount
    pub discarded: f64,
}

/// Splits `payment` against `outstanding`, flooring the result at zero.
#[must_use]
pub fn allocate(outstanding: f64, payment: f64) -> Allocation {
    let remaining = (outstanding - payment).max(0.0);
    let applied = outstanding - remaining;
    Allocation {
        remaining,
        applied,
        discarded: payment - applied,
    }
}

/// Snapshot of the target after the payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum PaymentTarget {
    /// The updated bill
    Bill(bill::Model),
    /// The updated card
    Card(credit_card::Model),
}

/// Result of applying a payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    /// The recorded payment
    pub payment: payment::Model,
    /// Target state after the payment
    pub target: PaymentTarget,
    /// Amount that reduced the outstanding balance
    pub applied: f64,
    /// Excess over the outstanding balance that was dropped
    pub discarded: f64,
}

fn validate_payment_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidPayment {
            message: format!("Payment amount must be greater than zero, got {amount}"),
        });
    }
    Ok(())
}

/// Applies a payment now.
pub async fn apply_payment(
    db: &DatabaseConnection,
    owner_id: i64,
    kind: PaymentKind,
    target_name: &str,
    amount: f64,
) -> Result<PaymentOutcome> {
    apply_payment_at(db, owner_id, kind, target_name, amount, Utc::now()).await
}

/// Applies a payment, recording it at `at`.
///
/// * bill: `amount = max(0, amount - payment)`, and the bill is marked paid
///   when it reaches zero. Paying a bill that is already paid is rejected.
/// * card: `current_balance = max(0, current_balance - payment)`.
pub async fn apply_payment_at(
    db: &DatabaseConnection,
    owner_id: i64,
    kind: PaymentKind,
    target_name: &str,
    amount: f64,
    at: DateTime<Utc>,
) -> Result<PaymentOutcome> {
    validate_payment_amount(amount)?;
    let target_name = super::normalize_name("Payment target", target_name)?;
    let target_name = target_name.as_str();

    let txn = db.begin().await?;

    let (target, allocation) = match kind {
        PaymentKind::Bill => {
            let bill = super::bill::require_bill(&txn, owner_id, target_name).await?;
            if bill.is_paid {
                return Err(Error::InvalidPayment {
                    message: format!("Bill '{target_name}' is already paid"),
                });
            }

            let allocation = allocate(bill.amount, amount);
            let mut active_model: bill::ActiveModel = bill.into();
            active_model.amount = Set(allocation.remaining);
            if allocation.remaining <= 0.0 {
                active_model.is_paid = Set(true);
            }
            (PaymentTarget::Bill(active_model.update(&txn).await?), allocation)
        }
        PaymentKind::Card => {
            let card = super::card::require_card(&txn, owner_id, target_name).await?;

            let allocation = allocate(card.current_balance, amount);
            let mut active_model: credit_card::ActiveModel = card.into();
            active_model.current_balance = Set(allocation.remaining);
            (PaymentTarget::Card(active_model.update(&txn).await?), allocation)
        }
    };

    let payment = payment::ActiveModel {
        owner_id: Set(owner_id),
        kind: Set(kind.as_str().to_string()),
        target_name: Set(target_name.to_string()),
        amount: Set(amount),
        timestamp: Set(at),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if allocation.discarded > 0.0 {
        warn!(
            owner_id,
            %kind,
            target_name,
            discarded = allocation.discarded,
            "Payment exceeded the outstanding amount; excess discarded"
        );
    }
    info!(owner_id, %kind, target_name, amount, "Payment applied");

    Ok(PaymentOutcome {
        payment,
        target,
        applied: allocation.applied,
        discarded: allocation.discarded,
    })
}

/// Every payment of the owner, oldest first.
pub async fn list_payments(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::OwnerId.eq(owner_id))
        .order_by_asc(payment::Column::Timestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Payments made in `[start, end)`, oldest first.
pub async fn payments_between(
    db: &DatabaseConnection,
    owner_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<payment::Model>> {
    Payment::find()
        .filter(payment::Column::OwnerId.eq(owner_id))
        .filter(payment::Column::Timestamp.gte(start))
        .filter(payment::Column::Timestamp.lt(end))
        .order_by_asc(payment::Column::Timestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::core::{bill as bills, card as cards};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_allocate_partial() {
        let allocation = allocate(100.0, 40.0);
        assert_eq!(allocation.remaining, 60.0);
        assert_eq!(allocation.applied, 40.0);
        assert_eq!(allocation.discarded, 0.0);
    }

    #[test]
    fn test_allocate_overpayment_floors_at_zero() {
        for (outstanding, paid) in [(100.0, 150.0), (0.0, 10.0), (99.5, 1000.0)] {
            let allocation = allocate(outstanding, paid);
            assert_eq!(allocation.remaining, 0.0);
            assert_eq!(allocation.applied, outstanding);
            assert_eq!(allocation.discarded, paid - outstanding);
        }
    }

    #[test]
    fn test_payment_kind_parsing() {
        assert_eq!("bill".parse::<PaymentKind>().unwrap(), PaymentKind::Bill);
        assert_eq!(" CARD ".parse::<PaymentKind>().unwrap(), PaymentKind::Card);
        assert!(matches!(
            "loan".parse::<PaymentKind>(),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_payment_amount_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = apply_payment(&db, 1, PaymentKind::Bill, "Rent", amount).await;
            assert!(matches!(result, Err(Error::InvalidPayment { .. })));
        }
    }

    #[tokio::test]
    async fn test_pay_bill_in_full_marks_paid() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        bills::add_bill(&db, owner.id, new_bill("Electricity", 150.0)).await?;

        let outcome = apply_payment(&db, owner.id, PaymentKind::Bill, "Electricity", 150.0).await?;

        let PaymentTarget::Bill(bill) = outcome.target else {
            panic!("expected a bill target");
        };
        assert!(bill.is_paid);
        assert_eq!(bill.amount, 0.0);
        assert_eq!(outcome.applied, 150.0);
        assert_eq!(outcome.discarded, 0.0);
        assert_eq!(outcome.payment.kind, "bill");
        assert_eq!(outcome.payment.amount, 150.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_bill_partial_then_remaining() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        bills::add_bill(&db, owner.id, new_bill("Rent", 900.0)).await?;

        apply_payment(&db, owner.id, PaymentKind::Bill, "Rent", 400.0).await?;
        let bill = bills::require_bill(&db, owner.id, "Rent").await?;
        assert_eq!(bill.amount, 500.0);
        assert!(!bill.is_paid);

        apply_payment(&db, owner.id, PaymentKind::Bill, "Rent", 500.0).await?;
        let bill = bills::require_bill(&db, owner.id, "Rent").await?;
        assert_eq!(bill.amount, 0.0);
        assert!(bill.is_paid);

        // Paid is terminal
        let result = apply_payment(&db, owner.id, PaymentKind::Bill, "Rent", 10.0).await;
        assert!(matches!(result, Err(Error::InvalidPayment { .. })));
        assert_eq!(list_payments(&db, owner.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_bill_overpayment_discards_excess() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        bills::add_bill(&db, owner.id, new_bill("Internet", 100.0)).await?;

        let outcome = apply_payment(&db, owner.id, PaymentKind::Bill, "Internet", 150.0).await?;
        assert_eq!(outcome.applied, 100.0);
        assert_eq!(outcome.discarded, 50.0);

        let bill = bills::require_bill(&db, owner.id, "Internet").await?;
        assert_eq!(bill.amount, 0.0);
        assert!(bill.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_card_payment_floors_at_zero() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        cards::add_card(&db, owner.id, new_card("Acme", 500.0, 200.0)).await?;

        let outcome = apply_payment(&db, owner.id, PaymentKind::Card, "Acme", 50.0).await?;
        let PaymentTarget::Card(card) = outcome.target else {
            panic!("expected a card target");
        };
        assert_eq!(card.current_balance, 150.0);

        apply_payment(&db, owner.id, PaymentKind::Card, "Acme", 1000.0).await?;
        let card = cards::require_card(&db, owner.id, "Acme").await?;
        assert_eq!(card.current_balance, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_to_missing_target() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        bills::add_bill(&db, owner.id, new_bill("Acme", 100.0)).await?;

        // A bill named "Acme" does not make a card named "Acme"
        let result = apply_payment(&db, owner.id, PaymentKind::Card, "Acme", 10.0).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let result = apply_payment(&db, owner.id, PaymentKind::Bill, "Nope", 10.0).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        let result = apply_payment(&db, owner.id, PaymentKind::Bill, "  ", 10.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(list_payments(&db, owner.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_for_other_owner_is_not_found() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        let other = create_test_owner(&db, "other@example.com").await?;
        cards::add_card(&db, owner.id, new_card("Acme", 500.0, 200.0)).await?;

        let result = apply_payment(&db, other.id, PaymentKind::Card, "Acme", 10.0).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert_eq!(
            cards::require_card(&db, owner.id, "Acme").await?.current_balance,
            200.0
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_submission_applies_twice() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        cards::add_card(&db, owner.id, new_card("Acme", 500.0, 200.0)).await?;

        apply_payment(&db, owner.id, PaymentKind::Card, "Acme", 50.0).await?;
        apply_payment(&db, owner.id, PaymentKind::Card, "Acme", 50.0).await?;

        let card = cards::require_card(&db, owner.id, "Acme").await?;
        assert_eq!(card.current_balance, 100.0);
        assert_eq!(list_payments(&db, owner.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_payments_between() -> Result<()> {
        let (db, owner) = setup_with_owner().await?;
        cards::add_card(&db, owner.id, new_card("Acme", 500.0, 200.0)).await?;

        apply_payment_at(&db, owner.id, PaymentKind::Card, "Acme", 10.0, at(2024, 1, 10)).await?;
        apply_payment_at(&db, owner.id, PaymentKind::Card, "Acme", 20.0, at(2024, 2, 10)).await?;

        let (start, end) = crate::core::period::month_bounds(2024, 2)?;
        let february = payments_between(&db, owner.id, start, end).await?;
        assert_eq!(february.len(), 1);
        assert_eq!(february[0].amount, 20.0);

        Ok(())
    }
}
