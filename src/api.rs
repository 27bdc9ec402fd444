//! Request facade - the logical operations a transport layer exposes.
//!
//! Every call carries the caller's identity as an opaque key. It is resolved
//! to an owner first; a missing or unknown identity is `Unauthorized`.
//! Mutations hold the owner's lock for the whole read-modify-write so that
//! concurrent requests for one owner apply one after another.

use crate::{
    config::settings::LedgerSettings,
    core::{
        bill::{self, BillUpdate, NewBill},
        budget::{self, BudgetStatus},
        card::{self, CardUpdate, NewCard},
        insights::{self, Insight},
        locks::OwnerLocks,
        owner,
        payment::{self, PaymentKind, PaymentOutcome},
        report::{self, CategoryTotal, Dashboard, Report, ReportType, UpcomingPayment},
        spending::{self, SpendingCategory},
    },
    entities::{self, bill as bill_entity, credit_card, spending_entry},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tracing::debug;

/// Shared state behind every request. Share it between tasks behind an `Arc`.
#[derive(Debug)]
pub struct BudgetApi {
    /// Database connection for all operations
    pub db: DatabaseConnection,
    locks: OwnerLocks,
    settings: LedgerSettings,
}

impl BudgetApi {
    /// Creates the facade over `db` with the given thresholds.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self {
            db,
            locks: OwnerLocks::new(),
            settings,
        }
    }

    /// Thresholds in effect.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    async fn owner(&self, identity: Option<&str>) -> Result<entities::owner::Model> {
        let owner = owner::resolve_owner(&self.db, identity).await?;
        debug!(owner_id = owner.id, "Resolved identity");
        Ok(owner)
    }

    /// Registers a new owner. Needs no identity.
    pub async fn register(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<entities::owner::Model> {
        owner::register_owner(&self.db, email, display_name).await
    }

    // Budget

    /// The caller's budget, or `NotFound`.
    pub async fn budget(&self, identity: Option<&str>) -> Result<entities::budget::Model> {
        let owner = self.owner(identity).await?;
        budget::require_budget(&self.db, owner.id).await
    }

    /// Sets the caller's budget.
    pub async fn set_budget(
        &self,
        identity: Option<&str>,
        amount: f64,
    ) -> Result<entities::budget::Model> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        budget::set_budget(&self.db, owner.id, amount).await
    }

    /// Initial budget and what remains after spending.
    pub async fn budget_status(&self, identity: Option<&str>) -> Result<BudgetStatus> {
        let owner = self.owner(identity).await?;
        budget::budget_status(&self.db, owner.id).await
    }

    // Cards

    /// Cards with an outstanding balance.
    pub async fn unpaid_cards(&self, identity: Option<&str>) -> Result<Vec<credit_card::Model>> {
        let owner = self.owner(identity).await?;
        card::list_unpaid_cards(&self.db, owner.id).await
    }

    /// All of the caller's cards.
    pub async fn cards(&self, identity: Option<&str>) -> Result<Vec<credit_card::Model>> {
        let owner = self.owner(identity).await?;
        card::list_cards(&self.db, owner.id).await
    }

    /// Adds a card.
    pub async fn add_card(
        &self,
        identity: Option<&str>,
        new: NewCard,
    ) -> Result<credit_card::Model> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        card::add_card(&self.db, owner.id, new).await
    }

    /// Updates the fields given in `update`.
    pub async fn update_card(
        &self,
        identity: Option<&str>,
        bank_name: &str,
        update: CardUpdate,
    ) -> Result<credit_card::Model> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        card::update_card(&self.db, owner.id, bank_name, update).await
    }

    /// Deletes a card.
    pub async fn delete_card(&self, identity: Option<&str>, bank_name: &str) -> Result<()> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        card::delete_card(&self.db, owner.id, bank_name).await
    }

    // Bills

    /// Bills not yet paid.
    pub async fn unpaid_bills(&self, identity: Option<&str>) -> Result<Vec<bill_entity::Model>> {
        let owner = self.owner(identity).await?;
        bill::list_unpaid_bills(&self.db, owner.id).await
    }

    /// All of the caller's bills.
    pub async fn bills(&self, identity: Option<&str>) -> Result<Vec<bill_entity::Model>> {
        let owner = self.owner(identity).await?;
        bill::list_bills(&self.db, owner.id).await
    }

    /// Adds a bill.
    pub async fn add_bill(&self, identity: Option<&str>, new: NewBill) -> Result<bill_entity::Model> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        bill::add_bill(&self.db, owner.id, new).await
    }

    /// Updates the fields given in `update`.
    pub async fn update_bill(
        &self,
        identity: Option<&str>,
        bill_name: &str,
        update: BillUpdate,
    ) -> Result<bill_entity::Model> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        bill::update_bill(&self.db, owner.id, bill_name, update).await
    }

    /// Deletes a bill.
    pub async fn delete_bill(&self, identity: Option<&str>, bill_name: &str) -> Result<()> {
        let owner = self.owner(identity).await?;
        let _guard = self.locks.lock(owner.id).await;
        bill::delete_bill(&self.db, owner.id, bill_name).await
    }

    // Payments

    /// Pays `amount` towards a bill or card. `kind` is `"bill"` or `"card"`.
    pub async fn make_payment(
        &self,
        identity: Option<&str>,
        kind: &str,
        target: &str,
        amount: f64,
    ) -> Result<PaymentOutcome> {
        let owner = self.owner(identity).await?;
        let kind: PaymentKind = kind.parse()?;
        let _guard = self.locks.lock(owner.id).await;
        payment::apply_payment(&self.db, owner.id, kind, target, amount).await
    }

    // Spending

    /// Logs spending in `category`.
    pub async fn log_spending(
        &self,
        identity: Option<&str>,
        category: &str,
        amount: f64,
    ) -> Result<spending_entry::Model> {
        let owner = self.owner(identity).await?;
        let category: SpendingCategory = category.parse()?;
        let _guard = self.locks.lock(owner.id).await;
        spending::log_spending(&self.db, owner.id, category, amount).await
    }

    /// Removes every entry in `category`; returns how many were removed.
    pub async fn delete_spending(&self, identity: Option<&str>, category: &str) -> Result<u64> {
        let owner = self.owner(identity).await?;
        let category: SpendingCategory = category.parse()?;
        let _guard = self.locks.lock(owner.id).await;
        spending::delete_spending_category(&self.db, owner.id, category).await
    }

    /// Spending per category, largest first.
    pub async fn spending_summary(&self, identity: Option<&str>) -> Result<Vec<CategoryTotal>> {
        let owner = self.owner(identity).await?;
        report::spending_summary(&self.db, owner.id).await
    }

    /// Latest spending entries, newest first.
    pub async fn recent_spending(
        &self,
        identity: Option<&str>,
    ) -> Result<Vec<spending_entry::Model>> {
        let owner = self.owner(identity).await?;
        spending::recent_spending(&self.db, owner.id, self.settings.recent_spending_limit).await
    }

    // Reports

    /// Builds a `"monthly_balance"` or `"category_spending"` report for `year`.
    pub async fn generate_report(
        &self,
        identity: Option<&str>,
        report_type: &str,
        year: i32,
    ) -> Result<Report> {
        let owner = self.owner(identity).await?;
        let report_type: ReportType = report_type.parse()?;
        report::generate_report(&self.db, owner.id, report_type, year).await
    }

    /// Outstanding bills and cards ordered by due date.
    pub async fn upcoming_payments(
        &self,
        identity: Option<&str>,
        today: NaiveDate,
    ) -> Result<Vec<UpcomingPayment>> {
        let owner = self.owner(identity).await?;
        report::upcoming_payments_for_owner(&self.db, owner.id, today).await
    }

    /// Overview figures.
    pub async fn dashboard(&self, identity: Option<&str>, today: NaiveDate) -> Result<Dashboard> {
        let owner = self.owner(identity).await?;
        report::dashboard(&self.db, owner.id, today).await
    }

    /// Advice for the month containing `today`.
    pub async fn insights(&self, identity: Option<&str>, today: NaiveDate) -> Result<Vec<Insight>> {
        let owner = self.owner(identity).await?;
        insights::insights_for_owner(&self.db, owner.id, today, &self.settings).await
    }
}
