//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Every table except `owners` is partitioned by `owner_id`.

pub mod bill;
pub mod budget;
pub mod credit_card;
pub mod income_event;
pub mod owner;
pub mod payment;
pub mod spending_entry;

// Re-export specific types to avoid conflicts
pub use bill::{Column as BillColumn, Entity as Bill, Model as BillModel};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use credit_card::{
    Column as CreditCardColumn, Entity as CreditCard, Model as CreditCardModel,
};
pub use income_event::{
    Column as IncomeEventColumn, Entity as IncomeEvent, Model as IncomeEventModel,
};
pub use owner::{Column as OwnerColumn, Entity as Owner, Model as OwnerModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use spending_entry::{
    Column as SpendingEntryColumn, Entity as SpendingEntry, Model as SpendingEntryModel,
};
