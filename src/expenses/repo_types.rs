use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency_id: String,
    pub amount: Decimal,
    pub category: String,
    pub vendor: String,
    pub created_at: OffsetDateTime,
}

/// Validated, normalized input for an insert. The owner comes from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: Decimal,
    pub category: String,
    pub vendor: String,
    pub currency_id: String,
}

/// Validated partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub currency_id: Option<String>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrites exactly the fields present in the patch. Ownership and
    /// identity are not patchable.
    pub fn apply(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(vendor) = self.vendor {
            expense.vendor = vendor;
        }
        if let Some(currency_id) = self.currency_id {
            expense.currency_id = currency_id;
        }
    }
}
