use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::messages;
use crate::models::cart::{Cart, CartLine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    coffee_name: String,
    coffee_type: String,
    quantity: Decimal,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl ReceiptLine {
    pub fn coffee_name(&self) -> &str {
        &self.coffee_name
    }

    pub fn coffee_type(&self) -> &str {
        &self.coffee_type
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

impl From<&CartLine> for ReceiptLine {
    fn from(line: &CartLine) -> Self {
        Self {
            coffee_name: line.name.clone(),
            coffee_type: line
                .type_name
                .clone()
                .unwrap_or_else(|| messages::TYPE_UNSPECIFIED.to_string()),
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal,
        }
    }
}

/// What was sold, as printed on the invoice. Built once when the order is
/// committed and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    order_id: i32,
    created_at: DateTime<Utc>,
    customer_name: String,
    phone_number: Option<String>,
    status: String,
    notes: Option<String>,
    total: Decimal,
    amount_paid: Decimal,
    change: Decimal,
    lines: Vec<ReceiptLine>,
}

pub struct ReceiptHeader {
    pub order_id: i32,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub phone_number: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

impl Receipt {
    pub fn new(header: ReceiptHeader, cart: &Cart) -> Self {
        Self {
            order_id: header.order_id,
            created_at: header.created_at,
            customer_name: header.customer_name,
            phone_number: header.phone_number,
            status: header.status,
            notes: header.notes,
            total: cart.total(),
            amount_paid: cart.amount_paid(),
            change: cart.change(),
            lines: cart.lines().iter().map(ReceiptLine::from).collect(),
        }
    }

    pub fn order_id(&self) -> i32 {
        self.order_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    pub fn change(&self) -> Decimal {
        self.change
    }

    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }
}
