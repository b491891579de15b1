//! Invoice numbers and the invoice document derived from an order.

use crate::model::{Order, OrderLine, User};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// `INV-YYYYMMDD-NNN`: a calendar date plus a per-date sequence starting at 1.
///
/// The sequence is zero-padded to three digits and simply grows wider past 999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber {
    date: NaiveDate,
    sequence: u32,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Malformed invoice number: {0}")]
pub struct InvoiceNumberParseError(pub String);

impl InvoiceNumber {
    pub fn new(date: NaiveDate, sequence: u32) -> Self {
        Self { date, sequence }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "INV-{}-{:03}", self.date.format("%Y%m%d"), self.sequence)
    }
}

impl FromStr for InvoiceNumber {
    type Err = InvoiceNumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvoiceNumberParseError(s.to_string());

        let rest = s.strip_prefix("INV-").ok_or_else(malformed)?;
        let (date, sequence) = rest.split_once('-').ok_or_else(malformed)?;

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if sequence.len() < 3 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| malformed())?;
        let sequence: u32 = sequence.parse().map_err(|_| malformed())?;
        if sequence == 0 {
            return Err(malformed());
        }
        Ok(Self { date, sequence })
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = InvoiceNumberParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(value: InvoiceNumber) -> Self {
        value.to_string()
    }
}

/// The customer-facing invoice for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: InvoiceNumber,
    pub invoice_date: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: String,
    pub payment_method: String,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Invoice {
    /// Builds the invoice for `order`, billed to `customer`.
    ///
    /// Tax is `subtotal * tax_rate` rounded half away from zero to cents.
    pub fn for_order(order: &Order, customer: &User, tax_rate: Decimal) -> Self {
        let subtotal = order.total;
        let tax = (subtotal * tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Self {
            invoice_number: order.invoice_number,
            invoice_date: order.created_at,
            customer_name: customer.full_name(),
            customer_email: customer.email.clone(),
            shipping_address: order.shipping_address.clone(),
            payment_method: order.payment_method.clone(),
            items: order.lines.clone(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}
