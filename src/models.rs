// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RateType {
    #[default]
    #[serde(rename = "Vast")]
    Fixed,
    #[serde(rename = "Variabel")]
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "Lopend")]
    Active,
    #[serde(rename = "Afgelost")]
    Repaid,
    #[serde(rename = "In aanvraag")]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    #[serde(rename = "Betaald")]
    Paid,
    #[serde(rename = "Ingepland")]
    Scheduled,
    #[serde(rename = "Te laat")]
    Late,
}

// Stored and printed with the same labels the API uses.
macro_rules! labelled_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        Error::validation(format!(
                            "unknown {} '{}', expected one of: {}",
                            $what,
                            s,
                            allowed.join(", ")
                        ))
                    })
            }
        }
    };
}

labelled_enum!(RateType, "rentetype", { Fixed => "Vast", Variable => "Variabel" });
labelled_enum!(LoanStatus, "loan status", {
    Active => "Lopend",
    Repaid => "Afgelost",
    Pending => "In aanvraag",
});
labelled_enum!(PaymentStatus, "payment status", {
    Paid => "Betaald",
    Scheduled => "Ingepland",
    Late => "Te laat",
});

/// A stored loan (`lening`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    #[serde(rename = "lening_id")]
    pub id: String,
    #[serde(rename = "kredietverstrekker")]
    pub lender: String,
    #[serde(rename = "type")]
    pub loan_type: String,
    #[serde(rename = "startdatum")]
    pub start_date: NaiveDate,
    #[serde(rename = "einddatum")]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "bedrag")]
    pub principal: Decimal,
    #[serde(rename = "rentepercentage")]
    pub interest_rate: Decimal,
    #[serde(rename = "rentetype")]
    pub rate_type: RateType,
    pub status: LoanStatus,
    #[serde(rename = "opmerkingen")]
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of a create or update request for a loan.
///
/// `id` is only honoured on create; on update it must be absent or equal to
/// the loan being updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    #[serde(rename = "lening_id", default)]
    pub id: Option<String>,
    #[serde(rename = "kredietverstrekker")]
    pub lender: String,
    #[serde(rename = "type")]
    pub loan_type: String,
    #[serde(rename = "startdatum")]
    pub start_date: NaiveDate,
    #[serde(rename = "einddatum", default)]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "bedrag")]
    pub principal: Decimal,
    #[serde(rename = "rentepercentage")]
    pub interest_rate: Decimal,
    #[serde(rename = "rentetype", default)]
    pub rate_type: RateType,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(rename = "opmerkingen", default)]
    pub notes: Option<String>,
}

/// A stored repayment installment (`betaling`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "betaling_id")]
    pub id: String,
    #[serde(rename = "lening_id")]
    pub loan_id: String,
    #[serde(rename = "datum")]
    pub date: NaiveDate,
    #[serde(rename = "termijnbedrag")]
    pub installment: Decimal,
    #[serde(rename = "aflossing")]
    pub principal: Decimal,
    #[serde(rename = "rente")]
    pub interest: Decimal,
    pub status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Payment {
    /// True when the installment equals principal plus interest.
    pub fn is_balanced(&self) -> bool {
        self.principal.checked_add(self.interest) == Some(self.installment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInput {
    #[serde(rename = "betaling_id", default)]
    pub id: Option<String>,
    // the dashboard posts `leningId` as a number
    #[serde(
        rename = "lening_id",
        alias = "leningId",
        deserialize_with = "id_from_text_or_number"
    )]
    pub loan_id: String,
    #[serde(rename = "datum")]
    pub date: NaiveDate,
    #[serde(rename = "termijnbedrag")]
    pub installment: Decimal,
    #[serde(rename = "aflossing")]
    pub principal: Decimal,
    #[serde(rename = "rente")]
    pub interest: Decimal,
    #[serde(default)]
    pub status: PaymentStatus,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if end < start {
            return Err(Error::validation(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
