use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

use crate::lifecycle::Visibility;
use crate::verification::{DonationStatus, VerificationStatus};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub image: Option<String>,
    pub attendees: i64,
    /// `active` or `completed`; restored events always come back as `active`.
    pub status: String,
    /// `upcoming` or `past`, derived from the event date at read time.
    pub event_type: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn event_type_on(date: NaiveDate, today: NaiveDate) -> &'static str {
        if date < today {
            "past"
        } else {
            "upcoming"
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub position: String,
    pub congregation: String,
    pub quote: String,
    pub image: Option<String>,
    pub is_council: bool,
    pub position_order: i64,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub position: String,
    pub content: String,
    pub rating: i64,
    pub is_featured: bool,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MinistryRegistration {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ministry: String,
    pub congregation: String,
    pub is_approved: bool,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Momo,
    Cash,
    Bank,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Momo, PaymentMethod::Cash, PaymentMethod::Bank];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Momo => "momo",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bank => "bank",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "momo" => Some(PaymentMethod::Momo),
            "cash" => Some(PaymentMethod::Cash),
            "bank" => Some(PaymentMethod::Bank),
            _ => None,
        }
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        PaymentMethod::parse(s)
            .ok_or_else(|| FromSqlError::Other(format!("unknown payment method: {s}").into()))
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Donation {
    pub id: String,
    pub donor_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub verification_status: VerificationStatus,
    pub status: DonationStatus,
    pub receipt_code: String,
    pub transaction_id: String,
    pub admin_verified_by: Option<String>,
    pub admin_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub password: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// The participant-facing view: neither the password nor the answer key
    /// leaves the server while the quiz is open.
    pub fn public_view(&self) -> PublicQuiz {
        PublicQuiz {
            id: self.id.clone(),
            title: self.title.clone(),
            question: self.question.clone(),
            option_a: self.option_a.clone(),
            option_b: self.option_b.clone(),
            option_c: self.option_c.clone(),
            option_d: self.option_d.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct PublicQuiz {
    pub id: String,
    pub title: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizSubmission {
    pub id: String,
    pub quiz_id: String,
    pub name: String,
    pub phone_number: String,
    pub congregation: String,
    pub selected_answer: String,
    pub submitted_at: DateTime<Utc>,
}

/// Normalize an answer choice to its canonical `A`..`D` form.
pub fn normalize_answer(input: &str) -> Option<String> {
    let upper = input.trim().to_uppercase();
    match upper.as_str() {
        "A" | "B" | "C" | "D" => Some(upper),
        _ => None,
    }
}
