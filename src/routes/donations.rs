use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json as AxumJson, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthenticatedAdmin;
use crate::db::{self, models::Donation, models::PaymentMethod, DonationFilter, DonationPatch, VerificationOutcome};
use crate::error::ApiError;
use crate::stats;
use crate::verification::{DonationStatus, VerificationStatus};
use crate::AppState;

#[derive(Deserialize)]
pub struct SubmitDonationRequest {
    pub donor_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub payment_method: String,
}

#[derive(Deserialize)]
pub struct UpdateDonationRequest {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub verification_status: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub verification_status: Option<String>,
    pub payment_method: Option<String>,
    /// `filter=pending` is the dashboard's shorthand for the pending-only view.
    pub filter: Option<String>,
}

fn check_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::validation(
            "Amount must be a non-negative number",
        ));
    }
    Ok(())
}

fn parse_method(raw: &str) -> Result<PaymentMethod, ApiError> {
    PaymentMethod::parse(raw).ok_or_else(|| {
        ApiError::validation(format!(
            "Unknown payment method '{raw}'; use momo, cash or bank"
        ))
    })
}

pub async fn submit_donation(
    State(state): State<AppState>,
    Json(req): Json<SubmitDonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.donor_name.trim().is_empty() {
        return Err(ApiError::validation("Donor name is required"));
    }
    check_amount(req.amount)?;
    let payment_method = parse_method(&req.payment_method)?;

    let now = Utc::now();
    let tag = Uuid::new_v4().simple().to_string().to_uppercase();
    let donation = Donation {
        id: Uuid::new_v4().to_string(),
        donor_name: req.donor_name,
        email: req.email,
        phone: req.phone,
        message: req.message,
        amount: req.amount,
        date: req.date.unwrap_or_else(|| now.date_naive()),
        payment_method,
        // Every donation starts unverified; only an admin command resolves it.
        verification_status: VerificationStatus::Pending,
        status: DonationStatus::Pending,
        receipt_code: format!("RC-{}", &tag[..8]),
        transaction_id: format!("TXN-{}", &tag[8..20]),
        admin_verified_by: None,
        admin_verified_at: None,
        created_at: now,
    };
    db::add_donation(&state.db, &donation)
        .await
        .map_err(ApiError::from_db)?;

    let receipt_code = donation.receipt_code.clone();
    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "donation": donation,
            "receipt_code": receipt_code,
            "message": "Donation submitted successfully. Please complete payment verification.",
        })),
    ))
}

pub async fn list_donations(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut filter = DonationFilter::default();
    if let Some(raw) = params.verification_status.as_deref() {
        filter.verification_status = Some(VerificationStatus::parse(raw).ok_or_else(|| {
            ApiError::validation(format!("Unknown verification status '{raw}'"))
        })?);
    }
    if params.filter.as_deref() == Some("pending") {
        filter.verification_status = Some(VerificationStatus::Pending);
    }
    if let Some(raw) = params.payment_method.as_deref() {
        filter.payment_method = Some(parse_method(raw)?);
    }

    let donations = db::list_donations(&state.db, filter)
        .await
        .map_err(ApiError::from_db)?;
    let summary = stats::donation_summary(&donations);
    Ok(AxumJson(json!({
        "success": true,
        "donations": donations,
        "summary": summary,
    })))
}

pub async fn update_donation(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    Json(req): Json<UpdateDonationRequest>,
) -> Result<Response, ApiError> {
    let wants_verification = req.verification_status.is_some() || req.status.is_some();
    if wants_verification {
        let has_field_edits = req.donor_name.is_some()
            || req.email.is_some()
            || req.phone.is_some()
            || req.message.is_some()
            || req.amount.is_some()
            || req.date.is_some()
            || req.payment_method.is_some();
        if has_field_edits {
            return Err(ApiError::validation(
                "Verification changes cannot be combined with field edits; send them separately",
            ));
        }
        let raw = req.verification_status.as_deref().ok_or_else(|| {
            ApiError::validation(
                "Status is derived from verification; send verification_status instead",
            )
        })?;
        let requested = VerificationStatus::parse(raw)
            .ok_or_else(|| ApiError::validation(format!("Unknown verification status '{raw}'")))?;
        if let Some(status_raw) = req.status.as_deref() {
            let expected = requested.mirrored_status();
            if DonationStatus::parse(status_raw) != Some(expected) {
                return Err(ApiError::validation(format!(
                    "Status '{status_raw}' does not match verification status '{raw}'"
                )));
            }
        }
        let resolved = resolve_verification(&state, &id, requested, &admin.username).await?;
        return Ok(resolved.into_response());
    }

    if let Some(amount) = req.amount {
        check_amount(amount)?;
    }
    let payment_method = match req.payment_method.as_deref() {
        Some(raw) => Some(parse_method(raw)?),
        None => None,
    };
    let patch = DonationPatch {
        donor_name: req.donor_name,
        email: req.email,
        phone: req.phone,
        message: req.message,
        amount: req.amount,
        date: req.date,
        payment_method,
    };
    let donation = db::update_donation(&state.db, &id, &patch)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Donation"))?;
    Ok(AxumJson(json!({
        "success": true,
        "donation": donation,
        "message": "Donation updated successfully",
    }))
    .into_response())
}

async fn resolve_verification(
    state: &AppState,
    id: &str,
    requested: VerificationStatus,
    admin: &str,
) -> Result<impl IntoResponse, ApiError> {
    if requested == VerificationStatus::Pending {
        return Err(ApiError::validation(
            "A donation cannot be returned to pending",
        ));
    }
    let outcome = db::apply_verification(&state.db, id, requested, admin, Utc::now())
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Donation"))?;

    match outcome {
        VerificationOutcome::Applied(donation) | VerificationOutcome::Unchanged(donation) => {
            let message = match requested {
                VerificationStatus::Verified => "Donation verified successfully",
                VerificationStatus::Rejected => "Donation rejected",
                VerificationStatus::Pending => unreachable!(),
            };
            Ok(AxumJson(json!({
                "success": true,
                "donation": donation,
                "message": message,
            })))
        }
        VerificationOutcome::Conflict { current, requested } => Err(ApiError::validation(format!(
            "Cannot move a {current} donation to {requested}"
        ))),
    }
}

pub async fn verify_donation(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    resolve_verification(&state, &id, VerificationStatus::Verified, &admin.username).await
}

pub async fn reject_donation(
    Path(id): Path<String>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    resolve_verification(&state, &id, VerificationStatus::Rejected, &admin.username).await
}

pub async fn delete_donation(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let found = db::delete_donation(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Donation"));
    }
    Ok(AxumJson(json!({
        "success": true,
        "message": "Donation deleted successfully",
    })))
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        let escaped = s.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        s.to_string()
    }
}

pub async fn export_csv(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let donations = db::list_donations(&state.db, DonationFilter::default())
        .await
        .map_err(ApiError::from_db)?;

    let mut w = String::new();
    w.push_str(
        "id,date,donor_name,amount,payment_method,verification_status,status,receipt_code,transaction_id\n",
    );
    for d in donations {
        let date = d.date.format("%Y-%m-%d").to_string();
        let amount = format!("{:.2}", d.amount);
        w.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            csv_escape(&d.id),
            csv_escape(&date),
            csv_escape(&d.donor_name),
            csv_escape(&amount),
            d.payment_method.as_str(),
            d.verification_status.as_str(),
            d.status.as_str(),
            csv_escape(&d.receipt_code),
            csv_escape(&d.transaction_id),
        ));
    }

    let mut resp: Response = Response::new(w.into());
    let headers = resp.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=donations.csv"),
    );
    Ok(resp)
}
