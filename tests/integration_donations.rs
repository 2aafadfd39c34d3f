use chrono::{NaiveDate, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use ypg_backend::db::{self, models, DbPool, DonationFilter, DonationPatch, VerificationOutcome};
use ypg_backend::stats;
use ypg_backend::verification::{DonationStatus, VerificationStatus};

fn test_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = db::init_pool_at(&dir.path().join("test.db")).expect("init pool");
    (dir, pool)
}

fn pending_donation(amount: f64, method: models::PaymentMethod) -> models::Donation {
    let tag = Uuid::new_v4().simple().to_string().to_uppercase();
    models::Donation {
        id: Uuid::new_v4().to_string(),
        donor_name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: "+233200000002".to_string(),
        message: "For the building fund".to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date"),
        payment_method: method,
        verification_status: VerificationStatus::Pending,
        status: DonationStatus::Pending,
        receipt_code: format!("RC-{}", &tag[..8]),
        transaction_id: format!("TXN-{}", &tag[8..20]),
        admin_verified_by: None,
        admin_verified_at: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn verifying_moves_money_into_the_totals() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(100.0, models::PaymentMethod::Momo);
    db::add_donation(&pool, &donation).await.expect("add");

    let before = db::list_donations(&pool, DonationFilter::default()).await.expect("list");
    assert_eq!(stats::total_by_method(&before, models::PaymentMethod::Momo), 0.0);
    assert_eq!(stats::donation_summary(&before).pending_count, 1);

    let outcome = db::apply_verification(
        &pool,
        &donation.id,
        VerificationStatus::Verified,
        "admin",
        Utc::now(),
    )
    .await
    .expect("verify")
    .expect("donation exists");

    let verified = match outcome {
        VerificationOutcome::Applied(d) => d,
        other => panic!("expected Applied, got {other:?}"),
    };
    assert_eq!(verified.verification_status, VerificationStatus::Verified);
    assert_eq!(verified.status, DonationStatus::Confirmed);
    assert_eq!(verified.admin_verified_by.as_deref(), Some("admin"));
    assert!(verified.admin_verified_at.is_some());

    let after = db::list_donations(&pool, DonationFilter::default()).await.expect("list");
    assert_eq!(stats::total_by_method(&after, models::PaymentMethod::Momo), 100.0);
    assert_eq!(stats::total_verified(&after), 100.0);
}

#[tokio::test]
async fn verifying_twice_changes_nothing() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(55.0, models::PaymentMethod::Cash);
    db::add_donation(&pool, &donation).await.expect("add");

    let first = db::apply_verification(&pool, &donation.id, VerificationStatus::Verified, "admin", Utc::now())
        .await
        .expect("verify")
        .expect("exists");
    assert!(matches!(first, VerificationOutcome::Applied(_)));

    let second = db::apply_verification(&pool, &donation.id, VerificationStatus::Verified, "admin", Utc::now())
        .await
        .expect("verify")
        .expect("exists");
    let unchanged = match second {
        VerificationOutcome::Unchanged(d) => d,
        other => panic!("expected Unchanged, got {other:?}"),
    };
    assert_eq!(unchanged.verification_status, VerificationStatus::Verified);
    assert_eq!(unchanged.status, DonationStatus::Confirmed);

    let all = db::list_donations(&pool, DonationFilter::default()).await.expect("list");
    assert_eq!(stats::total_verified(&all), 55.0);
}

#[tokio::test]
async fn resolved_donations_refuse_to_flip() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(80.0, models::PaymentMethod::Bank);
    db::add_donation(&pool, &donation).await.expect("add");

    db::apply_verification(&pool, &donation.id, VerificationStatus::Verified, "admin", Utc::now())
        .await
        .expect("verify")
        .expect("exists");

    let outcome = db::apply_verification(&pool, &donation.id, VerificationStatus::Rejected, "admin", Utc::now())
        .await
        .expect("reject")
        .expect("exists");
    assert!(matches!(outcome, VerificationOutcome::Conflict { .. }));

    // The record is untouched by the refused command.
    let fetched = db::get_donation(&pool, &donation.id).await.expect("get").expect("donation");
    assert_eq!(fetched.verification_status, VerificationStatus::Verified);
    assert_eq!(fetched.status, DonationStatus::Confirmed);
}

#[tokio::test]
async fn rejected_donations_never_count_financially() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(100.0, models::PaymentMethod::Momo);
    db::add_donation(&pool, &donation).await.expect("add");

    let outcome = db::apply_verification(&pool, &donation.id, VerificationStatus::Rejected, "admin", Utc::now())
        .await
        .expect("reject")
        .expect("exists");
    let rejected = match outcome {
        VerificationOutcome::Applied(d) => d,
        other => panic!("expected Applied, got {other:?}"),
    };
    assert_eq!(rejected.status, DonationStatus::Failed);

    let all = db::list_donations(&pool, DonationFilter::default()).await.expect("list");
    assert_eq!(stats::total_by_method(&all, models::PaymentMethod::Momo), 0.0);
    let summary = stats::donation_summary(&all);
    assert_eq!(summary.rejected_count, 1);
    assert_eq!(summary.verified_amount, 0.0);
    assert_eq!(summary.total_amount, 100.0);
}

#[tokio::test]
async fn edits_never_touch_verification_state() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(40.0, models::PaymentMethod::Cash);
    db::add_donation(&pool, &donation).await.expect("add");

    let patch = DonationPatch {
        amount: Some(45.0),
        donor_name: Some("Jane Doe".to_string()),
        ..Default::default()
    };
    let updated = db::update_donation(&pool, &donation.id, &patch)
        .await
        .expect("update")
        .expect("donation");
    assert_eq!(updated.amount, 45.0);
    assert_eq!(updated.donor_name, "Jane Doe");
    assert_eq!(updated.verification_status, VerificationStatus::Pending);
    assert_eq!(updated.status, DonationStatus::Pending);
}

#[tokio::test]
async fn deletion_is_independent_of_verification_state() {
    let (_dir, pool) = test_pool();
    let donation = pending_donation(75.0, models::PaymentMethod::Bank);
    db::add_donation(&pool, &donation).await.expect("add");
    db::apply_verification(&pool, &donation.id, VerificationStatus::Verified, "admin", Utc::now())
        .await
        .expect("verify")
        .expect("exists");

    assert!(db::delete_donation(&pool, &donation.id).await.expect("delete"));
    assert!(db::get_donation(&pool, &donation.id).await.expect("get").is_none());

    let missing = Uuid::new_v4().to_string();
    assert!(!db::delete_donation(&pool, &missing).await.expect("delete"));
}

#[tokio::test]
async fn pending_filter_is_a_pure_projection() {
    let (_dir, pool) = test_pool();
    let pending = pending_donation(10.0, models::PaymentMethod::Momo);
    let resolved = pending_donation(20.0, models::PaymentMethod::Cash);
    db::add_donation(&pool, &pending).await.expect("add");
    db::add_donation(&pool, &resolved).await.expect("add");
    db::apply_verification(&pool, &resolved.id, VerificationStatus::Verified, "admin", Utc::now())
        .await
        .expect("verify")
        .expect("exists");

    let filter = DonationFilter {
        verification_status: Some(VerificationStatus::Pending),
        ..Default::default()
    };
    let only_pending = db::list_donations(&pool, filter).await.expect("list");
    assert_eq!(only_pending.len(), 1);
    assert_eq!(only_pending[0].id, pending.id);

    // Filtering changed nothing underneath.
    let all = db::list_donations(&pool, DonationFilter::default()).await.expect("list");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn verification_on_a_missing_donation_is_not_found() {
    let (_dir, pool) = test_pool();
    let missing = Uuid::new_v4().to_string();
    let outcome =
        db::apply_verification(&pool, &missing, VerificationStatus::Verified, "admin", Utc::now())
            .await
            .expect("verify");
    assert!(outcome.is_none());
}
