use chrono::{NaiveDate, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use ypg_backend::db::{self, models, DbPool, EventPatch};
use ypg_backend::lifecycle::{EntityKind, ListScope, Visibility};

fn test_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = db::init_pool_at(&dir.path().join("test.db")).expect("init pool");
    (dir, pool)
}

fn sample_event(title: &str) -> models::Event {
    let date = NaiveDate::from_ymd_opt(2026, 9, 12).expect("valid date");
    models::Event {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: "Annual youth conference".to_string(),
        date,
        time: "09:00".to_string(),
        location: "Main Church Hall".to_string(),
        image: None,
        attendees: 0,
        status: "active".to_string(),
        event_type: "upcoming".to_string(),
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    }
}

fn sample_testimonial() -> models::Testimonial {
    models::Testimonial {
        id: Uuid::new_v4().to_string(),
        name: "Ama".to_string(),
        position: "Member".to_string(),
        content: "The ministry changed my life".to_string(),
        rating: 5,
        is_featured: false,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    }
}

fn sample_registration() -> models::MinistryRegistration {
    models::MinistryRegistration {
        id: Uuid::new_v4().to_string(),
        name: "Kwame".to_string(),
        email: "kwame@example.com".to_string(),
        phone: "+233200000001".to_string(),
        ministry: "Choir".to_string(),
        congregation: "Adenta".to_string(),
        is_approved: false,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn dashboard_delete_keeps_the_public_listing() {
    let (_dir, pool) = test_pool();
    let event = sample_event("Youth Conference");
    db::add_event(&pool, &event).await.expect("add_event");

    let hidden = db::hide_from_dashboard(&pool, EntityKind::Event, &event.id)
        .await
        .expect("hide");
    assert!(hidden);

    let dashboard = db::list_events(&pool, ListScope::Dashboard).await.expect("list");
    assert!(!dashboard.iter().any(|e| e.id == event.id));

    let public = db::list_events(&pool, ListScope::Public).await.expect("list");
    assert!(public.iter().any(|e| e.id == event.id));
}

#[tokio::test]
async fn restore_returns_the_event_to_both_listings() {
    let (_dir, pool) = test_pool();
    let event = sample_event("Bible Study Workshop");
    db::add_event(&pool, &event).await.expect("add_event");

    // Completed and hidden, then brought back.
    let patch = EventPatch {
        status: Some("completed".to_string()),
        ..Default::default()
    };
    db::update_event(&pool, &event.id, &patch).await.expect("update");
    db::hide_from_dashboard(&pool, EntityKind::Event, &event.id)
        .await
        .expect("hide");

    let restored = db::restore_entity(&pool, EntityKind::Event, &event.id)
        .await
        .expect("restore");
    assert!(restored);

    let dashboard = db::list_events(&pool, ListScope::Dashboard).await.expect("list");
    assert!(dashboard.iter().any(|e| e.id == event.id));
    let public = db::list_events(&pool, ListScope::Public).await.expect("list");
    assert!(public.iter().any(|e| e.id == event.id));

    let fetched = db::get_event(&pool, &event.id).await.expect("get").expect("event");
    assert_eq!(fetched.status, "active");
    assert_eq!(fetched.visibility, Visibility::Visible);
}

#[tokio::test]
async fn permanent_delete_removes_the_event_everywhere() {
    let (_dir, pool) = test_pool();
    let event = sample_event("Outdooring");
    db::add_event(&pool, &event).await.expect("add_event");

    let removed = db::remove_entity(&pool, EntityKind::Event, &event.id)
        .await
        .expect("remove");
    assert!(removed);

    for scope in [ListScope::Public, ListScope::Dashboard] {
        let list = db::list_events(&pool, scope).await.expect("list");
        assert!(!list.iter().any(|e| e.id == event.id));
    }
    assert!(db::get_event(&pool, &event.id).await.expect("get").is_none());
}

#[tokio::test]
async fn lifecycle_commands_on_missing_ids_report_not_found() {
    let (_dir, pool) = test_pool();
    let missing = Uuid::new_v4().to_string();
    for kind in [
        EntityKind::Event,
        EntityKind::TeamMember,
        EntityKind::Testimonial,
        EntityKind::MinistryRegistration,
    ] {
        assert!(!db::hide_from_dashboard(&pool, kind, &missing).await.expect("hide"));
        assert!(!db::restore_entity(&pool, kind, &missing).await.expect("restore"));
        assert!(!db::remove_entity(&pool, kind, &missing).await.expect("remove"));
    }
}

#[tokio::test]
async fn hiding_twice_is_a_no_op() {
    let (_dir, pool) = test_pool();
    let event = sample_event("Retreat");
    db::add_event(&pool, &event).await.expect("add_event");

    assert!(db::hide_from_dashboard(&pool, EntityKind::Event, &event.id).await.expect("hide"));
    assert!(db::hide_from_dashboard(&pool, EntityKind::Event, &event.id).await.expect("hide"));

    let fetched = db::get_event(&pool, &event.id).await.expect("get").expect("event");
    assert_eq!(fetched.visibility, Visibility::DashboardHidden);

    // Restoring an already-visible entity succeeds the same way.
    assert!(db::restore_entity(&pool, EntityKind::Event, &event.id).await.expect("restore"));
    assert!(db::restore_entity(&pool, EntityKind::Event, &event.id).await.expect("restore"));
}

#[tokio::test]
async fn the_other_kinds_share_the_same_lifecycle() {
    let (_dir, pool) = test_pool();

    let member = models::TeamMember {
        id: Uuid::new_v4().to_string(),
        name: "Esi".to_string(),
        position: "Secretary".to_string(),
        congregation: "Bethel".to_string(),
        quote: String::new(),
        image: None,
        is_council: false,
        position_order: 3,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    };
    db::add_team_member(&pool, &member).await.expect("add member");
    db::hide_from_dashboard(&pool, EntityKind::TeamMember, &member.id)
        .await
        .expect("hide");
    let dashboard = db::list_team_members(&pool, ListScope::Dashboard).await.expect("list");
    assert!(!dashboard.iter().any(|m| m.id == member.id));
    let public = db::list_team_members(&pool, ListScope::Public).await.expect("list");
    assert!(public.iter().any(|m| m.id == member.id));

    let testimonial = sample_testimonial();
    db::add_testimonial(&pool, &testimonial).await.expect("add testimonial");
    db::hide_from_dashboard(&pool, EntityKind::Testimonial, &testimonial.id)
        .await
        .expect("hide");
    let dashboard = db::list_testimonials(&pool, ListScope::Dashboard).await.expect("list");
    assert!(!dashboard.iter().any(|t| t.id == testimonial.id));

    let registration = sample_registration();
    db::add_registration(&pool, &registration).await.expect("add registration");
    db::hide_from_dashboard(&pool, EntityKind::MinistryRegistration, &registration.id)
        .await
        .expect("hide");
    let dashboard = db::list_registrations(&pool, ListScope::Dashboard).await.expect("list");
    assert!(!dashboard.iter().any(|r| r.id == registration.id));
    let public = db::list_registrations(&pool, ListScope::Public).await.expect("list");
    assert!(public.iter().any(|r| r.id == registration.id));
}

#[tokio::test]
async fn ministry_registrations_can_be_approved() {
    let (_dir, pool) = test_pool();
    let registration = sample_registration();
    db::add_registration(&pool, &registration).await.expect("add registration");

    assert!(db::approve_registration(&pool, &registration.id).await.expect("approve"));
    let fetched = db::get_registration(&pool, &registration.id)
        .await
        .expect("get")
        .expect("registration");
    assert!(fetched.is_approved);

    let missing = Uuid::new_v4().to_string();
    assert!(!db::approve_registration(&pool, &missing).await.expect("approve"));
}
