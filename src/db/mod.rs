use std::env;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

pub mod models;

use crate::lifecycle::{EntityKind, ListScope, Visibility};
use crate::verification::{self, Transition, VerificationStatus};
use models::{
    Donation, Event, MinistryRegistration, PaymentMethod, Quiz, QuizSubmission, TeamMember,
    Testimonial,
};

pub type DbPool = Pool<SqliteConnectionManager>;

const INIT_SQL: &str = include_str!("../../migrations/init.sql");

pub async fn init_pool() -> anyhow::Result<DbPool> {
    let path = env::var("DATABASE_PATH").unwrap_or_else(|_| "data/ypg.db".to_string());
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    init_pool_at(Path::new(&path))
}

/// Build a pool against a concrete database file and apply the schema. The
/// schema script is idempotent, so opening an existing database is safe.
pub fn init_pool_at(path: &Path) -> anyhow::Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;",
        )
    });
    let pool = Pool::builder()
        .max_size(10)
        .connection_timeout(std::time::Duration::from_secs(30))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to create DB pool: {}", e))?;

    pool.get()?.execute_batch(INIT_SQL)?;
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Visibility lifecycle, shared by the four dual-deletable entity kinds.
// ---------------------------------------------------------------------------

/// Hide an entity from the admin dashboard. The public site keeps it. Returns
/// false when no such row exists. Hiding an already-hidden entity succeeds.
pub async fn hide_from_dashboard(
    pool: &DbPool,
    kind: EntityKind,
    id: &str,
) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let sql = format!("UPDATE {} SET visibility = ?1 WHERE id = ?2", kind.table());
    let changed = conn.execute(&sql, params![Visibility::DashboardHidden, id])?;
    Ok(changed > 0)
}

/// Bring an entity back onto the dashboard. Events also get their status reset
/// to `active` so they rejoin the public rotation.
pub async fn restore_entity(pool: &DbPool, kind: EntityKind, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = match kind {
        EntityKind::Event => conn.execute(
            "UPDATE events SET visibility = ?1, status = 'active' WHERE id = ?2",
            params![Visibility::Visible, id],
        )?,
        _ => conn.execute(
            &format!("UPDATE {} SET visibility = ?1 WHERE id = ?2", kind.table()),
            params![Visibility::Visible, id],
        )?,
    };
    Ok(changed > 0)
}

/// Remove the record outright; it disappears from both surfaces.
pub async fn remove_entity(pool: &DbPool, kind: EntityKind, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
    let changed = conn.execute(&sql, params![id])?;
    Ok(changed > 0)
}

fn scope_clause(scope: ListScope) -> &'static str {
    match scope {
        ListScope::Public => "",
        ListScope::Dashboard => " WHERE visibility = 'visible'",
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

const EVENT_COLUMNS: &str =
    "id, title, description, date, time, location, image, attendees, status, visibility, created_at";

fn row_to_event(row: &Row<'_>, today: NaiveDate) -> rusqlite::Result<Event> {
    let date: NaiveDate = row.get(3)?;
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date,
        time: row.get(4)?,
        location: row.get(5)?,
        image: row.get(6)?,
        attendees: row.get(7)?,
        status: row.get(8)?,
        event_type: Event::event_type_on(date, today).to_string(),
        visibility: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub async fn list_events(pool: &DbPool, scope: ListScope) -> anyhow::Result<Vec<Event>> {
    let conn = pool.get()?;
    let today = Utc::now().date_naive();
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events{} ORDER BY date DESC, created_at DESC",
        scope_clause(scope)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| row_to_event(row, today))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_event(pool: &DbPool, id: &str) -> anyhow::Result<Option<Event>> {
    let conn = pool.get()?;
    let today = Utc::now().date_naive();
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], |row| row_to_event(row, today))
        .optional()?)
}

pub async fn add_event(pool: &DbPool, event: &Event) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO events (id, title, description, date, time, location, image, attendees, status, visibility, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            event.id,
            event.title,
            event.description,
            event.date,
            event.time,
            event.location,
            event.image,
            event.attendees,
            event.status,
            event.visibility,
            event.created_at,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub attendees: Option<i64>,
    pub status: Option<String>,
}

pub async fn update_event(pool: &DbPool, id: &str, patch: &EventPatch) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE events SET
            title = COALESCE(?1, title),
            description = COALESCE(?2, description),
            date = COALESCE(?3, date),
            time = COALESCE(?4, time),
            location = COALESCE(?5, location),
            image = COALESCE(?6, image),
            attendees = COALESCE(?7, attendees),
            status = COALESCE(?8, status)
         WHERE id = ?9",
        params![
            patch.title,
            patch.description,
            patch.date,
            patch.time,
            patch.location,
            patch.image,
            patch.attendees,
            patch.status,
            id,
        ],
    )?;
    Ok(changed > 0)
}

// ---------------------------------------------------------------------------
// Team members
// ---------------------------------------------------------------------------

const TEAM_COLUMNS: &str =
    "id, name, position, congregation, quote, image, is_council, position_order, visibility, created_at";

fn row_to_team_member(row: &Row<'_>) -> rusqlite::Result<TeamMember> {
    Ok(TeamMember {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        congregation: row.get(3)?,
        quote: row.get(4)?,
        image: row.get(5)?,
        is_council: row.get(6)?,
        position_order: row.get(7)?,
        visibility: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub async fn list_team_members(pool: &DbPool, scope: ListScope) -> anyhow::Result<Vec<TeamMember>> {
    let conn = pool.get()?;
    let sql = format!(
        "SELECT {TEAM_COLUMNS} FROM team_members{} ORDER BY position_order ASC, name ASC",
        scope_clause(scope)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_team_member)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_team_member(pool: &DbPool, id: &str) -> anyhow::Result<Option<TeamMember>> {
    let conn = pool.get()?;
    let sql = format!("SELECT {TEAM_COLUMNS} FROM team_members WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], row_to_team_member)
        .optional()?)
}

pub async fn add_team_member(pool: &DbPool, member: &TeamMember) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO team_members (id, name, position, congregation, quote, image, is_council, position_order, visibility, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            member.id,
            member.name,
            member.position,
            member.congregation,
            member.quote,
            member.image,
            member.is_council,
            member.position_order,
            member.visibility,
            member.created_at,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub congregation: Option<String>,
    pub quote: Option<String>,
    pub image: Option<String>,
    pub is_council: Option<bool>,
    pub position_order: Option<i64>,
}

pub async fn update_team_member(
    pool: &DbPool,
    id: &str,
    patch: &TeamMemberPatch,
) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE team_members SET
            name = COALESCE(?1, name),
            position = COALESCE(?2, position),
            congregation = COALESCE(?3, congregation),
            quote = COALESCE(?4, quote),
            image = COALESCE(?5, image),
            is_council = COALESCE(?6, is_council),
            position_order = COALESCE(?7, position_order)
         WHERE id = ?8",
        params![
            patch.name,
            patch.position,
            patch.congregation,
            patch.quote,
            patch.image,
            patch.is_council,
            patch.position_order,
            id,
        ],
    )?;
    Ok(changed > 0)
}

// ---------------------------------------------------------------------------
// Testimonials
// ---------------------------------------------------------------------------

const TESTIMONIAL_COLUMNS: &str =
    "id, name, position, content, rating, is_featured, visibility, created_at";

fn row_to_testimonial(row: &Row<'_>) -> rusqlite::Result<Testimonial> {
    Ok(Testimonial {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        content: row.get(3)?,
        rating: row.get(4)?,
        is_featured: row.get(5)?,
        visibility: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub async fn list_testimonials(
    pool: &DbPool,
    scope: ListScope,
) -> anyhow::Result<Vec<Testimonial>> {
    let conn = pool.get()?;
    let sql = format!(
        "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials{} ORDER BY created_at DESC",
        scope_clause(scope)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_testimonial)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_testimonial(pool: &DbPool, id: &str) -> anyhow::Result<Option<Testimonial>> {
    let conn = pool.get()?;
    let sql = format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], row_to_testimonial)
        .optional()?)
}

pub async fn add_testimonial(pool: &DbPool, testimonial: &Testimonial) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO testimonials (id, name, position, content, rating, is_featured, visibility, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            testimonial.id,
            testimonial.name,
            testimonial.position,
            testimonial.content,
            testimonial.rating,
            testimonial.is_featured,
            testimonial.visibility,
            testimonial.created_at,
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct TestimonialPatch {
    pub name: Option<String>,
    pub position: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i64>,
    pub is_featured: Option<bool>,
}

pub async fn update_testimonial(
    pool: &DbPool,
    id: &str,
    patch: &TestimonialPatch,
) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE testimonials SET
            name = COALESCE(?1, name),
            position = COALESCE(?2, position),
            content = COALESCE(?3, content),
            rating = COALESCE(?4, rating),
            is_featured = COALESCE(?5, is_featured)
         WHERE id = ?6",
        params![
            patch.name,
            patch.position,
            patch.content,
            patch.rating,
            patch.is_featured,
            id,
        ],
    )?;
    Ok(changed > 0)
}

// ---------------------------------------------------------------------------
// Ministry registrations
// ---------------------------------------------------------------------------

const MINISTRY_COLUMNS: &str =
    "id, name, email, phone, ministry, congregation, is_approved, visibility, created_at";

fn row_to_registration(row: &Row<'_>) -> rusqlite::Result<MinistryRegistration> {
    Ok(MinistryRegistration {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        ministry: row.get(4)?,
        congregation: row.get(5)?,
        is_approved: row.get(6)?,
        visibility: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub async fn list_registrations(
    pool: &DbPool,
    scope: ListScope,
) -> anyhow::Result<Vec<MinistryRegistration>> {
    let conn = pool.get()?;
    let sql = format!(
        "SELECT {MINISTRY_COLUMNS} FROM ministry_registrations{} ORDER BY created_at DESC",
        scope_clause(scope)
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_registration)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_registration(
    pool: &DbPool,
    id: &str,
) -> anyhow::Result<Option<MinistryRegistration>> {
    let conn = pool.get()?;
    let sql = format!("SELECT {MINISTRY_COLUMNS} FROM ministry_registrations WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], row_to_registration)
        .optional()?)
}

pub async fn add_registration(
    pool: &DbPool,
    registration: &MinistryRegistration,
) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO ministry_registrations (id, name, email, phone, ministry, congregation, is_approved, visibility, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            registration.id,
            registration.name,
            registration.email,
            registration.phone,
            registration.ministry,
            registration.congregation,
            registration.is_approved,
            registration.visibility,
            registration.created_at,
        ],
    )?;
    Ok(())
}

pub async fn approve_registration(pool: &DbPool, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE ministry_registrations SET is_approved = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(changed > 0)
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

const DONATION_COLUMNS: &str =
    "id, donor_name, email, phone, message, amount, date, payment_method, \
     verification_status, status, receipt_code, transaction_id, admin_verified_by, \
     admin_verified_at, created_at";

fn row_to_donation(row: &Row<'_>) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        amount: row.get(5)?,
        date: row.get(6)?,
        payment_method: row.get(7)?,
        verification_status: row.get(8)?,
        status: row.get(9)?,
        receipt_code: row.get(10)?,
        transaction_id: row.get(11)?,
        admin_verified_by: row.get(12)?,
        admin_verified_at: row.get(13)?,
        created_at: row.get(14)?,
    })
}

fn fetch_donation(conn: &Connection, id: &str) -> rusqlite::Result<Option<Donation>> {
    let sql = format!("SELECT {DONATION_COLUMNS} FROM donations WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_donation).optional()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DonationFilter {
    pub verification_status: Option<VerificationStatus>,
    pub payment_method: Option<PaymentMethod>,
}

pub async fn list_donations(
    pool: &DbPool,
    filter: DonationFilter,
) -> anyhow::Result<Vec<Donation>> {
    let conn = pool.get()?;
    let mut sql = format!("SELECT {DONATION_COLUMNS} FROM donations");
    let mut clauses: Vec<&str> = Vec::new();
    let mut bind: Vec<&str> = Vec::new();
    if let Some(vs) = filter.verification_status {
        clauses.push("verification_status = ?");
        bind.push(vs.as_str());
    }
    if let Some(pm) = filter.payment_method {
        clauses.push("payment_method = ?");
        bind.push(pm.as_str());
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(bind), row_to_donation)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_donation(pool: &DbPool, id: &str) -> anyhow::Result<Option<Donation>> {
    let conn = pool.get()?;
    Ok(fetch_donation(&conn, id)?)
}

pub async fn add_donation(pool: &DbPool, donation: &Donation) -> anyhow::Result<()> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO donations (id, donor_name, email, phone, message, amount, date, payment_method,
                                verification_status, status, receipt_code, transaction_id,
                                admin_verified_by, admin_verified_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            donation.id,
            donation.donor_name,
            donation.email,
            donation.phone,
            donation.message,
            donation.amount,
            donation.date,
            donation.payment_method,
            donation.verification_status,
            donation.status,
            donation.receipt_code,
            donation.transaction_id,
            donation.admin_verified_by,
            donation.admin_verified_at,
            donation.created_at,
        ],
    )?;
    Ok(())
}

/// Fields an admin may edit directly. Verification state is deliberately not
/// here; it only moves through [`apply_verification`].
#[derive(Debug, Default)]
pub struct DonationPatch {
    pub donor_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

pub async fn update_donation(
    pool: &DbPool,
    id: &str,
    patch: &DonationPatch,
) -> anyhow::Result<Option<Donation>> {
    let conn = pool.get()?;
    let changed = conn.execute(
        "UPDATE donations SET
            donor_name = COALESCE(?1, donor_name),
            email = COALESCE(?2, email),
            phone = COALESCE(?3, phone),
            message = COALESCE(?4, message),
            amount = COALESCE(?5, amount),
            date = COALESCE(?6, date),
            payment_method = COALESCE(?7, payment_method)
         WHERE id = ?8",
        params![
            patch.donor_name,
            patch.email,
            patch.phone,
            patch.message,
            patch.amount,
            patch.date,
            patch.payment_method,
            id,
        ],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    Ok(fetch_donation(&conn, id)?)
}

pub async fn delete_donation(pool: &DbPool, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute("DELETE FROM donations WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

#[derive(Debug)]
pub enum VerificationOutcome {
    /// The transition was written.
    Applied(Donation),
    /// The donation already carried the requested resolution.
    Unchanged(Donation),
    /// The request would move between resolved states (or back to pending).
    Conflict {
        current: VerificationStatus,
        requested: VerificationStatus,
    },
}

/// Run a verify/reject command against one donation, atomically. The read and
/// the conditional write share a transaction so two concurrent commands cannot
/// interleave.
pub async fn apply_verification(
    pool: &DbPool,
    id: &str,
    requested: VerificationStatus,
    admin: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<VerificationOutcome>> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let current: Option<VerificationStatus> = tx
        .query_row(
            "SELECT verification_status FROM donations WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(current) = current else {
        return Ok(None);
    };

    match verification::resolve(current, requested) {
        Ok(Transition::Applied(next)) => {
            tx.execute(
                "UPDATE donations SET verification_status = ?1, status = ?2,
                        admin_verified_by = ?3, admin_verified_at = ?4
                 WHERE id = ?5",
                params![next, next.mirrored_status(), admin, now, id],
            )?;
            tx.commit()?;
            let donation = fetch_donation(&conn, id)?
                .ok_or_else(|| anyhow::anyhow!("donation {id} vanished mid-update"))?;
            Ok(Some(VerificationOutcome::Applied(donation)))
        }
        Ok(Transition::Noop) => {
            drop(tx);
            let donation = fetch_donation(&conn, id)?
                .ok_or_else(|| anyhow::anyhow!("donation {id} vanished mid-update"))?;
            Ok(Some(VerificationOutcome::Unchanged(donation)))
        }
        Err(invalid) => Ok(Some(VerificationOutcome::Conflict {
            current: invalid.current,
            requested: invalid.requested,
        })),
    }
}

// ---------------------------------------------------------------------------
// Quizzes and submissions
// ---------------------------------------------------------------------------

const QUIZ_COLUMNS: &str = "id, title, question, option_a, option_b, option_c, option_d, \
     correct_answer, password, is_active, created_at";

fn row_to_quiz(row: &Row<'_>) -> rusqlite::Result<Quiz> {
    Ok(Quiz {
        id: row.get(0)?,
        title: row.get(1)?,
        question: row.get(2)?,
        option_a: row.get(3)?,
        option_b: row.get(4)?,
        option_c: row.get(5)?,
        option_d: row.get(6)?,
        correct_answer: row.get(7)?,
        password: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub async fn active_quiz(pool: &DbPool) -> anyhow::Result<Option<Quiz>> {
    let conn = pool.get()?;
    let sql = format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE is_active = 1 ORDER BY created_at DESC LIMIT 1"
    );
    Ok(conn.query_row(&sql, [], row_to_quiz).optional()?)
}

pub async fn list_quizzes(pool: &DbPool) -> anyhow::Result<Vec<Quiz>> {
    let conn = pool.get()?;
    let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY created_at DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_quiz)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_quiz(pool: &DbPool, id: &str) -> anyhow::Result<Option<Quiz>> {
    let conn = pool.get()?;
    let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], row_to_quiz).optional()?)
}

/// Insert a quiz. Activating it deactivates every other quiz in the same
/// transaction, so at most one quiz is ever active.
pub async fn add_quiz(pool: &DbPool, quiz: &Quiz) -> anyhow::Result<()> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    if quiz.is_active {
        tx.execute("UPDATE quizzes SET is_active = 0", [])?;
    }
    tx.execute(
        "INSERT INTO quizzes (id, title, question, option_a, option_b, option_c, option_d,
                              correct_answer, password, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            quiz.id,
            quiz.title,
            quiz.question,
            quiz.option_a,
            quiz.option_b,
            quiz.option_c,
            quiz.option_d,
            quiz.correct_answer,
            quiz.password,
            quiz.is_active,
            quiz.created_at,
        ],
    )?;
    tx.commit()?;
    Ok(())
}

pub async fn end_quiz(pool: &DbPool, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute("UPDATE quizzes SET is_active = 0 WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Delete a quiz; its submissions go with it via the foreign key cascade.
pub async fn delete_quiz(pool: &DbPool, id: &str) -> anyhow::Result<bool> {
    let conn = pool.get()?;
    let changed = conn.execute("DELETE FROM quizzes WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmissionInsert {
    Inserted,
    /// The store's unique index already holds a row for this participant and
    /// quiz; nothing was written.
    Duplicate,
}

pub async fn add_quiz_submission(
    pool: &DbPool,
    submission: &QuizSubmission,
) -> anyhow::Result<SubmissionInsert> {
    let conn = pool.get()?;
    let result = conn.execute(
        "INSERT INTO quiz_submissions (id, quiz_id, name, phone_number, congregation, selected_answer, submitted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            submission.id,
            submission.quiz_id,
            submission.name,
            submission.phone_number,
            submission.congregation,
            submission.selected_answer,
            submission.submitted_at,
        ],
    );
    match result {
        Ok(_) => Ok(SubmissionInsert::Inserted),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(SubmissionInsert::Duplicate)
        }
        Err(e) => Err(e.into()),
    }
}

const SUBMISSION_COLUMNS: &str =
    "id, quiz_id, name, phone_number, congregation, selected_answer, submitted_at";

fn row_to_submission(row: &Row<'_>) -> rusqlite::Result<QuizSubmission> {
    Ok(QuizSubmission {
        id: row.get(0)?,
        quiz_id: row.get(1)?,
        name: row.get(2)?,
        phone_number: row.get(3)?,
        congregation: row.get(4)?,
        selected_answer: row.get(5)?,
        submitted_at: row.get(6)?,
    })
}

pub async fn list_submissions(
    pool: &DbPool,
    quiz_id: Option<&str>,
) -> anyhow::Result<Vec<QuizSubmission>> {
    let conn = pool.get()?;
    match quiz_id {
        Some(quiz_id) => {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions WHERE quiz_id = ?1 ORDER BY submitted_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![quiz_id], row_to_submission)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
        None => {
            let sql = format!(
                "SELECT {SUBMISSION_COLUMNS} FROM quiz_submissions ORDER BY submitted_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_submission)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
    }
}
