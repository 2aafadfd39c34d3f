use chrono::Utc;
use tempfile::TempDir;
use uuid::Uuid;

use ypg_backend::db::{self, models, DbPool, SubmissionInsert};
use ypg_backend::stats;

fn test_pool() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = db::init_pool_at(&dir.path().join("test.db")).expect("init pool");
    (dir, pool)
}

fn sample_quiz(title: &str, is_active: bool) -> models::Quiz {
    models::Quiz {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        question: "Who led the Israelites out of Egypt?".to_string(),
        option_a: "Moses".to_string(),
        option_b: "Aaron".to_string(),
        option_c: "Joshua".to_string(),
        option_d: "David".to_string(),
        correct_answer: "A".to_string(),
        password: "exodus".to_string(),
        is_active,
        created_at: Utc::now(),
    }
}

fn submission(quiz_id: &str, name: &str, phone: &str, congregation: &str, answer: &str) -> models::QuizSubmission {
    models::QuizSubmission {
        id: Uuid::new_v4().to_string(),
        quiz_id: quiz_id.to_string(),
        name: name.to_string(),
        phone_number: phone.to_string(),
        congregation: congregation.to_string(),
        selected_answer: answer.to_string(),
        submitted_at: Utc::now(),
    }
}

#[tokio::test]
async fn activating_a_quiz_deactivates_the_previous_one() {
    let (_dir, pool) = test_pool();
    let first = sample_quiz("Week 1", true);
    let second = sample_quiz("Week 2", true);
    db::add_quiz(&pool, &first).await.expect("add first");
    db::add_quiz(&pool, &second).await.expect("add second");

    let active = db::active_quiz(&pool).await.expect("active").expect("some quiz");
    assert_eq!(active.id, second.id);

    let first_again = db::get_quiz(&pool, &first.id).await.expect("get").expect("quiz");
    assert!(!first_again.is_active);
}

#[tokio::test]
async fn no_active_quiz_when_all_have_ended() {
    let (_dir, pool) = test_pool();
    let quiz = sample_quiz("Week 1", true);
    db::add_quiz(&pool, &quiz).await.expect("add");

    assert!(db::end_quiz(&pool, &quiz.id).await.expect("end"));
    assert!(db::active_quiz(&pool).await.expect("active").is_none());

    let missing = Uuid::new_v4().to_string();
    assert!(!db::end_quiz(&pool, &missing).await.expect("end"));
}

#[tokio::test]
async fn the_store_refuses_duplicate_submissions() {
    let (_dir, pool) = test_pool();
    let quiz = sample_quiz("Week 1", true);
    db::add_quiz(&pool, &quiz).await.expect("add quiz");

    let first = submission(&quiz.id, "Kofi Mensah", "+233201112222", "Adenta", "A");
    let outcome = db::add_quiz_submission(&pool, &first).await.expect("insert");
    assert_eq!(outcome, SubmissionInsert::Inserted);

    // Same participant key, different row id and answer: still refused.
    let duplicate = submission(&quiz.id, "Kofi Mensah", "+233201112222", "Adenta", "B");
    let outcome = db::add_quiz_submission(&pool, &duplicate).await.expect("insert");
    assert_eq!(outcome, SubmissionInsert::Duplicate);

    // Same name and phone under another congregation is a different key.
    let third = submission(&quiz.id, "Kofi Mensah", "+233201112222", "Bethel", "C");
    let outcome = db::add_quiz_submission(&pool, &third).await.expect("insert");
    assert_eq!(outcome, SubmissionInsert::Inserted);

    let stored = db::list_submissions(&pool, Some(&quiz.id)).await.expect("list");
    assert_eq!(stored.len(), 2);
    // The refused write left the original answer in place.
    assert!(stored
        .iter()
        .any(|s| s.congregation == "Adenta" && s.selected_answer == "A"));
}

#[tokio::test]
async fn a_new_quiz_accepts_the_same_participant_again() {
    let (_dir, pool) = test_pool();
    let week1 = sample_quiz("Week 1", true);
    db::add_quiz(&pool, &week1).await.expect("add");
    let week2 = sample_quiz("Week 2", true);
    db::add_quiz(&pool, &week2).await.expect("add");

    let outcome = db::add_quiz_submission(
        &pool,
        &submission(&week1.id, "Abena", "+233200003333", "Adenta", "A"),
    )
    .await
    .expect("insert");
    assert_eq!(outcome, SubmissionInsert::Inserted);

    let outcome = db::add_quiz_submission(
        &pool,
        &submission(&week2.id, "Abena", "+233200003333", "Adenta", "B"),
    )
    .await
    .expect("insert");
    assert_eq!(outcome, SubmissionInsert::Inserted);
}

#[tokio::test]
async fn leaderboard_reflects_stored_submissions() {
    let (_dir, pool) = test_pool();
    let quiz = sample_quiz("Week 1", true);
    db::add_quiz(&pool, &quiz).await.expect("add quiz");

    for (name, phone, congregation, answer) in [
        ("P1", "+233200000010", "Adenta", "A"),
        ("P2", "+233200000011", "Adenta", "B"),
        ("P3", "+233200000012", "Bethel", "A"),
    ] {
        let outcome =
            db::add_quiz_submission(&pool, &submission(&quiz.id, name, phone, congregation, answer))
                .await
                .expect("insert");
        assert_eq!(outcome, SubmissionInsert::Inserted);
    }

    let quizzes = db::list_quizzes(&pool).await.expect("quizzes");
    let submissions = db::list_submissions(&pool, None).await.expect("submissions");
    let board = stats::congregation_leaderboard(&quizzes, &submissions);

    assert_eq!(board.len(), 2);
    assert_eq!(board[0].name, "Adenta");
    assert_eq!(board[0].total_participants, 2);
    assert_eq!(board[0].total_correct_answers, 1);
    assert_eq!(board[0].success_rate, 50.0);
    assert_eq!(board[1].name, "Bethel");
    assert_eq!(board[1].success_rate, 100.0);
}

#[tokio::test]
async fn deleting_a_quiz_takes_its_submissions_along() {
    let (_dir, pool) = test_pool();
    let quiz = sample_quiz("Week 1", true);
    db::add_quiz(&pool, &quiz).await.expect("add quiz");
    db::add_quiz_submission(
        &pool,
        &submission(&quiz.id, "Yaw", "+233200004444", "Adenta", "D"),
    )
    .await
    .expect("insert");

    assert!(db::delete_quiz(&pool, &quiz.id).await.expect("delete"));
    let leftover = db::list_submissions(&pool, None).await.expect("list");
    assert!(leftover.is_empty());
}
