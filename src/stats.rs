//! Read-side projections over donations and quiz submissions. Everything here
//! is a pure function of the rows handed in: recomputed fresh on every call,
//! never cached, never writing anything back.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::db::models::{Donation, PaymentMethod, Quiz, QuizSubmission};
use crate::verification::VerificationStatus;

/// Sum of verified donation amounts for one payment method. Pending and
/// rejected donations never contribute money, whatever their amount.
pub fn total_by_method(donations: &[Donation], method: PaymentMethod) -> f64 {
    donations
        .iter()
        .filter(|d| {
            d.payment_method == method && d.verification_status == VerificationStatus::Verified
        })
        .map(|d| d.amount)
        .sum()
}

/// Sum of verified donation amounts across all payment methods.
pub fn total_verified(donations: &[Donation]) -> f64 {
    donations
        .iter()
        .filter(|d| d.verification_status == VerificationStatus::Verified)
        .map(|d| d.amount)
        .sum()
}

pub fn count_by_status(donations: &[Donation], status: VerificationStatus) -> usize {
    donations
        .iter()
        .filter(|d| d.verification_status == status)
        .count()
}

/// The summary block shown alongside the admin donations listing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DonationSummary {
    pub total_amount: f64,
    pub total_count: usize,
    pub verified_amount: f64,
    pub verified_count: usize,
    pub pending_count: usize,
    pub rejected_count: usize,
    pub average_amount: f64,
    /// Verified totals keyed by payment method.
    pub by_method: BTreeMap<&'static str, f64>,
}

pub fn donation_summary(donations: &[Donation]) -> DonationSummary {
    let total_amount: f64 = donations.iter().map(|d| d.amount).sum();
    let total_count = donations.len();
    let average_amount = if total_count > 0 {
        (total_amount / total_count as f64).round()
    } else {
        0.0
    };

    let by_method = PaymentMethod::ALL
        .iter()
        .map(|&m| (m.as_str(), total_by_method(donations, m)))
        .collect();

    DonationSummary {
        total_amount,
        total_count,
        verified_amount: total_verified(donations),
        verified_count: count_by_status(donations, VerificationStatus::Verified),
        pending_count: count_by_status(donations, VerificationStatus::Pending),
        rejected_count: count_by_status(donations, VerificationStatus::Rejected),
        average_amount,
        by_method,
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QuizParticipation {
    pub quiz_id: String,
    pub quiz_title: String,
    pub participants: usize,
    pub correct_answers: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CongregationStat {
    pub name: String,
    pub total_participants: usize,
    pub total_correct_answers: usize,
    pub total_quizzes: usize,
    /// Percentage of correct answers per distinct participant; 0 when a
    /// congregation somehow has no participants.
    pub success_rate: f64,
    pub rank: usize,
    pub quiz_participation: Vec<QuizParticipation>,
}

#[derive(Default)]
struct CongregationAccum {
    participants: HashSet<(String, String)>,
    correct: usize,
    per_quiz: BTreeMap<String, (usize, usize)>,
}

/// Aggregate submissions into a ranked leaderboard. Correctness is judged
/// against the quiz answer keys at call time, not a stored flag, so editing a
/// quiz's answer retroactively re-scores its submissions.
pub fn congregation_leaderboard(
    quizzes: &[Quiz],
    submissions: &[QuizSubmission],
) -> Vec<CongregationStat> {
    let quiz_index: HashMap<&str, &Quiz> =
        quizzes.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut accums: BTreeMap<String, CongregationAccum> = BTreeMap::new();
    for sub in submissions {
        let Some(quiz) = quiz_index.get(sub.quiz_id.as_str()) else {
            continue;
        };
        let accum = accums.entry(sub.congregation.clone()).or_default();
        accum
            .participants
            .insert((sub.name.clone(), sub.phone_number.clone()));
        let correct = sub.selected_answer.eq_ignore_ascii_case(&quiz.correct_answer);
        if correct {
            accum.correct += 1;
        }
        let entry = accum.per_quiz.entry(quiz.id.clone()).or_insert((0, 0));
        entry.0 += 1;
        if correct {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<CongregationStat> = accums
        .into_iter()
        .map(|(name, accum)| {
            let total_participants = accum.participants.len();
            let success_rate = if total_participants == 0 {
                0.0
            } else {
                let pct = accum.correct as f64 / total_participants as f64 * 100.0;
                (pct * 10.0).round() / 10.0
            };
            let quiz_participation = accum
                .per_quiz
                .iter()
                .map(|(quiz_id, &(participants, correct_answers))| QuizParticipation {
                    quiz_id: quiz_id.clone(),
                    quiz_title: quiz_index
                        .get(quiz_id.as_str())
                        .map(|q| q.title.clone())
                        .unwrap_or_default(),
                    participants,
                    correct_answers,
                })
                .collect();
            CongregationStat {
                name,
                total_participants,
                total_correct_answers: accum.correct,
                total_quizzes: accum.per_quiz.len(),
                success_rate,
                rank: 0,
                quiz_participation,
            }
        })
        .collect();

    // Most participants first; equal participation is settled by accuracy.
    stats.sort_by(|a, b| {
        b.total_participants
            .cmp(&a.total_participants)
            .then_with(|| {
                b.success_rate
                    .partial_cmp(&a.success_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.name.cmp(&b.name))
    });
    for (i, stat) in stats.iter_mut().enumerate() {
        stat.rank = i + 1;
    }
    stats
}
