//! Workflow predicates over a single submission, from the point of view of one reviewer.
//!
//! All of these are pure: the same record and reviewer always give the same answer, and an empty
//! discussion is a normal state rather than an error.

use csc_api::submission::SubmissionRecord;
use csc_api::types::{Comment, Reviewer};
use itertools::Itertools;

pub fn has_comment_by(record: &SubmissionRecord, me: &Reviewer) -> bool {
    record.comments().iter().any(|comment| comment.is_by(me))
}

pub fn last_comment_by(record: &SubmissionRecord, me: &Reviewer) -> bool {
    record
        .last_comment()
        .is_some_and(|comment| comment.is_by(me))
}

/// The reviewer took part, but someone else has spoken since.
pub fn needs_my_reaction(record: &SubmissionRecord, me: &Reviewer) -> bool {
    has_comment_by(record, me) && !last_comment_by(record, me)
}

/// The reviewer spoke last and nothing is graded yet.
pub fn needs_student_reaction(record: &SubmissionRecord, me: &Reviewer) -> bool {
    has_comment_by(record, me) && last_comment_by(record, me) && record.score() == 0
}

/// Only one person has ever commented, usually the student waiting for a teacher.
pub fn needs_teacher_assignment(record: &SubmissionRecord, _me: &Reviewer) -> bool {
    record.comments().iter().map(Comment::author).unique().count() == 1
}

pub fn has_grade(record: &SubmissionRecord, me: &Reviewer) -> bool {
    has_comment_by(record, me) && record.score() > 0
}

pub fn needs_student_solution(record: &SubmissionRecord, _me: &Reviewer) -> bool {
    record.comments().is_empty()
}
