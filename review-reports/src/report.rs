use std::fmt;

use csc_api::submission::SubmissionRecord;
use csc_api::types::Reviewer;
use itertools::Itertools;

use crate::classify;

/// Printed after every report body.
pub const SEPARATOR: &str = "--------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    NeedMyReaction,
    NeedStudentReaction,
    NeedTeacherAssignment,
    StudentsWithGrade,
    NeedStudentSolution,
}

impl Report {
    /// Every report, in the order they are printed.
    pub const ALL: [Report; 5] = [
        Report::NeedMyReaction,
        Report::NeedStudentReaction,
        Report::NeedTeacherAssignment,
        Report::StudentsWithGrade,
        Report::NeedStudentSolution,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Report::NeedMyReaction => "Need my reaction:",
            Report::NeedStudentReaction => "Need student reaction:",
            Report::NeedTeacherAssignment => "Need teacher assignment:",
            Report::StudentsWithGrade => "Students with grade:",
            Report::NeedStudentSolution => "Need student solution:",
        }
    }

    pub fn matches(self, record: &SubmissionRecord, me: &Reviewer) -> bool {
        let predicate: fn(&SubmissionRecord, &Reviewer) -> bool = match self {
            Report::NeedMyReaction => classify::needs_my_reaction,
            Report::NeedStudentReaction => classify::needs_student_reaction,
            Report::NeedTeacherAssignment => classify::needs_teacher_assignment,
            Report::StudentsWithGrade => classify::has_grade,
            Report::NeedStudentSolution => classify::needs_student_solution,
        };
        predicate(record, me)
    }

    /// Matching records in their original order.
    pub fn select<'r>(
        self,
        records: &'r [SubmissionRecord],
        me: &'r Reviewer,
    ) -> impl Iterator<Item = &'r SubmissionRecord> + 'r {
        records
            .iter()
            .filter(move |record| self.matches(record, me))
    }

    /// The header line followed by one `{n}. {submission}` line per match, numbered from 1.
    pub fn generate(self, records: &[SubmissionRecord], me: &Reviewer) -> String {
        let body = self
            .select(records, me)
            .enumerate()
            .map(|(index, record)| format!("{}. {record}", index + 1))
            .join("\n");
        format!("{}\n{body}", self.header())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.header().trim_end_matches(':').fmt(f)
    }
}
