use model::entities::{payment, student_enrollment};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use tracing::debug;

use crate::error::Result;

/// Per-semester payment status of an enrollment. The discriminants are the
/// seeded `status` row ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStatus {
    Unpaid = 1,
    Paid = 2,
    Exempt = 3,
}

impl TermStatus {
    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            TermStatus::Unpaid => "Unpaid",
            TermStatus::Paid => "Paid",
            TermStatus::Exempt => "Exempt",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(TermStatus::Unpaid),
            2 => Some(TermStatus::Paid),
            3 => Some(TermStatus::Exempt),
            _ => None,
        }
    }

    /// Paid once every considered fee has a payment. An empty considered
    /// set is trivially satisfied.
    pub fn derive(paid_count: usize, considered_count: usize) -> Self {
        if paid_count >= considered_count {
            TermStatus::Paid
        } else {
            TermStatus::Unpaid
        }
    }
}

/// Result of recomputing an enrollment's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOutcome {
    pub status: TermStatus,
    pub paid_count: usize,
    pub considered_count: usize,
}

/// Counts distinct paid fees among `considered` and writes the derived
/// status onto the enrollment.
pub async fn recompute_status<C: ConnectionTrait>(
    conn: &C,
    student_id: &str,
    semester_id: i32,
    considered: &[i32],
) -> Result<StatusOutcome> {
    let paid_count = if considered.is_empty() {
        0
    } else {
        payment::Entity::find()
            .select_only()
            .column(payment::Column::FeeId)
            .distinct()
            .filter(payment::Column::StudentId.eq(student_id))
            .filter(payment::Column::SemesterId.eq(semester_id))
            .filter(payment::Column::FeeId.is_in(considered.iter().copied()))
            .into_tuple::<i32>()
            .all(conn)
            .await?
            .len()
    };

    let status = TermStatus::derive(paid_count, considered.len());
    debug!(
        "Student {} semester {}: {}/{} considered fees paid -> {}",
        student_id,
        semester_id,
        paid_count,
        considered.len(),
        status.name()
    );

    student_enrollment::Entity::update_many()
        .col_expr(student_enrollment::Column::StatusId, Expr::value(status.id()))
        .filter(student_enrollment::Column::StudentId.eq(student_id))
        .filter(student_enrollment::Column::SemesterId.eq(semester_id))
        .exec(conn)
        .await?;

    Ok(StatusOutcome {
        status,
        paid_count,
        considered_count: considered.len(),
    })
}
