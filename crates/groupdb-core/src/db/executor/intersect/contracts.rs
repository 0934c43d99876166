use crate::error::InternalError;
use std::fmt::{self, Display};

///
/// JoinType
///
/// Join semantics of an ordered intersection. `Full` is representable so
/// callers can ask for it, but construction rejects it.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT_JOIN",
            Self::Right => "RIGHT_JOIN",
            Self::Full => "FULL_JOIN",
        };
        write!(f, "{label}")
    }
}

///
/// IntersectOutput
/// Which input's row shape the intersection emits.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IntersectOutput {
    Left,
    Right,
}

impl Display for IntersectOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "OUTPUT_LEFT"),
            Self::Right => write!(f, "OUTPUT_RIGHT"),
        }
    }
}

// Static join/output compatibility table.
const fn supports(join: JoinType, output: IntersectOutput) -> bool {
    matches!(
        (join, output),
        (JoinType::Inner, _)
            | (JoinType::Left, IntersectOutput::Left)
            | (JoinType::Right, IntersectOutput::Right)
    )
}

pub(super) fn validate_join(join: JoinType, output: IntersectOutput) -> Result<(), InternalError> {
    if join == JoinType::Full {
        return Err(InternalError::executor_invalid_argument(
            "ordered intersection does not support FULL_JOIN",
        ));
    }
    if !supports(join, output) {
        return Err(InternalError::executor_invalid_argument(format!(
            "ordered intersection cannot combine {join} with {output}"
        )));
    }

    Ok(())
}

/// Whether unmatched rows of the output side are emitted.
pub(super) const fn keeps_unmatched(join: JoinType) -> bool {
    matches!(join, JoinType::Left | JoinType::Right)
}
