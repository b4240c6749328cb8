// ================================================================================================
// VALIDATION PIPELINE
// ================================================================================================
//
// Each route owns an ordered list of checks over a per-request context. A
// check either passes control onward, possibly after writing resolved state
// into the context for the checks behind it, or rejects with the status and
// message for exactly that failure. The first rejection stops the run; the
// terminal handler only executes once every check has passed.
//
// ================================================================================================

use crate::errors::AppError;

/// A single validation step over the per-request context `C`.
pub type Check<C> = fn(&mut C) -> Result<(), AppError>;

/// Runs `checks` in order, short-circuiting on the first rejection.
///
/// Order matters: existence resolution must precede any check that inspects
/// the resolved record, and field-presence checks run before cross-field ones.
pub fn run<C>(ctx: &mut C, checks: &[Check<C>]) -> Result<(), AppError> {
    for check in checks {
        check(ctx)?;
    }
    Ok(())
}
