//! Node-style callback adapter.
//!
//! Every resource operation returns a single `NylasResult`. Callers that prefer a
//! callback can use the `*_with_callback` variants, which hand the outcome to the
//! callback by reference and then return it unchanged.

use crate::errors::{NylasError, NylasResult};

/// Invokes `callback` with a view of `result`, then returns `result`.
pub fn notify<T, F>(result: NylasResult<T>, callback: F) -> NylasResult<T>
where
    F: FnOnce(Result<&T, &NylasError>),
{
    callback(result.as_ref());
    result
}
