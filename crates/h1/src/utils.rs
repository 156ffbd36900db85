//! Utility macros shared by the codec and connection modules.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns `Err($error)` instead of panicking. Used for
/// the limit and phase checks that guard every decoding step.
///
/// # Example
///
/// ```ignore
/// ensure!(count <= max_count, ParseError::too_many_headers(max_count));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
