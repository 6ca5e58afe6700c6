//! Eager validation of freshly bound schema objects.

use crate::binding::bind::Reader;
use crate::binding::schema::Schema;
use crate::error::ConfigResult;

/// Invoke every accessor of `bound` once through `reader`, discarding the values.
///
/// All accessors, including those of nested and mapped schemas, see the
/// snapshot `reader` is pinned to. The first error is returned unchanged, so
/// `bind()` fails with the same `NotFound`/`TypeMismatch` the application
/// would otherwise hit later.
pub fn validate<S: Schema>(bound: &S, reader: &Reader<'_>) -> ConfigResult<()> {
    for accessor in S::accessors() {
        if let Err(e) = (accessor.invoke)(bound, reader) {
            tracing::debug!(
                schema = S::NAME,
                prefix = %bound.binding().prefix(),
                accessor = accessor.name,
                generation = reader.snapshot().generation(),
                error = %e,
                "Schema validation failed"
            );
            return Err(e);
        }
    }
    Ok(())
}
