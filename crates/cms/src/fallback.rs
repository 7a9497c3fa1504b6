//! ID-resolution fallback between the two content-API addressing schemes.
//!
//! Older API versions address records by numeric primary key, newer ones by
//! stable document id. [`with_id_fallback`] bridges the two: it is a single
//! retry, synchronous from the caller's point of view, with no backoff and
//! no caching.

use std::future::Future;

use crate::CmsError;

/// Whether an identifier is a numeric primary key (`^\d+$`).
#[must_use]
pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Run `op` with `id_or_document_id` as the path identifier, retrying once
/// with a resolved numeric id when the first attempt hits a not-found.
///
/// - A numeric identifier is used directly; any failure propagates.
/// - A document id is tried as-is first (newer APIs accept it); on
///   not-found, `resolve` looks the numeric id up by document-id filter and
///   `op` runs exactly once more with it.
/// - If the resolver finds nothing, the result is a not-found error naming
///   the resource and identifier.
///
/// # Errors
///
/// Propagates any non-not-found error from `op` unchanged, and resolver
/// errors as-is.
pub async fn with_id_fallback<T, Op, OpFut, Res, ResFut>(
    resource: &str,
    id_or_document_id: &str,
    op: Op,
    resolve: Res,
) -> Result<T, CmsError>
where
    Op: Fn(String) -> OpFut,
    OpFut: Future<Output = Result<T, CmsError>>,
    Res: FnOnce(String) -> ResFut,
    ResFut: Future<Output = Result<Option<i64>, CmsError>>,
{
    if is_numeric_id(id_or_document_id) {
        return op(id_or_document_id.to_owned()).await;
    }

    match op(id_or_document_id.to_owned()).await {
        Err(err) if err.is_not_found() => {
            tracing::debug!(
                resource,
                id = id_or_document_id,
                "direct operation hit not-found, resolving numeric id"
            );
            let resolved = resolve(id_or_document_id.to_owned()).await?;
            match resolved {
                Some(numeric) => op(numeric.to_string()).await,
                None => Err(CmsError::NotFound {
                    resource: resource.to_owned(),
                    id: id_or_document_id.to_owned(),
                }),
            }
        }
        other => other,
    }
}
