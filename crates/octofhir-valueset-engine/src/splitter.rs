//! Size-bounded bundle splitting

use std::num::NonZeroUsize;

use octofhir_valueset_model::TransactionBundle;

/// Partition `bundle` into consecutive transactions of at most `max_entries`.
///
/// Chunk `n` (1-based) is named `<bundle id><n>`. The last chunk may be
/// short; an empty bundle yields no chunks.
pub fn split(bundle: &TransactionBundle, max_entries: NonZeroUsize) -> Vec<TransactionBundle> {
    bundle
        .entries
        .chunks(max_entries.get())
        .enumerate()
        .map(|(i, chunk)| TransactionBundle::new(format!("{}{}", bundle.id, i + 1), chunk.to_vec()))
        .collect()
}
