use crate::{Document, InvertedIndex, Result};
use rayon::prelude::*;

/// Run each query against the index (active documents, default ranking) on
/// the rayon pool. Output keeps the order of `queries`; the first failing
/// query's error is returned.
pub fn process_queries<S>(index: &InvertedIndex, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    let results = queries
        .par_iter()
        .map(|query| index.find_top_documents(query.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(queries = queries.len(), "processed query batch");
    Ok(results)
}

/// Same as [`process_queries`], flattened in query order then rank order.
pub fn process_queries_joined<S>(index: &InvertedIndex, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(index, queries)?.into_iter().flatten().collect())
}
