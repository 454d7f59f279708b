use crate::index::{DocId, Index, WeightVector};
use std::cmp::Ordering;

/// Generalized Jaccard similarity `Σ min(a_i, b_i) / Σ max(a_i, b_i)`.
///
/// Both vectors are walked once in term order. Two all-zero vectors score 0.
pub fn generalized_jaccard(a: &WeightVector, b: &WeightVector) -> f64 {
    let mut xs = a.iter().peekable();
    let mut ys = b.iter().peekable();
    let mut num = 0.0f64;
    let mut den = 0.0f64;
    loop {
        match (xs.peek().copied(), ys.peek().copied()) {
            (Some((ta, wa)), Some((tb, wb))) => match ta.cmp(&tb) {
                Ordering::Equal => {
                    num += wa.min(wb);
                    den += wa.max(wb);
                    xs.next();
                    ys.next();
                }
                Ordering::Less => {
                    den += wa;
                    xs.next();
                }
                Ordering::Greater => {
                    den += wb;
                    ys.next();
                }
            },
            (Some((_, wa)), None) => {
                den += wa;
                xs.next();
            }
            (None, Some((_, wb))) => {
                den += wb;
                ys.next();
            }
            (None, None) => break,
        }
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Scores `query` against every document of `index`.
///
/// Highest score first; equal scores keep ascending document order. One entry
/// per document, no truncation.
pub fn rank(query: &WeightVector, index: &Index) -> Vec<(DocId, f64)> {
    let mut scored: Vec<(DocId, f64)> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(doc_id, doc)| (doc_id, generalized_jaccard(query, doc)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored
}
