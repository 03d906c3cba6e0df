//! Champions lists: per term, keep only the `r` postings with the highest
//! normalized tf-idf. Queries on a term then see only those documents, so
//! results are approximate once lists are generated.

use crate::collection::Collection;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Reverse;

/// Attach a champions list of at most `r` postings to every term.
/// `None` leaves the collection on full postings.
pub fn generate(collection: &mut Collection, r: Option<usize>) {
    let Some(r) = r else {
        return;
    };
    let doc_lengths = &collection.doc_lengths;
    collection.index.par_tokens_mut().for_each(|token| {
        let idf = token.idf();
        let mut ranked: Vec<(Reverse<OrderedFloat<f64>>, u32)> = token
            .postings()
            .iter()
            .enumerate()
            .map(|(i, (doc_id, data))| {
                let length = doc_lengths.get(doc_id).copied().unwrap_or(1.0);
                (Reverse(OrderedFloat(idf * data.tf / length)), i as u32)
            })
            .collect();
        // Equal scores keep doc id order, since postings are already sorted.
        ranked.sort_by_key(|(score, _)| *score);
        ranked.truncate(r);
        token.set_champions(ranked.into_iter().map(|(_, i)| i).collect());
    });
    tracing::info!(r, terms = collection.index.len(), "generated champions lists");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocMeta;
    use crate::index::IndexBuilder;
    use crate::lookup::is_strictly_ascending;

    fn meta(id: &str) -> DocMeta {
        DocMeta { id: id.into(), title: String::new(), url: None, date: String::new() }
    }

    fn collection() -> Collection {
        let mut b = IndexBuilder::new();
        // "news" appears once in d1, four times in d2, twice in d3
        b.add_occurrence("news", "d1", 0, 1.0);
        for p in 0..4 {
            b.add_occurrence("news", "d2", p, 1.0);
        }
        b.add_occurrence("news", "d3", 0, 1.0);
        b.add_occurrence("news", "d3", 1, 1.0);
        b.add_occurrence("sport", "d3", 2, 1.0);
        b.add_occurrence("other", "d4", 0, 1.0);
        let index = b.finalize(4);
        Collection::new(index, ["d1", "d2", "d3", "d4"].into_iter().map(meta))
    }

    #[test]
    fn none_is_a_no_op() {
        let mut c = collection();
        generate(&mut c, None);
        assert!(c.index().iter().all(|(_, t)| !t.has_champions()));
    }

    #[test]
    fn keeps_highest_scoring_documents() {
        let mut c = collection();
        generate(&mut c, Some(1));
        let news = c.index().get("news").unwrap();
        let kept: Vec<&str> = news.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(kept, vec!["d2"]);
        assert!(news.get("d1").is_none());
        assert_eq!(news.postings().len(), 3);
    }

    #[test]
    fn lists_are_bounded_sorted_subsets() {
        for r in 0..5 {
            let mut c = collection();
            generate(&mut c, Some(r));
            for (_, token) in c.index().iter() {
                let champions: Vec<_> = token.champions().unwrap().collect();
                assert!(champions.len() <= r);
                assert!(champions.iter().all(|p| token.postings().contains(p)));
                let ids: Vec<&String> = champions.iter().map(|(d, _)| d).collect();
                assert!(is_strictly_ascending(&ids, |d| *d));
            }
        }
    }
}
