use irs_core::cleanup::{filter_collection, StopWords};
use irs_core::models::{InvertedListBooleanModel, RetrievalModel, VectorSpaceModel};
use irs_core::porter::stem_all;
use irs_core::ranking::{buckley_lewit, exhaustive_top_k};
use irs_core::search::buckley_lewit_search;
use irs_core::{Collection, DocId, Document, Engine, EngineConfig, ModelKind, SearchOptions};
use std::collections::HashMap;

fn fables() -> Collection {
    vec![
        Document::new(0, "The Fox and the Grapes", "a hungry fox saw some fine bunches of grapes"),
        Document::new(1, "The Dog and the Shadow", "a dog carrying a piece of meat saw his shadow"),
        Document::new(2, "The Fox and the Crow", "a crow sat on a branch and the fox flattered her"),
        Document::new(3, "The Dog in the Manger", "a dog lay in a manger full of hay"),
        Document::new(4, "The Fox and the Stork", "the fox invited the stork to dinner"),
        Document::new(5, "The Wolf and the Lamb", "a wolf met a lamb drinking at a stream"),
    ]
}

fn stop_words() -> StopWords {
    ["a", "the", "of", "and", "in", "on", "to", "at", "his", "her", "some"].iter().map(|s| s.to_string()).collect()
}

fn ids(engine: &Engine, query: &str, options: SearchOptions) -> Vec<DocId> {
    engine.search(query, options).unwrap().into_iter().map(|h| h.doc_id).collect()
}

#[test]
fn inverted_fox_query() {
    let mut engine = Engine::new(fables(), stop_words(), EngineConfig::default());
    engine.activate(ModelKind::Inverted).unwrap();
    assert_eq!(ids(&engine, "fox", SearchOptions::default()), vec![0, 2, 4]);
    assert_eq!(ids(&engine, "fox -crow", SearchOptions::default()), vec![0, 4]);
    assert_eq!(ids(&engine, "dog | wolf", SearchOptions::default()), vec![1, 3, 5]);
    assert_eq!(ids(&engine, "-(fox | dog)", SearchOptions::default()), vec![5]);
}

#[test]
fn inverted_lists_hold_exactly_the_containing_documents() {
    let mut docs = fables();
    stem_all(&mut docs);
    let model = InvertedListBooleanModel::build(&docs, &StopWords::new(), &EngineConfig::default());
    for stemming in [false, true] {
        for (term, list) in model.list(stemming) {
            let expected: Vec<DocId> = docs
                .iter()
                .filter(|d| (if stemming { &d.stemmed_terms } else { &d.terms }).contains(term))
                .map(|d| d.document_id)
                .collect();
            assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected, "{term}");
        }
    }
}

#[test]
fn boolean_models_agree() {
    let mut docs = fables();
    filter_collection(&mut docs, &stop_words());
    let mut engine = Engine::new(docs, stop_words(), EngineConfig::default());
    let queries = [
        "fox",
        "fox & -crow",
        "(dog | wolf) & -manger",
        "saw | stream",
        "fox & the",
        "-lamb & -fox",
        "flattering | carried",
        "unicorn",
        "unicorn | fox",
    ];
    let mut results: HashMap<ModelKind, Vec<Vec<DocId>>> = HashMap::new();
    for kind in [ModelKind::Linear, ModelKind::Inverted, ModelKind::Signature] {
        engine.activate(kind).unwrap();
        for filtering in [false, true] {
            for stemming in [false, true] {
                let options = SearchOptions::new(filtering, stemming);
                for q in queries {
                    results.entry(kind).or_default().push(ids(&engine, q, options));
                }
            }
        }
    }
    assert_eq!(results[&ModelKind::Linear], results[&ModelKind::Inverted]);
    assert_eq!(results[&ModelKind::Linear], results[&ModelKind::Signature]);
}

#[test]
fn stopword_leaves_are_neutral_under_filtering() {
    let mut docs = fables();
    filter_collection(&mut docs, &stop_words());
    let mut engine = Engine::new(docs, stop_words(), EngineConfig::default());
    engine.activate(ModelKind::Inverted).unwrap();
    let filtered = SearchOptions::new(true, false);
    assert_eq!(ids(&engine, "fox & the", filtered), ids(&engine, "fox", filtered));
    assert!(ids(&engine, "the", filtered).is_empty());
}

#[test]
fn buckley_lewit_matches_exhaustive_ranking() {
    let mut docs = fables();
    stem_all(&mut docs);
    let config = EngineConfig::default();
    let model = VectorSpaceModel::build(&docs, &stop_words(), &config);
    for query in ["fox", "fox dog", "hungry fox grapes", "dog dog wolf shadow", "a the"] {
        for stemming in [false, true] {
            let options = SearchOptions::new(false, stemming);
            let exhaustive = exhaustive_top_k(
                docs.iter().map(|d| {
                    let repr = model.document_to_representation(d, false, stemming);
                    (d.document_id, model.matches(&repr, &query.to_string()))
                }),
                config.gamma + 1,
            );
            let ranked = buckley_lewit_search(&model, query, options, config.gamma);
            assert_eq!(ranked.len(), exhaustive.len(), "{query}");
            let scores: HashMap<DocId, f64> = exhaustive.into_iter().collect();
            for hit in &ranked {
                let expected = scores.get(&hit.doc_id).copied().unwrap_or(f64::NAN);
                assert!((hit.score - expected).abs() < 1e-9, "{query}: doc {}", hit.doc_id);
            }
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}

/// 40 documents: nine that are only "fox", one where "fox" is drowned among
/// rare words, and thirty sharing the common pair "crow lamb".
fn skewed_corpus() -> Collection {
    let mut docs = Collection::new();
    for id in 0..9 {
        docs.push(Document::new(id, "fox", "fox"));
    }
    docs.push(Document::new(9, "mixed", "fox ant bee cat dove eel frog goat hare ibis jay"));
    for id in 10..40 {
        docs.push(Document::new(id, "common", "crow lamb"));
    }
    docs
}

#[test]
fn pruned_ranking_keeps_exhaustive_top_gamma() {
    let docs = skewed_corpus();
    let config = EngineConfig::default();
    let gamma = config.gamma;
    let model = VectorSpaceModel::build(&docs, &StopWords::new(), &config);
    let index = model.index(false);

    let query = "fox fox crow";
    let query_vector = index.query_vector(&model.query_terms(query, false, false));
    let ranking = buckley_lewit(&query_vector, index.postings(), gamma);
    assert!(ranking.pruned);
    assert_eq!(ranking.terms_processed, 1);
    assert_eq!(ranking.hits.len(), gamma + 1);

    let exhaustive = exhaustive_top_k(
        docs.iter().map(|d| {
            let repr = model.document_to_representation(d, false, false);
            (d.document_id, model.matches(&repr, &query.to_string()))
        }),
        gamma,
    );
    let mut pruned_top: Vec<DocId> = ranking.hits[..gamma].iter().map(|&(d, _)| d).collect();
    let mut exhaustive_top: Vec<DocId> = exhaustive.iter().map(|&(d, _)| d).collect();
    pruned_top.sort();
    exhaustive_top.sort();
    assert_eq!(pruned_top, exhaustive_top);
    assert_eq!(pruned_top, (0..9).collect::<Vec<DocId>>());
}

#[test]
fn vector_ranks_repeated_term_higher() {
    let docs = vec![
        Document::new(0, "one", "fox fox fox crow"),
        Document::new(1, "two", "fox crow crow crow"),
        Document::new(2, "three", "lamb"),
    ];
    let mut engine = Engine::new(docs, StopWords::new(), EngineConfig::default());
    engine.activate(ModelKind::Vector).unwrap();
    assert_eq!(ids(&engine, "fox", SearchOptions::default()), vec![0, 1]);
    assert_eq!(ids(&engine, "crow", SearchOptions::default()), vec![1, 0]);
    assert!(ids(&engine, "wolf", SearchOptions::default()).is_empty());
}
