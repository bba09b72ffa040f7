use irs_core::cleanup::StopWords;
use irs_core::persist::{load_collection, load_data_dir, load_meta, save_collection, save_meta, save_stop_words, DataPaths, MetaFile};
use irs_core::Document;

#[test]
fn collection_and_stop_words_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path().join("data"));

    let mut doc = Document::new(0, "The Fox and the Grapes", "a fox saw grapes");
    doc.filtered_terms = vec!["fox".into(), "saw".into(), "grapes".into()];
    let collection = vec![doc, Document::new(1, "The Ant", "an ant")];
    let stop_words: StopWords = ["a", "an"].iter().map(|s| s.to_string()).collect();

    save_collection(&paths, &collection).unwrap();
    save_stop_words(&paths, &stop_words).unwrap();
    save_meta(&paths, &MetaFile { num_docs: 2, created_at: "2024-01-01T00:00:00Z".into(), version: 1 }).unwrap();

    let (loaded, loaded_stop_words) = load_data_dir(&paths).unwrap();
    assert_eq!(loaded, collection);
    assert_eq!(loaded_stop_words, stop_words);
    assert_eq!(load_meta(&paths).unwrap().num_docs, 2);

    let on_disk = std::fs::read_to_string(paths.stop_words()).unwrap();
    assert_eq!(on_disk, r#"["a","an"]"#);
}

#[test]
fn missing_files_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    let (collection, stop_words) = load_data_dir(&paths).unwrap();
    assert!(collection.is_empty());
    assert!(stop_words.is_empty());
    assert!(load_meta(&paths).is_err());
}

#[test]
fn older_collections_without_term_lists_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    std::fs::write(paths.collection(), r#"[{"document_id":0,"title":"t","raw_text":"a fox"}]"#).unwrap();
    let collection = load_collection(&paths).unwrap();
    assert_eq!(collection[0].raw_text, "a fox");
    assert!(collection[0].terms.is_empty());
}
