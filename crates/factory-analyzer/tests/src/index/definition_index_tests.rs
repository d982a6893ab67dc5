use std::path::PathBuf;

use super::*;

fn file(
    path: &str,
    text: &str,
) -> (PathBuf, Vec<u8>) {
    (PathBuf::from(path), text.as_bytes().to_vec())
}

fn location(
    path: &str,
    line: u32,
) -> DefinitionLocation {
    DefinitionLocation {
        source_path: PathBuf::from(path),
        line,
    }
}

#[test]
fn new_index_is_empty_and_not_ready() {
    let index = DefinitionIndex::new();
    assert!(!index.is_ready());
    assert!(index.is_empty());
    assert_eq!(index.generation(), 0);
    assert!(index.lookup("user").is_none());
}

#[test]
fn rebuild_records_line_numbers() {
    let index = DefinitionIndex::new();
    let stats = index.rebuild([file(
        "/w/spec/factories/all.rb",
        "factory :user do\n  name { 'John' }\nend\n\nfactory :post do\nend",
    )]);

    assert!(index.is_ready());
    assert_eq!(stats.files_scanned, 1);
    assert_eq!(stats.definitions, 2);
    assert_eq!(index.lookup("user"), Some(location("/w/spec/factories/all.rb", 0)));
    assert_eq!(index.lookup("post"), Some(location("/w/spec/factories/all.rb", 4)));
    assert!(index.lookup("comment").is_none());
}

#[test]
fn rebuild_with_no_files_still_becomes_ready() {
    let index = DefinitionIndex::new();
    let stats = index.rebuild(Vec::new());
    assert!(index.is_ready());
    assert!(index.is_empty());
    assert_eq!(stats.generation, 1);
}

#[test]
fn last_file_wins_on_duplicate_names() {
    let index = DefinitionIndex::new();
    let stats = index.rebuild([
        file("/w/a.rb", "factory :user do\nend"),
        file("/w/b.rb", "\n\nfactory :user do\nend"),
    ]);
    assert_eq!(stats.overwritten, 1);
    assert_eq!(index.lookup("user"), Some(location("/w/b.rb", 2)));
}

#[test]
fn last_occurrence_in_file_wins() {
    let index = DefinitionIndex::new();
    index.rebuild([file("/w/a.rb", "factory :user do\nend\nfactory :user do\nend")]);
    assert_eq!(index.lookup("user"), Some(location("/w/a.rb", 2)));
}

#[test]
fn same_file_listed_twice_is_harmless() {
    let index = DefinitionIndex::new();
    let text = "factory :user do\nend";
    index.rebuild([file("/w/a.rb", text), file("/w/a.rb", text)]);
    assert_eq!(index.len(), 1);
    assert_eq!(index.lookup("user"), Some(location("/w/a.rb", 0)));
}

#[test]
fn rebuild_replaces_instead_of_merging() {
    let index = DefinitionIndex::new();
    index.rebuild([file("/w/a.rb", "factory :user do\nend")]);
    index.rebuild([file("/w/a.rb", "factory :post do\nend")]);

    assert!(index.lookup("user").is_none());
    assert!(index.lookup("post").is_some());
    assert_eq!(index.generation(), 2);
}

#[test]
fn rebuild_is_idempotent_for_identical_input() {
    let files = || {
        vec![
            file("/w/a.rb", "factory :user do\nend\nfactory :admin do\nend"),
            file("/w/b.rb", "factory :post do\nend"),
        ]
    };
    let once = DefinitionIndex::new();
    once.rebuild(files());
    let twice = DefinitionIndex::new();
    twice.rebuild(files());
    twice.rebuild(files());

    for name in ["user", "admin", "post", "missing"] {
        assert_eq!(once.lookup(name), twice.lookup(name), "lookup({name})");
    }
    assert_eq!(once.len(), twice.len());
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let index = DefinitionIndex::new();
    let mut bytes = b"# \xff\xfe\n".to_vec();
    bytes.extend_from_slice(b"factory :user do\nend");
    index.rebuild([(PathBuf::from("/w/a.rb"), bytes)]);
    assert_eq!(index.lookup("user"), Some(location("/w/a.rb", 1)));
}

#[test]
fn snapshot_taken_before_rebuild_keeps_previous_generation() {
    let index = DefinitionIndex::new();
    index.rebuild([file("/w/a.rb", "factory :user do\nend")]);
    let before = index.snapshot();
    index.rebuild([file("/w/a.rb", "factory :post do\nend")]);

    assert_eq!(before.generation, 1);
    assert!(before.definitions.contains_key("user"));
    assert!(!before.definitions.contains_key("post"));
    assert_eq!(index.snapshot().generation, 2);
}
