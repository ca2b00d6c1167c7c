use std::sync::Arc;

use expect_test::expect;
use posmap::{discover_settings, DocumentStore, ErrorKind, FileRegistry, Mapper};
use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn mapper(text: &str) -> Mapper {
    Mapper::new(Url::parse("file:///test.go").unwrap(), text.as_bytes())
}

/// Resolve each `(line, character)` and format one result per line:
///   <line>:<character> -> <offset or error>
fn format_position_offsets(text: &str, positions: &[(u32, u32)]) -> String {
    let m = mapper(text);
    positions
        .iter()
        .map(|&(line, character)| {
            let result = match m.position_offset(Position::new(line, character)) {
                Ok(offset) => offset.to_string(),
                Err(e) => e.to_string(),
            };
            format!("{}:{} -> {}\n", line, character, result)
        })
        .collect()
}

/// Convert every offset from 0 to one past the end and format the results:
///   <offset> -> <line>:<character or error>
fn format_offset_positions(text: &str) -> String {
    let m = mapper(text);
    (0..=text.len() + 1)
        .map(|offset| {
            let result = match m.offset_position(offset) {
                Ok(pos) => format!("{}:{}", pos.line, pos.character),
                Err(e) => e.to_string(),
            };
            format!("{} -> {}\n", offset, result)
        })
        .collect()
}

/// Byte offsets of every character boundary, including the end.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests — LSP position to byte offset
// ---------------------------------------------------------------------------

#[test]
fn surrogate_pair_columns() {
    let actual = format_position_offsets(
        "a𐐀b",
        &[(0, 0), (0, 1), (0, 2), (0, 3), (0, 4), (0, 5)],
    );
    let expected = expect![[r#"
        0:0 -> 0
        0:1 -> 1
        0:2 -> 1
        0:3 -> 5
        0:4 -> 6
        0:5 -> column 5 is beyond end of line 0 (4 UTF-16 code units)
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn line_and_eof_boundaries() {
    let actual = format_position_offsets(
        "aaa\nbbb\n",
        &[(0, 3), (0, 4), (1, 0), (1, 3), (1, 4), (2, 0), (2, 1), (3, 0)],
    );
    let expected = expect![[r#"
        0:3 -> 3
        0:4 -> column 4 is beyond end of line 0 (3 UTF-16 code units)
        1:0 -> 4
        1:3 -> 7
        1:4 -> column 4 is beyond end of line 1 (3 UTF-16 code units)
        2:0 -> 8
        2:1 -> column 1 is beyond end of line 2 (0 UTF-16 code units)
        3:0 -> line 3 is out of range (file has 3 lines)
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn empty_line_between_terminators() {
    let actual = format_position_offsets("aaa\nbbb\n\n", &[(2, 0), (2, 1), (3, 0)]);
    let expected = expect![[r#"
        2:0 -> 8
        2:1 -> column 1 is beyond end of line 2 (0 UTF-16 code units)
        3:0 -> 9
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn empty_document() {
    let actual = format_position_offsets("", &[(0, 0), (0, 1), (1, 0)]);
    let expected = expect![[r#"
        0:0 -> 0
        0:1 -> column 1 is beyond end of line 0 (0 UTF-16 code units)
        1:0 -> line 1 is out of range (file has 1 lines)
    "#]];
    expected.assert_eq(&actual);
}

// ---------------------------------------------------------------------------
// Tests — byte offset to LSP position
// ---------------------------------------------------------------------------

#[test]
fn every_offset_of_mixed_width_text() {
    let actual = format_offset_positions("a😀\né\n");
    let expected = expect![[r#"
        0 -> 0:0
        1 -> 0:1
        2 -> byte column 2 of line 0 is not on a character boundary
        3 -> byte column 3 of line 0 is not on a character boundary
        4 -> byte column 4 of line 0 is not on a character boundary
        5 -> 0:3
        6 -> 1:0
        7 -> byte column 1 of line 1 is not on a character boundary
        8 -> 1:1
        9 -> 2:0
        10 -> offset 10 is not in range for file file:///test.go of size 9
    "#]];
    expected.assert_eq(&actual);
}

#[test]
fn round_trip_on_char_boundaries() {
    let texts = [
        "",
        "hello\nworld",
        "aaa\nbbb\n\n",
        "a𐐀b\n😀😀\r\nend",
        "é€\n\n\tx",
    ];
    for text in texts {
        let m = mapper(text);
        for offset in char_boundaries(text) {
            let pos = m.offset_position(offset).unwrap();
            assert_eq!(
                m.position_offset(pos),
                Ok(offset),
                "round trip of {} in {:?}",
                offset,
                text
            );
        }
    }
}

#[test]
fn ranges_round_trip() {
    let m = mapper("fn main() {\n    let 😀 = 1;\n}\n");
    let range = m.offsets_range(16, 24).unwrap();
    assert_eq!(range, Range::new(Position::new(1, 4), Position::new(1, 10)));
    assert_eq!(m.range_offsets(range), Ok(16..24));
    assert_eq!(m.range_text(range).unwrap(), "let 😀".as_bytes());
}

// ---------------------------------------------------------------------------
// Tests — parser positions
// ---------------------------------------------------------------------------

#[test]
fn parser_end_one_byte_past_eof() {
    let registry = FileRegistry::default();
    let _other = registry.add_file("other.go", 20).unwrap();
    let text = "package a\n\nfunc f() {";
    let file = registry.add_file("a.go", text.len()).unwrap();
    let m = mapper(text);

    // End position reported by an error-recovering parser.
    let overshoot = file.end() + 1;
    assert_eq!(file.offset(overshoot), Ok(file.size()));
    assert_eq!(m.pos_position(&file, overshoot), Ok(Position::new(2, 10)));
    assert_eq!(
        m.pos_range(&file, file.base(), overshoot),
        Ok(Range::new(Position::new(0, 0), Position::new(2, 10)))
    );

    let err = file.offset(file.end() + 2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(err.to_string(), "pos 45 is not in range [22:43] of file a.go");
    assert_eq!(file.pos(file.size() + 1).unwrap_err().kind(), ErrorKind::OutOfRange);
}

// ---------------------------------------------------------------------------
// Tests — document store
// ---------------------------------------------------------------------------

#[test]
fn incremental_changes_through_store() {
    let store = DocumentStore::new();
    let uri = Url::parse("file:///doc.txt").unwrap();
    store
        .open(uri.clone(), "a𐐀b\nline two\n".to_string(), 1)
        .unwrap();

    let changes = vec![
        // Replace the astral character, addressed by its UTF-16 columns.
        TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(0, 1), Position::new(0, 3))),
            range_length: None,
            text: "-".to_string(),
        },
        TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(1, 5), Position::new(1, 8))),
            range_length: None,
            text: "2".to_string(),
        },
    ];
    let snapshot = store.change(&uri, 2, &changes).unwrap();
    let actual = String::from_utf8(snapshot.mapper.content().to_vec()).unwrap();
    let expected = expect![[r#"
        a-b
        line 2
    "#]];
    expected.assert_eq(&actual);
    assert_eq!(snapshot.file.size(), actual.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_see_identical_results() {
    let text = "x😀y\n".repeat(200);
    let m = Arc::new(mapper(&text));
    let offsets = char_boundaries(&text);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let m = Arc::clone(&m);
        let offsets = offsets.clone();
        handles.push(tokio::spawn(async move {
            offsets
                .iter()
                .map(|&o| m.offset_position(o).unwrap())
                .collect::<Vec<_>>()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].last(), Some(&Position::new(200, 0)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_keep_consistent_snapshots_while_writer_publishes() {
    let store = Arc::new(DocumentStore::new());
    let uri = Url::parse("file:///live.txt").unwrap();
    store.open(uri.clone(), String::new(), 0).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        let uri = uri.clone();
        tokio::spawn(async move {
            for version in 1..=100 {
                let change = TextDocumentContentChangeEvent {
                    range: None,
                    range_length: None,
                    text: "é\n".repeat(version as usize),
                };
                store.change(&uri, version, &[change]).unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        let uri = uri.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let snapshot = store.get(&uri).unwrap();
                let m = &snapshot.mapper;
                let lines = snapshot.version as u32;
                assert_eq!(m.content().len(), snapshot.file.size());
                assert_eq!(m.line_count(), lines as usize + 1);
                assert_eq!(
                    m.offset_position(m.content().len()),
                    Ok(Position::new(lines, 0))
                );
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(store.get(&uri).unwrap().version, 100);
}

// ---------------------------------------------------------------------------
// Tests — settings discovery
// ---------------------------------------------------------------------------

#[test]
fn settings_found_in_ancestor() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(
        root.path().join("settings.toml"),
        "[files]\nbase = 500\n\n[documents]\nreject_stale_versions = false\n",
    )
    .unwrap();
    let nested = root.path().join("src/pkg");
    std::fs::create_dir_all(&nested).unwrap();

    let (settings, dir) = discover_settings(&nested);
    assert_eq!(dir, root.path());
    assert_eq!(settings.files.base, 500);

    let store = DocumentStore::with_settings(&settings);
    let uri = Url::parse("file:///a.txt").unwrap();
    let snapshot = store.open(uri.clone(), "abc".to_string(), 5).unwrap();
    assert_eq!(snapshot.file.base(), 500);
    // Stale versions are accepted with this configuration.
    assert!(store.change(&uri, 1, &[]).is_ok());
}

#[test]
fn settings_found_in_child_directory() {
    let root = tempfile::tempdir().unwrap();
    let child = root.path().join("config");
    std::fs::create_dir_all(&child).unwrap();
    std::fs::write(child.join("settings.toml"), "[files]\nbase = 9\n").unwrap();

    let (settings, dir) = discover_settings(root.path());
    assert_eq!(dir, child);
    assert_eq!(settings.files.base, 9);
    assert!(settings.documents.reject_stale_versions);
}

#[test]
fn invalid_settings_fall_back_to_defaults() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("settings.toml"), "[files\nbase = ").unwrap();

    let (settings, _) = discover_settings(root.path());
    assert_eq!(settings, posmap::Settings::default());
}
