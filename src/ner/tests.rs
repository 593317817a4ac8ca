use super::*;

fn labels(entities: &[Entity]) -> Vec<(&str, &str)> {
    entities
        .iter()
        .map(|e| (e.text.as_str(), e.label.as_str()))
        .collect()
}

fn tagged<'a>(text: &str, pieces: &[(&'a str, &str, u32)]) -> Vec<TaggedToken<'a>> {
    let mut cursor = 0;
    pieces
        .iter()
        .map(|&(tag, piece, word)| {
            let start = cursor + text[cursor..].find(piece).unwrap();
            cursor = start + piece.len();
            TaggedToken {
                tag,
                start,
                end: cursor,
                word: Some(word),
            }
        })
        .collect()
}

#[test]
fn test_config_default() {
    let config = NerConfig::default();

    assert!(config.model_path.is_none());
    assert_eq!(config.max_seq_len, MAX_SEQ_LEN);
    assert_eq!(config.chunk_bytes, DEFAULT_CHUNK_BYTES);
}

#[test]
fn test_config_validate() {
    assert!(NerConfig::stub().validate().is_ok());
    assert!(NerConfig::stub().with_chunk_bytes(0).validate().is_err());
    assert!(NerConfig::new("").validate().is_err());
}

#[test]
fn test_load_with_missing_model() {
    let err = EntityExtractor::load(NerConfig::new("/nonexistent/ner")).unwrap_err();
    assert!(matches!(err, ModelError::DirectoryNotFound { .. }));
}

#[test]
fn test_load_with_incomplete_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();
    std::fs::write(dir.path().join("tokenizer.json"), "{}").unwrap();

    let err = EntityExtractor::load(NerConfig::new(dir.path())).unwrap_err();

    match err {
        ModelError::MissingFile { component, path } => {
            assert_eq!(component, "ner");
            assert_eq!(path, dir.path().join("model.safetensors"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_stub_creation() {
    let extractor = EntityExtractor::stub().unwrap();

    assert!(!extractor.is_model_loaded());
    assert!(format!("{extractor:?}").contains("model_loaded: false"));
}

#[test]
fn test_empty_text_has_no_entities() {
    let extractor = EntityExtractor::stub().unwrap();

    assert!(extractor.extract("").unwrap().is_empty());
    assert!(extractor.extract("  \n\t ").unwrap().is_empty());
}

#[test]
fn test_entity_serializes_as_pair() {
    let entity = Entity::new("Monday", "DATE");

    let json = serde_json::to_string(&entity).unwrap();
    assert_eq!(json, r#"["Monday","DATE"]"#);

    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, entity);
}

#[test]
fn test_rules_time_with_meridiem_and_zone() {
    let entities = EntityExtractor::stub()
        .unwrap()
        .extract("Assignments are due by 10:00 PM EST on Friday.")
        .unwrap();

    assert_eq!(
        labels(&entities),
        vec![("10:00 PM EST", "TIME"), ("Friday", "DATE")]
    );
}

#[test]
fn test_rules_dates() {
    let entities = rules::extract("The exam is on September 21, 2025 and the retake on 3 October.");

    assert_eq!(
        labels(&entities),
        vec![("September 21, 2025", "DATE"), ("3 October", "DATE")]
    );
}

#[test]
fn test_rules_numeric_date_and_year() {
    let entities = rules::extract("Submitted 2025-09-21 for the 2024 cohort.");

    assert_eq!(
        labels(&entities),
        vec![("2025-09-21", "DATE"), ("2024", "DATE")]
    );
}

#[test]
fn test_rules_percent_money_cardinal() {
    let entities =
        rules::extract("A 5% penalty applies, the fee is $20 and 3 attempts cost 40 dollars.");

    assert_eq!(
        labels(&entities),
        vec![
            ("5%", "PERCENT"),
            ("$20", "MONEY"),
            ("3", "CARDINAL"),
            ("40 dollars", "MONEY"),
        ]
    );
}

#[test]
fn test_rules_spelled_percent_and_ordinal() {
    let entities = rules::extract("Attendance must reach 75 percent by the 3rd week.");

    assert_eq!(
        labels(&entities),
        vec![("75 percent", "PERCENT"), ("3rd", "ORDINAL")]
    );
}

#[test]
fn test_rules_capitalized_runs() {
    let entities =
        rules::extract("Students at Springfield Technical College must email Dr Jane Smith.");

    assert_eq!(
        labels(&entities),
        vec![
            ("Springfield Technical College", "ORG"),
            ("Dr Jane Smith", "MISC"),
        ]
    );
}

#[test]
fn test_rules_sentence_initial_word_is_not_entity() {
    let entities = rules::extract("Submissions close early. Late work is rejected.");

    assert!(entities.is_empty(), "{entities:?}");
}

#[test]
fn test_rules_acronym_at_sentence_start() {
    let entities = rules::extract("NASA approved the plan.");

    assert_eq!(labels(&entities), vec![("NASA", "MISC")]);
}

#[test]
fn test_rules_punctuation_breaks_runs() {
    let entities = rules::extract("We visited Paris, London and Rome.");

    assert_eq!(
        labels(&entities),
        vec![("Paris", "MISC"), ("London", "MISC"), ("Rome", "MISC")]
    );
}

#[test]
fn test_rules_may_is_only_a_month_mid_sentence() {
    assert!(rules::extract("May I submit late?").is_empty());
    assert_eq!(
        labels(&rules::extract("The deadline is May 5.")),
        vec![("May 5", "DATE")]
    );
}

#[test]
fn test_rules_preserve_order_and_repeats() {
    let entities = rules::extract("Due at noon. Resubmit at noon.");

    assert_eq!(labels(&entities), vec![("noon", "TIME"), ("noon", "TIME")]);
}

#[test]
fn test_rules_handle_non_ascii() {
    let entities = rules::extract("Le cours à São Paulo coûte €15 le lundi.");

    assert_eq!(
        labels(&entities),
        vec![("São Paulo", "MISC"), ("€15", "MONEY")]
    );
}

#[test]
fn test_split_tag() {
    assert_eq!(split_tag("O"), None);
    assert_eq!(split_tag(""), None);
    assert_eq!(split_tag("B-PER"), Some((true, "PER")));
    assert_eq!(split_tag("I-ORG"), Some((false, "ORG")));
    assert_eq!(split_tag("S-LOC"), Some((true, "LOC")));
    assert_eq!(split_tag("MISC"), Some((false, "MISC")));
}

#[test]
fn test_decode_bio_merges_spans() {
    let text = "John Smith works at Acme Corp in Paris";
    let tokens = tagged(
        text,
        &[
            ("B-PER", "John", 0),
            ("I-PER", "Smith", 1),
            ("O", "works", 2),
            ("O", "at", 3),
            ("B-ORG", "Acme", 4),
            ("I-ORG", "Corp", 5),
            ("O", "in", 6),
            ("B-LOC", "Paris", 7),
        ],
    );

    assert_eq!(
        labels(&decode_bio(text, &tokens)),
        vec![("John Smith", "PER"), ("Acme Corp", "ORG"), ("Paris", "LOC")]
    );
}

#[test]
fn test_decode_bio_merges_subwords_tagged_begin() {
    let text = "Washington agreed";
    let tokens = tagged(
        text,
        &[("B-LOC", "Wash", 0), ("B-LOC", "ington", 0), ("O", "agreed", 1)],
    );

    assert_eq!(
        labels(&decode_bio(text, &tokens)),
        vec![("Washington", "LOC")]
    );
}

#[test]
fn test_decode_bio_adjacent_begins_split() {
    let text = "Alice Bob";
    let tokens = tagged(text, &[("B-PER", "Alice", 0), ("B-PER", "Bob", 1)]);

    assert_eq!(
        labels(&decode_bio(text, &tokens)),
        vec![("Alice", "PER"), ("Bob", "PER")]
    );
}

#[test]
fn test_decode_bio_label_change_closes_span() {
    let text = "Paris Hilton";
    let tokens = tagged(text, &[("B-LOC", "Paris", 0), ("I-PER", "Hilton", 1)]);

    assert_eq!(
        labels(&decode_bio(text, &tokens)),
        vec![("Paris", "LOC"), ("Hilton", "PER")]
    );
}

#[test]
fn test_decode_bio_ignores_bad_offsets() {
    let text = "é";
    let tokens = [TaggedToken {
        tag: "B-MISC",
        start: 1,
        end: 2,
        word: Some(0),
    }];

    assert!(decode_bio(text, &tokens).is_empty());
}

#[test]
fn test_chunk_spans_short_text() {
    assert_eq!(chunk_spans("hello world", 100), vec![(0, 11)]);
    assert!(chunk_spans("", 100).is_empty());
    assert!(chunk_spans("   ", 100).is_empty());
}

#[test]
fn test_chunk_spans_split_on_whitespace() {
    let text = "alpha beta gamma delta";
    let spans = chunk_spans(text, 11);
    let chunks: Vec<&str> = spans.iter().map(|&(s, e)| &text[s..e]).collect();

    assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
}

#[test]
fn test_chunk_spans_cut_long_words_on_char_boundary() {
    let text = "ééééé";
    let spans = chunk_spans(text, 3);

    for &(s, e) in &spans {
        assert!(text.is_char_boundary(s) && text.is_char_boundary(e));
        assert!(e > s);
    }
    let rebuilt: String = spans.iter().map(|&(s, e)| &text[s..e]).collect();
    assert_eq!(rebuilt, text);
}

/// Word-level tokenizer over whitespace, no special tokens, truncating at `max_len`.
fn word_tokenizer(words: &[&str], max_len: usize) -> (tempfile::TempDir, Tokenizer) {
    let vocab: serde_json::Map<String, serde_json::Value> = std::iter::once("[UNK]")
        .chain(words.iter().copied())
        .enumerate()
        .map(|(id, word)| (word.to_string(), serde_json::json!(id)))
        .collect();
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {"type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]"}
    });

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tokenizer.json"), tokenizer_json.to_string()).unwrap();
    let tokenizer = load_tokenizer("ner", dir.path(), max_len).unwrap();
    (dir, tokenizer)
}

#[test]
fn test_encode_within_limit_resplits_truncated_spans() {
    let words = [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    ];
    let text = words.join(" ");
    let (_dir, tokenizer) = word_tokenizer(&words, 4);

    let encoded = encode_within_limit(&tokenizer, &text, DEFAULT_CHUNK_BYTES).unwrap();

    assert!(encoded.len() >= 3);
    for ((start, end), encoding) in &encoded {
        assert!(encoding.get_overflowing().is_empty());
        assert!(encoding.get_ids().len() <= 4);
        assert_eq!(
            encoding.get_ids().len(),
            text[*start..*end].split_whitespace().count()
        );
    }

    let rebuilt: Vec<&str> = encoded
        .iter()
        .flat_map(|((start, end), _)| text[*start..*end].split_whitespace())
        .collect();
    assert_eq!(rebuilt, words);
}

#[test]
fn test_encode_within_limit_keeps_short_text_whole() {
    let (_dir, tokenizer) = word_tokenizer(&["due", "friday"], 8);

    let encoded = encode_within_limit(&tokenizer, "due friday", DEFAULT_CHUNK_BYTES).unwrap();

    assert_eq!(encoded.len(), 1);
    assert_eq!(encoded[0].0, (0, 10));
}

#[test]
fn test_split_span_prefers_whitespace_near_middle() {
    let text = "one two three four";

    let (left, right) = split_span(text, 0, text.len()).unwrap();

    assert_eq!(&text[left.0..left.1], "one two");
    assert_eq!(&text[right.0..right.1], "three four");
}

#[test]
fn test_split_span_cuts_unspaced_text_on_char_boundary() {
    let text = "東京大学の授業";

    let (left, right) = split_span(text, 0, text.len()).unwrap();

    assert!(text.is_char_boundary(left.1) && text.is_char_boundary(right.0));
    assert_eq!(left.1, right.0);
    assert_eq!(format!("{}{}", &text[left.0..left.1], &text[right.0..right.1]), text);
}

#[test]
fn test_split_span_single_char_is_unsplittable() {
    assert_eq!(split_span("x", 0, 1), None);
    assert_eq!(split_span("é  ", 0, 4), None);
}
