// Unit tests for the transcript assembler
//
// The assembler is a pure reducer: the same fragment sequence must always
// yield the same (confirmed, partial) pair.

use voice_session::{TranscriptAssembler, TranscriptFragment};

fn fragment(text: &str, is_final: bool, sequence_index: u64) -> TranscriptFragment {
    TranscriptFragment {
        text: text.to_string(),
        is_final,
        sequence_index,
    }
}

#[test]
fn test_empty_assembler() {
    let assembler = TranscriptAssembler::new();

    assert_eq!(assembler.confirmed(), "");
    assert_eq!(assembler.partial(), "");
}

#[test]
fn test_final_fragments_accumulate_in_arrival_order() {
    let mut assembler = TranscriptAssembler::new();

    assembler.apply(&fragment("Hello ", true, 0));
    assembler.apply(&fragment("world", true, 1));

    assert_eq!(assembler.confirmed(), "Hello world");
    assert_eq!(assembler.partial(), "");
}

#[test]
fn test_partial_fragment_replaces_previous_partial() {
    let mut assembler = TranscriptAssembler::new();

    assembler.apply(&fragment("He", false, 0));
    assembler.apply(&fragment("Hel", false, 1));
    assembler.apply(&fragment("Hell", false, 2));

    assert_eq!(assembler.confirmed(), "");
    assert_eq!(assembler.partial(), "Hell");
}

#[test]
fn test_final_fragment_clears_partial() {
    let mut assembler = TranscriptAssembler::new();

    assembler.apply(&fragment("Hel", false, 0));
    assembler.apply(&fragment("Hello", true, 1));

    assert_eq!(assembler.confirmed(), "Hello");
    assert_eq!(assembler.partial(), "");
}

#[test]
fn test_partial_after_final_starts_fresh() {
    let mut assembler = TranscriptAssembler::new();

    assembler.apply(&fragment("Hello", true, 0));
    assembler.apply(&fragment("wo", false, 1));

    assert_eq!(assembler.confirmed(), "Hello");
    assert_eq!(assembler.partial(), "wo");

    assembler.apply(&fragment("world", true, 2));

    assert_eq!(assembler.confirmed(), "Helloworld");
    assert_eq!(assembler.partial(), "");
}

#[test]
fn test_reset_clears_both_views() {
    let mut assembler = TranscriptAssembler::new();

    assembler.apply(&fragment("Hello", true, 0));
    assembler.apply(&fragment("wo", false, 1));
    assembler.reset();

    assert_eq!(assembler.confirmed(), "");
    assert_eq!(assembler.partial(), "");
}

#[test]
fn test_arbitrary_interleavings_match_the_reference_fold() {
    // confirmed == concatenation of final texts in arrival order;
    // partial == latest non-final since the last final, or empty.
    let sequences: Vec<Vec<(&str, bool)>> = vec![
        vec![],
        vec![("a", false)],
        vec![("a", true)],
        vec![("a", false), ("ab", false), ("abc", true), ("d", false)],
        vec![("x", true), ("y", true), ("z", false), ("zz", false)],
        vec![("one ", true), ("tw", false), ("two ", true), ("three", true)],
    ];

    for sequence in sequences {
        let mut assembler = TranscriptAssembler::new();
        let mut expected_confirmed = String::new();
        let mut expected_partial = String::new();

        for (index, (text, is_final)) in sequence.iter().enumerate() {
            assembler.apply(&fragment(text, *is_final, index as u64));
            if *is_final {
                expected_confirmed.push_str(text);
                expected_partial.clear();
            } else {
                expected_partial = text.to_string();
            }
        }

        assert_eq!(assembler.confirmed(), expected_confirmed);
        assert_eq!(assembler.partial(), expected_partial);
    }
}

#[test]
fn test_snapshot_is_a_plain_copy() {
    let mut assembler = TranscriptAssembler::new();
    assembler.apply(&fragment("done", true, 0));
    assembler.apply(&fragment("more", false, 1));

    let (confirmed, partial) = assembler.snapshot();

    assert_eq!(confirmed, "done");
    assert_eq!(partial, "more");
}
