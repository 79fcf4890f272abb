use super::*;

fn texts(mode: Mode, text: &str) -> Vec<String> {
    segment_text(mode, text)
        .unwrap()
        .into_iter()
        .map(|s| s.text)
        .collect()
}

#[test]
fn single_keeps_text_verbatim() {
    assert_eq!(texts(Mode::Single, "  a  b\nc "), vec!["  a  b\nc "]);
}

#[test]
fn single_accepts_empty_text() {
    let segs = segment_text(Mode::Single, "").unwrap();
    assert_eq!(segs, vec![Segment { index: 0, text: String::new() }]);
}

#[test]
fn char_yields_one_segment_per_scalar_including_whitespace() {
    for text in ["abc", "a b", "   ", "你好 世界", "e\u{301}"] {
        let segs = segment_text(Mode::Char, text).unwrap();
        assert_eq!(segs.len(), text.chars().count(), "{text:?}");
    }
    assert_eq!(texts(Mode::Char, "a b"), vec!["a", " ", "b"]);
}

#[test]
fn word_drops_empty_runs() {
    let out = texts(Mode::Word, "  hello \t world\n\n again  ");
    assert_eq!(out, vec!["hello", "world", "again"]);
    assert!(out.iter().all(|w| !w.is_empty()));
}

#[test]
fn line_trailing_break_does_not_add_segment() {
    assert_eq!(texts(Mode::Line, "a\nb"), texts(Mode::Line, "a\nb\n"));
    assert_eq!(texts(Mode::Line, "a\r\nb\r\n"), vec!["a", "b"]);
}

#[test]
fn line_interior_blank_line_is_empty_segment() {
    assert_eq!(texts(Mode::Line, "a\n\nb"), vec!["a", "", "b"]);
}

#[test]
fn token_splits_on_pipe_without_trimming() {
    assert_eq!(texts(Mode::Token, " a | b||c "), vec![" a ", " b", "", "c "]);
}

#[test]
fn indices_follow_sequence_order() {
    let segs = segment_text(Mode::Word, "x y z").unwrap();
    let idx: Vec<usize> = segs.iter().map(|s| s.index).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn empty_input_fails_outside_single() {
    for mode in [Mode::Char, Mode::Word, Mode::Line, Mode::Token] {
        let err = segment_text(mode, "").unwrap_err();
        assert!(matches!(err, TextToolError::EmptyInput { .. }), "{mode}");
    }
    assert!(segment_text(Mode::Word, " \n\t ").is_err());
}
