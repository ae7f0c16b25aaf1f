use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2001.as_str(), "E2001");
}

#[test]
fn test_all_variants_classified() {
    for code in ErrorCode::ALL {
        let phases = [
            code.is_lexer_error(),
            code.is_parser_error(),
            code.is_type_error(),
            code.is_io_error(),
            code.is_internal_error(),
        ];
        assert_eq!(
            phases.iter().filter(|&&p| p).count(),
            1,
            "{code} must belong to exactly one phase"
        );
        assert!(!code.description().is_empty());
    }
}

#[test]
fn test_all_is_sorted_and_unique() {
    assert!(ErrorCode::ALL.windows(2).all(|w| w[0] < w[1]));
}
