use std::path::Path;

use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn kind_severity() {
    assert_eq!(
        DiagnosticKind::UnclosedGroup.default_severity(),
        Severity::Error
    );
    assert_eq!(
        DiagnosticKind::UndefinedReference.default_severity(),
        Severity::Warning
    );
    assert_eq!(DiagnosticKind::ImportCycle.default_severity(), Severity::Error);
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedSemicolon, range(0, 5))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics, @"error at 0..5: expected `;`");
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedReference, range(3, 7))
        .message("WORD")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(8, 9))
        .message("`!`")
        .emit();

    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.warning_count(), 1);
    assert_eq!(diagnostics.error_count(), 1);
    insta::assert_snapshot!(diagnostics, @r"
    warning at 3..7: `WORD` is not defined
    error at 8..9: unexpected token: `!`
    ");
}

#[test]
fn plain_format_includes_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DuplicateDefinition, range(10, 13))
        .message("NUM")
        .related_to("first defined here", range(0, 3))
        .emit();

    insta::assert_snapshot!(
        diagnostics,
        @"error at 10..13: `NUM` is already defined (related: first defined here at 0..3)"
    );
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedGroup, range(0, 5))
        .message("primary")
        .related_to("related info", range(6, 10))
        .emit();

    let result = diagnostics.render("hello world!");
    insta::assert_snapshot!(result, @r"
    error: missing closing `)`; primary
      |
    1 | hello world!
      | ^^^^^ ---- related info
    ");
}

#[test]
fn render_file_shows_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedReference, range(0, 5))
        .message("hello")
        .emit();

    let result = diagnostics.render_file(Path::new("test.g"), "hello world", false);
    insta::assert_snapshot!(result, @r"
    warning: `hello` is not defined
     --> test.g:1:1
      |
    1 | hello world
      | ^^^^^
    ");
}

#[test]
fn render_zero_width_span() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedHeader, TextRange::empty(0.into()))
        .emit();

    let result = diagnostics.render("hello");
    insta::assert_snapshot!(result, @r"
    error: missing `grammar Name;` header
      |
    1 | hello
      | ^
    ");
}

#[test]
fn render_colored() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::EmptyAlternative, range(0, 5))
        .message("test")
        .emit();

    let result = diagnostics.render_colored("hello", true);
    assert!(result.contains("test"));
    assert!(result.contains('\x1b'));
}

#[test]
fn render_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.render("source").is_empty());
}

#[test]
fn render_zero_width_span_at_end_of_file() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::ExpectedSemicolon, TextRange::empty(8.into()))
        .emit();

    let result = diagnostics.render("A: 'a' B");
    insta::assert_snapshot!(result, @r"
    error: expected `;`
      |
    1 | A: 'a' B
      |        ^
    ");
}

#[test]
fn render_sorts_and_drops_shadowed_reports() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UndefinedReference, range(7, 8))
        .message("B")
        .emit();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(0, 1))
        .emit();
    diagnostics
        .report(DiagnosticKind::ExpectedSemicolon, range(0, 1))
        .emit();

    let result = diagnostics.render("A: 'a' B;");
    insta::assert_snapshot!(result, @r"
    error: expected `;`
      |
    1 | A: 'a' B;
      | ^

    warning: `B` is not defined
      |
    1 | A: 'a' B;
      |        ^
    ");
}

#[test]
fn filtered_keeps_higher_priority_at_same_position() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnexpectedToken, range(4, 5))
        .emit();
    diagnostics
        .report(DiagnosticKind::ExpectedSemicolon, range(4, 4))
        .emit();
    diagnostics
        .report(DiagnosticKind::UndefinedReference, range(0, 3))
        .message("A")
        .emit();

    let filtered = diagnostics.filtered().sorted();
    insta::assert_snapshot!(filtered, @r"
    warning at 0..3: `A` is not defined
    error at 4..4: expected `;`
    ");
}

#[test]
fn error_within_range() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnclosedGroup, range(5, 9))
        .emit();
    diagnostics
        .report(DiagnosticKind::LeftRecursion, range(20, 24))
        .emit();

    assert!(diagnostics.has_error_within(range(0, 10)));
    assert!(!diagnostics.has_error_within(range(10, 30)));
    assert!(diagnostics.contains(DiagnosticKind::LeftRecursion));
}
