//! Integration tests for the static checker.
//!
//! These tests run the bare-except check over inline snippets and the
//! Python fixtures in testdata/.

use std::path::PathBuf;

use codeassist::checker::{collect_python_files, StaticChecker, BARE_EXCEPT_FIX, BARE_EXCEPT_MESSAGE};
use codeassist::{BugReport, Severity};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn check(source: &str) -> Vec<BugReport> {
    StaticChecker::default().check(source)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_bare_except_scenario() {
    let reports = check("try:\n    x = 1\nexcept:\n    pass");

    assert_eq!(reports.len(), 1, "expected exactly one finding: {:?}", reports);
    assert_eq!(reports[0].line_number, 3);
    assert_eq!(reports[0].severity, Severity::Medium);
    assert_eq!(reports[0].description, BARE_EXCEPT_MESSAGE);
    assert_eq!(reports[0].fix_suggestion.as_deref(), Some(BARE_EXCEPT_FIX));
}

#[test]
fn test_typed_except_scenario() {
    let reports = check("try:\n    x = 1\nexcept ValueError:\n    pass");
    assert!(reports.is_empty(), "unexpected findings: {:?}", reports);
}

#[test]
fn test_malformed_input_scenario() {
    let reports = check("def f(:");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::High);
    assert!(
        reports[0].description.to_lowercase().contains("syntax error"),
        "description should mention a syntax error: {}",
        reports[0].description
    );
    assert!(reports[0].line_number <= 1);
}

#[test]
fn test_exception_group_handler_is_not_bare() {
    let reports = check("try:\n    x = 1\nexcept* ValueError:\n    pass\n");
    assert!(reports.is_empty(), "unexpected findings: {:?}", reports);
}

#[test]
fn test_python2_syntax_is_a_syntax_error() {
    let cases = [
        ("print \"hello\"\n", 1),
        ("exec \"x=1\"\n", 1),
        ("try:\n    x = 1\nexcept ValueError, e:\n    pass\n", 3),
    ];

    for (source, line) in cases {
        let reports = check(source);
        assert_eq!(reports.len(), 1, "{:?} -> {:?}", source, reports);
        assert_eq!(reports[0].severity, Severity::High);
        assert_eq!(reports[0].line_number, line);
        assert_eq!(reports[0].description, "Syntax Error: invalid syntax");
    }
}

#[test]
fn test_python3_print_call_is_clean() {
    assert!(check("print(\"hello\")\n").is_empty());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_no_handlers_no_findings() {
    let snippets = [
        "",
        "x = 1\n",
        "def f(a, b):\n    return a / b\n",
        "class A:\n    def m(self):\n        pass\n",
        "try:\n    x = 1\nfinally:\n    cleanup()\n",
        "with open('f') as fh:\n    data = fh.read()\n",
    ];
    for snippet in snippets {
        assert!(check(snippet).is_empty(), "snippet {:?} should be clean", snippet);
    }
}

#[test]
fn test_one_finding_per_bare_clause() {
    let source = "\
try:
    a()
except:
    pass

def f():
    try:
        b()
    except:
        pass

class C:
    def m(self):
        try:
            c()
        except OSError:
            pass
        except:
            raise
";
    let reports = check(source);
    let lines: Vec<usize> = reports.iter().map(|r| r.line_number).collect();

    assert_eq!(lines, vec![3, 9, 18]);
    assert!(reports.iter().all(|r| r.severity == Severity::Medium));
}

#[test]
fn test_nested_try_blocks() {
    let source = "\
try:
    try:
        x = 1
    except:
        pass
except:
    pass
";
    let lines: Vec<usize> = check(source).iter().map(|r| r.line_number).collect();
    assert_eq!(lines, vec![4, 6]);
}

#[test]
fn test_syntax_error_suppresses_other_findings() {
    let source = "try:\n    x = 1\nexcept:\n    pass\n\nif True\n    y = 2\n";
    let reports = check(source);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::High);
    assert!(reports[0].line_number >= 1);
}

#[test]
fn test_checker_is_deterministic() {
    let source = std::fs::read_to_string(testdata_path().join("bare_except.py")).unwrap();
    let checker = StaticChecker::default();
    assert_eq!(checker.check(&source), checker.check(&source));
}

// =============================================================================
// Fixtures
// =============================================================================

#[test]
fn test_fixture_bare_except() {
    let reports = StaticChecker::default()
        .check_file(testdata_path().join("bare_except.py"))
        .expect("fixture should be readable");

    let lines: Vec<usize> = reports.iter().map(|r| r.line_number).collect();
    assert_eq!(lines, vec![14, 20]);
}

#[test]
fn test_fixture_clean() {
    let reports = StaticChecker::default()
        .check_file(testdata_path().join("clean.py"))
        .unwrap();
    assert!(reports.is_empty(), "unexpected findings: {:?}", reports);
}

#[test]
fn test_fixture_syntax_error() {
    let reports = StaticChecker::default()
        .check_file(testdata_path().join("syntax_error.py"))
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].severity, Severity::High);
    assert_eq!(reports[0].line_number, 5);
}

#[test]
fn test_missing_file_is_io_error() {
    let res = StaticChecker::default().check_file(testdata_path().join("does_not_exist.py"));
    assert!(res.is_err());
}

#[test]
fn test_project_directory_walk() {
    let root = testdata_path().join("project");
    let files = collect_python_files(&root).unwrap();

    let rel: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(rel, vec!["main.py", "pkg/__init__.py", "pkg/worker.py"]);

    let checker = StaticChecker::default();
    let flagged: Vec<(String, usize)> = files
        .iter()
        .zip(rel.iter())
        .flat_map(|(path, name)| {
            checker
                .check_file(path)
                .unwrap()
                .into_iter()
                .map(move |r| (name.clone(), r.line_number))
        })
        .collect();
    assert_eq!(flagged, vec![("pkg/worker.py".to_string(), 4)]);
}
