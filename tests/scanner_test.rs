//! Integration tests for scanning whole source documents.

use std::fs;

use snp::{DiagnosticKind, Error, ScanOptions, ScannedDocument, Scanner, Target};

fn scan(source: &str) -> ScannedDocument {
    Scanner::new(ScanOptions::new().with_reference_year(2016))
        .scan(source)
        .unwrap()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Every `\begin{env}` in `body` has a matching `\end{env}`.
fn assert_balanced(body: &str) {
    for env in ["itemize", "enumerate", "description", "tabular", "center", "quote"] {
        let begin = format!("\\begin{{{}}}", env);
        let end = format!("\\end{{{}}}", env);
        assert_eq!(count(body, &begin), count(body, &end), "unbalanced {} in:\n{}", env, body);
    }
}

const LECTURE: &str = "\
T Binary Trees
X CS201
N Data Structures
Z March 12, 2016

s Definitions
A tree is a set of *nodes*.
- each node has a parent
    - except the root
- leaves have no children

d
Root
: the node with no parent
Leaf
: a node with no children
e

# Traversals [fragile]
n
- pre-order
- in-order
e

q Knuth
Trees are everywhere.

Name  Height
----  ------
a     1
b     2

[sob]
Only on the slides
[soe]
[no] Extra reading for the notes.
";

#[test]
fn test_lecture_scans_cleanly() {
    let doc = scan(LECTURE);
    assert_eq!(doc.metadata.title_tex(), "Binary Trees");
    assert_eq!(doc.metadata.course_code_tex(), "CS201");
    assert_eq!(doc.slide_count, 2);
    assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
    assert!(doc.pure_markdown);
}

#[test]
fn test_lecture_environments_balanced() {
    let doc = scan(LECTURE);
    assert_balanced(&doc.body(Target::Notes));
    assert_balanced(&doc.body(Target::Slides));
}

#[test]
fn test_lecture_scopes() {
    let doc = scan(LECTURE);
    let notes = doc.body(Target::Notes);
    let slides = doc.body(Target::Slides);

    assert!(slides.contains("Only on the slides\n"));
    assert!(!notes.contains("Only on the slides"));
    assert!(notes.contains("Extra reading for the notes.\n"));
    assert!(!slides.contains("Extra reading"));
    assert!(doc.buffers.portable.iter().any(|l| l == "Only on the slides"));
    assert!(!doc.buffers.portable.iter().any(|l| l.contains("Extra reading")));
}

#[test]
fn test_lecture_sections() {
    let doc = scan(LECTURE);
    let notes = doc.body(Target::Notes);
    let slides = doc.body(Target::Slides);
    assert!(notes.contains("\\section{Definitions}"));
    assert!(notes.contains("\\section{Traversals}"));
    assert!(slides.contains("\\begin{frame}\\frametitle{Definitions}\n"));
    assert!(slides.contains("\\begin{frame}[fragile]\\frametitle{Traversals}\n"));
    assert!(doc.buffers.portable.iter().any(|l| l == "# Traversals"));
}

#[test]
fn test_simple_table_round_trip() {
    let doc = scan("A   B   C\n---  ---  ---\n1   2   3\n");
    let notes = doc.body(Target::Notes);

    assert!(notes.contains("\\begin{tabular}[t]{ l l l }\n\\toprule\n"));
    assert!(notes.contains("A & B & C \\\\\n\\midrule\n"));
    assert!(notes.contains("1 & 2 & 3 \\\\\n"));
    assert!(!notes.contains("---"));
    assert!(!doc.body(Target::Slides).contains("---"));
    // the header is emitted once, as the table header
    assert_eq!(count(&notes, "A   B   C"), 0);
    assert_balanced(&notes);
}

#[test]
fn test_pipe_table() {
    let doc = scan("| Name | Age |\n|:-----|----:|\n| Ann  | 31  |\n");
    let notes = doc.body(Target::Notes);
    assert!(notes.contains("\\begin{tabular}[t]{ l r }"));
    assert!(notes.contains("Name & Age \\\\\n\\midrule\n"));
    assert!(notes.contains("Ann & 31 \\\\\n"));
    assert!(!notes.contains("|:-"));
    assert_balanced(&notes);
}

#[test]
fn test_block_table() {
    let doc = scan(
        "+-------+-------+\n\
         | Key   | Value |\n\
         +=======+=======+\n\
         | alpha | 1     |\n\
         +-------+-------+\n\
         After the table.\n",
    );
    let notes = doc.body(Target::Notes);

    assert_eq!(count(&notes, "\\begin{tabular}"), 1);
    assert!(notes.contains("Key & Value \\\\\n\\midrule\n"));
    assert!(notes.contains("alpha & 1 \\\\\n"));
    // the header row is read once, as the header
    assert_eq!(count(&notes, "Key"), 1);
    assert!(!notes.contains("+="));
    assert!(!notes.contains("+-"));

    let end_tabular = notes.find("\\end{tabular} % end of block table").unwrap();
    let end_center = notes.find("\\end{center} % end of block table").unwrap();
    let after = notes.find("After the table.\n").unwrap();
    assert!(end_tabular < end_center && end_center < after);
    assert!(!notes.contains("After the table. \\\\"));
    assert_balanced(&notes);
}

#[test]
fn test_indented_item_inside_table_is_a_list_item() {
    let doc = scan("A   B\n---  ---\n1   2\n    - item\n\n");
    let notes = doc.body(Target::Notes);

    assert!(notes.contains("1 & 2 \\\\\n"));
    assert!(notes.contains("\\item item\n"));
    assert!(!notes.contains("- item"));
    assert_balanced(&notes);
}

#[test]
fn test_citation_extraction() {
    let doc = scan("[@knuth84]\nAs @smith2001 notes, see also @knuth84.\nMail me at ada@example.org\n");
    assert!(doc.has_citations);
    assert_eq!(doc.citation_keys, vec!["knuth84", "smith2001"]);
    assert_eq!(doc.citation_list(), "knuth84,smith2001");

    let notes = doc.body(Target::Notes);
    assert!(notes.contains("\\citep{knuth84}"));
    assert!(notes.contains("As \\citet{smith2001} notes"));
    assert!(notes.contains("ada@example.org"));
}

#[test]
fn test_graphic_with_split_scales() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("diagram.png"), vec![0u8; 1234]).unwrap();

    let doc = Scanner::new(ScanOptions::new().with_graphics_dir(dir.path()))
        .scan("g diagram[50,75]\n")
        .unwrap();

    assert_eq!(doc.graphics.size_of("diagram.png"), Some(1234));
    assert_eq!(doc.graphics.total_bytes(), 1234);
    assert!(doc.body(Target::Notes).contains("\\includegraphics[scale=50]{diagram}"));
    assert!(doc.body(Target::Slides).contains("\\includegraphics[scale=75]{diagram}"));
    assert_eq!(doc.buffers.portable, vec!["![](diagram.png)"]);
}

#[test]
fn test_missing_graphic_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scanner::new(ScanOptions::new().with_graphics_dir(dir.path()))
        .scan("Intro\ng nowhere\n")
        .unwrap_err();
    assert!(matches!(err, Error::GraphicNotFound(name) if name == "nowhere"));
}

#[test]
fn test_indent_maps_to_depth() {
    let doc = scan("- a\n    - b\n          - c\n");
    let notes = doc.body(Target::Notes);
    assert_eq!(count(&notes, "\\begin{itemize}"), 3);
    assert_eq!(count(&notes, "\\end{itemize}"), 3);
    assert!(doc.diagnostics.is_empty());
}

#[test]
fn test_too_deep_item_is_clamped() {
    let doc = scan("- a\n    - b\n          - c\n              - d\n");
    let notes = doc.body(Target::Notes);
    assert_eq!(doc.diagnostics_of(DiagnosticKind::ListTooDeep).count(), 1);
    assert_eq!(count(&notes, "\\begin{itemize}"), 3);
    assert!(notes.contains("\\item d"));
    assert_balanced(&notes);
}

#[test]
fn test_unclosed_environments_auto_close() {
    let doc = scan("q\nquoted\nn\n- one\n");
    let notes = doc.body(Target::Notes);
    assert_balanced(&notes);
    assert!(notes.contains("\\end{enumerate} % auto-closed at end of document"));
    assert!(notes.contains("\\end{quote} % auto-closed at end of document"));
}

#[test]
fn test_explicit_close_of_nothing_is_reported() {
    let doc = scan("text\n\ne\ne\n");
    assert_eq!(doc.diagnostics_of(DiagnosticKind::EmptyStack).count(), 2);
    assert_eq!(doc.body(Target::Notes), "text\n");
}

#[test]
fn test_verbatim_region_keeps_ampersands() {
    let doc = scan("[bv]\nx &= y \\\\\n[ev]\nR&D\n");
    let notes = doc.body(Target::Notes);
    assert!(notes.contains("x &= y \\\\\n"));
    assert!(notes.contains("R\\&D\n"));
}

#[test]
fn test_unicode_is_normalized() {
    let decomposed = "Cafe\u{301}\n";
    let doc = scan(decomposed);
    assert_eq!(doc.body(Target::Notes), "Caf\u{e9}\n");
}

#[test]
fn test_year_check_uses_reference_year() {
    let err = Scanner::new(ScanOptions::new().with_reference_year(2020))
        .scan("T Intro\nZ Monday, March 14, 2016\n")
        .unwrap_err();
    assert!(matches!(err, Error::YearMismatch { actual: 2020, .. }));
}
