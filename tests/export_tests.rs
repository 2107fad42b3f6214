// Integration tests for project loading and documentation export

use sharpdoc::error::DocError;
use sharpdoc::export::{self, ExportOptions, RecordingSink};
use sharpdoc::parser::Element;
use sharpdoc::project::Project;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WIDGETS: &str = r#"#define EXTRA
namespace Demo
{
    /// <summary>Builds things.</summary>
    public class Widget
    {
        /// <summary>Makes widgets.</summary>
        /// <param name="count">How many</param>
        public void Make(int count) { }
#if EXTRA
        public int Extra;
#endif
    }
}
"#;

const GADGETS: &str = r#"namespace Demo
{
#if EXTRA
    public class Leaked { }
#endif
    public class Gadget : Widget { }
}
"#;

const BROKEN: &str = "namespace Broken\n{\n    class X { string s = \"oops; }\n}\n";

/// `<tmp>/Demo` holding three sources and a file that is not C#
fn sources() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let dir = tmp.path().join("Demo");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("a.cs"), WIDGETS).unwrap();
    fs::write(dir.join("b.cs"), GADGETS).unwrap();
    fs::write(dir.join("broken.cs"), BROKEN).unwrap();
    fs::write(dir.join("notes.txt"), "class NotCode {}").unwrap();
    (tmp, dir)
}

fn names(project: &Project, path: &[&str]) -> Vec<String> {
    let tree = project.tree();
    let node = if path.is_empty() {
        tree.root()
    } else {
        tree.find_path(path).expect("Path not found")
    };
    tree.children(node)
        .iter()
        .map(|&c| tree.info(c).unwrap().name.clone())
        .collect()
}

fn relative(files: &[PathBuf], base: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            f.strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_load_merges_files_into_one_tree() {
    let (_tmp, dir) = sources();
    let project = Project::load(&dir, "cs", "").expect("Loading failed");

    assert_eq!(project.tree().node(project.tree().root()).label(), "Demo");
    assert_eq!(project.files().len(), 3);
    assert_eq!(names(&project, &[]), vec!["Demo", "Broken"]);
    assert_eq!(names(&project, &["Demo"]), vec!["Widget", "Gadget"]);
    assert_eq!(
        names(&project, &["Demo", "Widget"]),
        vec!["Make(int count)", "Extra"]
    );
    assert_eq!(project.status_line(), "Code loaded with: ");
}

#[test]
fn test_defines_do_not_leak_between_files() {
    let (_tmp, dir) = sources();
    let project = Project::load(&dir, "cs", "").unwrap();
    assert!(project.tree().find_path(&["Demo", "Leaked"]).is_none());

    let seeded = Project::load(&dir, "cs", "EXTRA").unwrap();
    assert!(seeded.tree().find_path(&["Demo", "Leaked"]).is_some());
}

#[test]
fn test_parse_errors_are_recorded_per_file() {
    let (_tmp, dir) = sources();
    let project = Project::load(&dir, "cs", "").unwrap();

    assert_eq!(project.errors().len(), 1);
    match &project.errors()[0] {
        DocError::Parse { path, source } => {
            assert!(path.ends_with("broken.cs"));
            assert_eq!(source.location.line, 3);
        }
        other => panic!("Expected a parse error, got {:?}", other),
    }
    // The namespace was declared before the failure
    let broken = project.tree().find_path(&["Broken"]).unwrap();
    assert_eq!(project.tree().kind(broken), Some(Element::Namespace));
}

#[test]
fn test_reload_with_new_defines() {
    let (_tmp, dir) = sources();
    let mut project = Project::load(&dir, ".cs", "").unwrap();
    project.reload("EXTRA;TRACE").unwrap();

    assert_eq!(project.defines(), "EXTRA;TRACE");
    assert_eq!(project.status_line(), "Code loaded with: EXTRA;TRACE");
    assert_eq!(
        names(&project, &["Demo"]),
        vec!["Widget", "Leaked", "Gadget"]
    );
    assert_eq!(project.errors().len(), 1);
}

#[test]
fn test_byte_order_mark_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Bom");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("a.cs"),
        "\u{FEFF}using System;\nnamespace N { public class A {} }\n",
    )
    .unwrap();
    fs::write(
        dir.join("b.cs"),
        "\u{FEFF}#if DEBUG\nclass Hidden {}\n#endif\nclass B {}\n",
    )
    .unwrap();

    let project = Project::load(&dir, "cs", "").unwrap();
    assert!(project.errors().is_empty());
    assert_eq!(names(&project, &[]), vec!["N", "B"]);
    assert_eq!(names(&project, &["N"]), vec!["A"]);
}

#[test]
fn test_missing_directory() {
    let tmp = TempDir::new().unwrap();
    let result = Project::load(tmp.path().join("nope"), "cs", "");
    assert!(matches!(result, Err(DocError::MissingDirectory(_))));
}

#[test]
fn test_export_writes_pages() {
    let (tmp, dir) = sources();
    let mut project = Project::load(&dir, "cs", "").unwrap();
    let out = tmp.path().join("docs");

    let mut sink = RecordingSink::new();
    let report = export::export(
        project.tree_mut(),
        &out,
        &ExportOptions::default(),
        false,
        &mut sink,
    )
    .expect("Export failed");

    // root, Demo, Widget, Gadget, Broken; Broken.X is internal
    assert_eq!(report.pages, 5);
    assert_eq!(
        relative(&report.files, &out),
        vec![
            "index.html",
            "Demo.html",
            "Demo/Widget.html",
            "Demo/Gadget.html",
            "Broken.html",
        ]
    );
    assert_eq!(report.fillers, 0);

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("href=\"Demo.html\""));
    let demo = fs::read_to_string(out.join("Demo.html")).unwrap();
    assert!(demo.contains("href=\"Demo/Widget.html\""));
    assert!(demo.contains("Builds things."));

    let widget = fs::read_to_string(out.join("Demo/Widget.html")).unwrap();
    assert!(widget.contains("public void Make(int)"));
    assert!(widget.contains("Makes widgets."));
    assert!(widget.contains("How many"));

    let gadget = fs::read_to_string(out.join("Demo/Gadget.html")).unwrap();
    assert!(gadget.contains("Widget"));
}

#[test]
fn test_export_reports_progress() {
    let (tmp, dir) = sources();
    let mut project = Project::load(&dir, "cs", "").unwrap();

    let mut sink = RecordingSink::new();
    export::export(
        project.tree_mut(),
        &tmp.path().join("docs"),
        &ExportOptions::default(),
        false,
        &mut sink,
    )
    .unwrap();

    let statuses = sink.statuses();
    assert_eq!(statuses.first(), Some(&"Selecting nodes to export..."));
    assert!(statuses.contains(&"Preprocessing nodes to export..."));
    assert!(statuses.contains(&"Exporting Widget (60.00%)..."));
    assert_eq!(statuses.last(), Some(&"Finished!"));
    assert_eq!(sink.last_progress(), Some(100));
}

#[test]
fn test_export_refuses_non_empty_output() {
    let (tmp, dir) = sources();
    let mut project = Project::load(&dir, "cs", "").unwrap();
    let out = tmp.path().join("docs");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.txt"), "mine").unwrap();

    let options = ExportOptions::default();
    let mut sink = RecordingSink::new();
    let err = export::export(project.tree_mut(), &out, &options, false, &mut sink).unwrap_err();
    assert!(matches!(err, DocError::OutputNotEmpty(_)));
    assert!(!out.join("index.html").exists());

    export::export(project.tree_mut(), &out, &options, true, &mut sink).unwrap();
    assert!(out.join("index.html").exists());
    assert!(out.join("keep.txt").exists());
}

#[test]
fn test_export_with_fillers_and_private_members() {
    let (tmp, dir) = sources();
    let mut project = Project::load(&dir, "cs", "").unwrap();
    let out = tmp.path().join("docs");

    let options = ExportOptions {
        internal: true,
        private: true,
        php_fillers: true,
        extension: "htm".to_string(),
        ..ExportOptions::default()
    };
    let mut sink = RecordingSink::new();
    let report = export::export(project.tree_mut(), &out, &options, false, &mut sink).unwrap();

    assert_eq!(report.pages, 6);
    assert!(out.join("Broken/X.htm").exists());
    // docs/, docs/Demo, docs/Broken
    assert_eq!(report.fillers, 3);
    let filler = fs::read_to_string(out.join("Demo/index.php")).unwrap();
    assert!(filler.contains("../Demo.htm"));
    assert!(sink
        .statuses()
        .contains(&"Generating index.php fillers..."));
}

#[test]
fn test_outline_serializes_to_json() {
    let (_tmp, dir) = sources();
    let project = Project::load(&dir, "cs", "").unwrap();
    let tree = project.tree();

    let json = serde_json::to_value(tree.outline(tree.root())).unwrap();
    assert_eq!(json["label"], "Demo");
    let demo = &json["children"][0];
    assert_eq!(demo["label"], "Demo");
    assert_eq!(demo["children"][0]["label"], "Widget");
    assert_eq!(demo["children"][0]["children"][0]["label"], "Make(int)");
}
