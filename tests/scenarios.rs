//! End-to-end scenarios, once on hand-built declarations and once on Rust
//! source through the `syn` declaration source.

use hotgraph::application::{analyze, AnalyzeOptions};
use hotgraph::domain::callgraph::MethodCall;
use hotgraph::domain::classifier::{over_threshold, top_ten_percent};
use hotgraph::domain::declarations::{
    CompilationUnit, Invocation, MethodDeclaration, ProjectDeclarations, TypeDeclaration,
};
use hotgraph::infrastructure::project_loader::SourceFile;
use hotgraph::infrastructure::syn_source::SynDeclarationSource;
use hotgraph::ports::DeclarationSource;
use indexmap::IndexMap;

fn rust_project(files: &[(&str, &str)]) -> ProjectDeclarations {
    let sources: Vec<SourceFile> = files
        .iter()
        .map(|(path, code)| SourceFile::new("scenario", format!("scenario/src/{path}"), *code))
        .collect();
    SynDeclarationSource.declarations(&sources)
}

#[test]
fn scenario_a_self_call_is_internal() {
    let decls = ProjectDeclarations::from_units([CompilationUnit::new("Foo.java").with_type(
        TypeDeclaration::class("Foo")
            .with_method(MethodDeclaration::new("bar").calls(Invocation::new("baz")))
            .with_method(MethodDeclaration::new("baz")),
    )]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(
        report.call_graph.calls("Foo", "bar").unwrap(),
        &[MethodCall::new("baz", "Foo")]
    );
    assert!(report.coupling.is_empty());
    assert_eq!(report.coupling.total_inter_class_calls, 0);
}

#[test]
fn scenario_a_from_rust_source() {
    let decls = rust_project(&[(
        "foo.rs",
        r#"
        pub struct Foo;
        impl Foo {
            pub fn bar(&self) { baz(); }
        }
        fn baz() {}
        "#,
    )]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(
        report.call_graph.calls("Foo", "bar").unwrap(),
        &[MethodCall::new("baz", "Foo")]
    );
    assert!(report.coupling.is_empty());
}

#[test]
fn scenario_b_resolved_receiver_couples_fully() {
    let decls = ProjectDeclarations::from_units([
        CompilationUnit::new("A.java").with_type(
            TypeDeclaration::class("A")
                .with_field("b", Some("B"))
                .with_method(MethodDeclaration::new("m1").calls(Invocation::new("helper").on("B"))),
        ),
        CompilationUnit::new("B.java")
            .with_type(TypeDeclaration::class("B").with_method(MethodDeclaration::new("helper"))),
    ]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(
        report.call_graph.calls("A", "m1").unwrap(),
        &[MethodCall::new("helper", "B")]
    );
    assert_eq!(report.coupling.between("A", "B"), 1.0);
    assert_eq!(report.coupling.between("B", "A"), 0.0);
}

#[test]
fn scenario_b_across_rust_files() {
    let decls = rust_project(&[
        (
            "a.rs",
            r#"
            use crate::b::B;
            pub struct A { b: B }
            impl A {
                pub fn m1(&self) { self.b.helper(); }
            }
            "#,
        ),
        (
            "b.rs",
            r#"
            pub struct B;
            impl B {
                pub fn helper(&self) {}
            }
            "#,
        ),
    ]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(
        report.call_graph.calls("A", "m1").unwrap(),
        &[MethodCall::new("helper", "B")]
    );
    assert_eq!(report.coupling.between("A", "B"), 1.0);
    assert_eq!(report.stats.total_packages, 3);
}

#[test]
fn scenario_c_and_d_rankings() {
    let counts: IndexMap<String, usize> = [("X", 1), ("Y", 9), ("Z", 0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    assert_eq!(top_ten_percent(&counts), vec!["Y"]);
    assert_eq!(over_threshold(&counts, 2), vec!["Y"]);
}

#[test]
fn scenario_c_and_d_through_analysis() {
    let class = |name: &str, methods: usize| {
        (0..methods).fold(TypeDeclaration::class(name), |decl, i| {
            decl.with_method(MethodDeclaration::new(format!("m{i}")))
        })
    };
    let decls = ProjectDeclarations::from_units([CompilationUnit::new("All.java")
        .with_type(class("X", 1))
        .with_type(class("Y", 9))
        .with_type(class("Z", 0))]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(report.top_by_methods, vec!["Y"]);
    assert_eq!(report.over_threshold, vec!["Y"]);
}

#[test]
fn impl_blocks_in_other_files_merge_into_one_class() {
    let decls = rust_project(&[
        ("model.rs", "pub struct Car { wheels: u8, doors: u8 }"),
        (
            "model_impl.rs",
            r#"
            impl Car {
                pub fn drive(&self) {}
                pub fn park(&self) {}
            }
            "#,
        ),
    ]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(report.call_graph.class_count(), 1);
    assert_eq!(report.method_counts["Car"], 2);
    assert_eq!(report.attribute_counts["Car"], 2);
    assert_eq!(report.stats.total_classes, report.call_graph.class_count());
    assert_eq!(report.stats.total_classes, report.method_counts.len());
    assert!((report.stats.avg_methods_per_class - 2.0).abs() < 1e-12);
    assert!((report.stats.avg_attributes_per_class - 2.0).abs() < 1e-12);
}

#[test]
fn unparsable_rust_file_is_skipped() {
    let decls = rust_project(&[("ok.rs", "pub struct Ok;"), ("broken.rs", "pub struct {")]);
    let report = analyze(&decls, &AnalyzeOptions::new(2));

    assert_eq!(report.call_graph.class_count(), 1);
    assert_eq!(report.skipped_units.len(), 1);
    assert!(report.skipped_units[0].unit.ends_with("broken.rs"));
    assert_eq!(report.stats.skipped_units, 1);
}
