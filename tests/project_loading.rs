use std::fs;

use hotgraph::application::{AnalyzeOptions, AnalyzeUsecase};
use hotgraph::infrastructure::config::OutputFormat;
use hotgraph::infrastructure::project_loader::ProjectLoader;
use hotgraph::infrastructure::ProjectSource;
use hotgraph::ports::exporter_for;
use tempfile::tempdir;

#[test]
fn folder_with_rust_and_dumps_is_analyzed_and_exported() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("shop");
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("dumps")).unwrap();

    fs::write(
        root.join("src/cart.rs"),
        r#"
        pub struct Cart { items: Vec<Item> }
        impl Cart {
            pub fn total(&self) -> u32 {
                let mut sum = 0;
                for item in &self.items {
                    sum += item.price();
                }
                sum
            }
        }
        "#,
    )
    .unwrap();
    fs::write(
        root.join("src/item.rs"),
        "pub struct Item { price: u32 }\nimpl Item {\n    pub fn price(&self) -> u32 { self.price }\n}\n",
    )
    .unwrap();
    fs::write(
        root.join("dumps/legacy.json"),
        r#"{"units": [
            {"name": "Billing.java", "package": "legacy.billing", "types": [
                {"name": "Billing", "methods": [
                    {"name": "charge", "invocations": [{"callee_name": "total", "receiver_type": "Cart"}]}
                ]}
            ]},
            {"name": "Broken.java", "error": "syntax error"}
        ]}"#,
    )
    .unwrap();

    let sources = ProjectLoader::default().load_folder(&root).unwrap();
    assert_eq!(sources.len(), 3);

    let exporter = exporter_for(OutputFormat::Dot);
    let usecase = AnalyzeUsecase {
        source: &ProjectSource,
        exporter: exporter.as_ref(),
    };
    let out = dir.path().join("graph.dot");
    let report = usecase
        .run(&sources, &AnalyzeOptions::new(0), &out.display().to_string())
        .unwrap();

    // Dumps sort before src/, so Billing is seen first.
    let classes: Vec<&String> = report.call_graph.class_names().collect();
    assert_eq!(classes, ["Billing", "Cart", "Item"]);
    assert_eq!(report.call_graph.calls("Cart", "total").unwrap()[0].receiver_type, "Item");
    assert_eq!(report.skipped_units.len(), 1);
    assert_eq!(report.skipped_units[0].unit, "Broken.java");

    // Billing -> Cart and Cart -> Item: one call each.
    assert_eq!(report.coupling.total_inter_class_calls, 2);
    assert_eq!(report.coupling.between("Billing", "Cart"), 0.5);
    assert_eq!(report.coupling.between("Cart", "Item"), 0.5);

    let dot = fs::read_to_string(&out).unwrap();
    assert!(dot.contains("\"Cart.total\" -> \"Item.price\";"));
    assert!(dot.contains("\"Billing.charge\" -> \"Cart.total\";"));
}

#[test]
fn export_to_missing_directory_fails_with_path() {
    let dir = tempdir().unwrap();
    let exporter = exporter_for(OutputFormat::Text);
    let usecase = AnalyzeUsecase {
        source: &ProjectSource,
        exporter: exporter.as_ref(),
    };
    let out = dir.path().join("missing").join("report.txt");

    let err = usecase
        .run(&[], &AnalyzeOptions::new(2), &out.display().to_string())
        .unwrap_err();
    assert!(err.to_string().contains("report.txt"));
}

#[test]
fn latin1_file_is_analyzed_next_to_valid_one() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("proj").join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("good.rs"), "pub struct Good;\nimpl Good { fn go(&self) {} }\n").unwrap();
    fs::write(src.join("latin1.rs"), b"// caf\xe9\npub struct Latin { a: u8 }\n").unwrap();

    let sources = ProjectLoader::default()
        .load_folder(&dir.path().join("proj"))
        .unwrap();
    let exporter = exporter_for(OutputFormat::Json);
    let usecase = AnalyzeUsecase {
        source: &ProjectSource,
        exporter: exporter.as_ref(),
    };
    let report = usecase.analyze(&sources, &AnalyzeOptions::new(2));

    let classes: Vec<&String> = report.call_graph.class_names().collect();
    assert_eq!(classes, ["Good", "Latin"]);
    assert!(report.skipped_units.is_empty());
}
