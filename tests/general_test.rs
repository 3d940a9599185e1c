use apispec_core::analyze;
use miette::Report;
use std::fs;

#[test]
fn test_all_ok_documents() {
    let ok_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/ok");
    let entries = fs::read_dir(ok_dir).expect("Failed to read tests/ok directory");

    let mut checked = 0;
    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            println!("Validating file: {:?}", path);
            let source =
                fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read file: {:?}", path));

            if let Err(err) = analyze(&source, &path.to_string_lossy()) {
                panic!("Failed to validate {:?}. Error: {:?}", path, Report::new(err));
            }
            checked += 1;
        }
    }
    assert!(checked > 0, "no fixtures found in tests/ok");
}
