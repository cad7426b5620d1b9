//! Integration tests for the file-level `run` entry point.

use std::fs;
use std::path::PathBuf;

use rowkey_core::{
    DERIVED_ID_LEN, IdError, Method, ProgressObserver, Role, RunOptions, UserIndex, derive, run,
    run_with,
};
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_semicolon_file_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "clients.csv",
        "SCHEDA NUMERO;CODICE CLIENTE;EMAIL\n100;ABC123;a@b.com\n",
    );
    let output = dir.path().join("clients_with_ids.csv");

    let result = run(&input, &output, Method::Combined).unwrap();

    assert_eq!(result.total_rows(), 1);
    assert_eq!(result.distinct_count(), 1);
    assert!(!result.has_duplicates());
    let written = fs::read_to_string(&output).unwrap();
    insta::assert_snapshot!(written, @r"
    SCHEDA NUMERO;CODICE CLIENTE;EMAIL;USER_ID
    100;ABC123;a@b.com;247E28F9B1D305B85E9173EC
    ");
}

#[test]
fn test_semicolon_file_with_decimal_commas() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("SCHEDA NUMERO;CODICE CLIENTE;IMPORTO\n");
    for i in 1..=9 {
        content.push_str(&format!("{i};C{i};10,50\n"));
    }
    let input = write_input(&dir, "importi.csv", &content);
    let output = dir.path().join("importi_with_ids.csv");

    let result = run(&input, &output, Method::Combined).unwrap();

    assert_eq!(result.total_rows(), 9);
    assert_eq!(result.distinct_count(), 9);
    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "SCHEDA NUMERO;CODICE CLIENTE;IMPORTO;USER_ID");
    assert_eq!(
        lines[1],
        format!("1;C1;10,50;{}", derive("1", "C1", Method::Combined))
    );
}

#[test]
fn test_unbounded_sample_size() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "clients.csv",
        "SCHEDA NUMERO;CODICE CLIENTE\n100;ABC123\n",
    );
    let output = dir.path().join("clients_with_ids.csv");
    let options = RunOptions::default().with_sample_size(usize::MAX);

    let result = run_with(&input, &output, &options, None).unwrap();

    assert_eq!(result.total_rows(), 1);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "SCHEDA NUMERO;CODICE CLIENTE;USER_ID\n100;ABC123;247E28F9B1D305B85E9173EC\n"
    );
}

#[test]
fn test_duplicate_rows_share_id() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "dupes.csv",
        "Scheda Numero,Codice Cliente,Mail\n100,ABC123,a@b.com\n200,XYZ,x@y.com\n100,ABC123,c@d.com\n",
    );
    let output = dir.path().join("out.csv");

    let result = run(&input, &output, Method::Combined).unwrap();

    assert_eq!(result.total_rows(), 3);
    assert_eq!(result.distinct_count(), 2);
    assert_eq!(result.duplicates().len(), 1);
    let duplicate = &result.duplicates()[0];
    assert_eq!(duplicate.row, 3);
    assert_eq!(duplicate.id.as_str(), "247E28F9B1D305B85E9173EC");
    assert_eq!(duplicate.record_number, "100");
    assert_eq!(duplicate.client_code, "ABC123");

    let written = fs::read_to_string(&output).unwrap();
    insta::assert_snapshot!(written, @r"
    Scheda Numero,Codice Cliente,Mail,USER_ID
    100,ABC123,a@b.com,247E28F9B1D305B85E9173EC
    200,XYZ,x@y.com,ACF00CF43792B09FEBF85AC8
    100,ABC123,c@d.com,247E28F9B1D305B85E9173EC
    ");
}

#[test]
fn test_missing_schema_creates_no_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "bad.csv", "FOO,BAR,BAZ\n1,2,3\n");
    let output = dir.path().join("bad_with_ids.csv");

    let err = run(&input, &output, Method::Combined).unwrap_err();

    match err {
        IdError::Schema { missing, headers } => {
            assert_eq!(missing, vec![Role::RecordNumber, Role::ClientCode]);
            assert_eq!(headers, vec!["FOO", "BAR", "BAZ"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_input_not_found() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.csv");
    let output = dir.path().join("out.csv");

    let err = run(&input, &output, Method::Combined).unwrap_err();

    assert!(matches!(err, IdError::InputNotFound { ref path, .. } if path == &input));
    assert!(!output.exists());
}

#[test]
fn test_output_must_differ_from_input() {
    let dir = TempDir::new().unwrap();
    let content = "SCHEDA NUMERO,CODICE CLIENTE\n1,A\n";
    let input = write_input(&dir, "same.csv", content);

    let err = run(&input, &input, Method::Combined).unwrap_err();

    assert!(matches!(err, IdError::OutputIsInput { .. }));
    assert_eq!(fs::read_to_string(&input).unwrap(), content);
}

#[test]
fn test_row_order_and_columns_preserved() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("ID\tSCHEDA NUMERO\tCODICE CLIENTE\tEMAIL\n");
    for i in 0..50 {
        content.push_str(&format!("{i}\t{}\tC{}\tuser{i}@example.com\n", 1000 + i, i % 7));
    }
    let input = write_input(&dir, "tabbed.tsv", &content);
    let output = dir.path().join("tabbed_with_ids.tsv");

    let result = run(&input, &output, Method::Combined).unwrap();
    assert_eq!(result.total_rows(), 50);
    assert_eq!(result.distinct_count(), 50);

    let written = fs::read_to_string(&output).unwrap();
    let input_lines: Vec<&str> = content.lines().collect();
    let output_lines: Vec<&str> = written.lines().collect();
    assert_eq!(input_lines.len(), output_lines.len());
    assert_eq!(output_lines[0], format!("{}\tUSER_ID", input_lines[0]));
    for (original, augmented) in input_lines.iter().zip(&output_lines).skip(1) {
        let (prefix, id) = augmented.rsplit_once('\t').unwrap();
        assert_eq!(prefix, *original);
        assert_eq!(id.len(), DERIVED_ID_LEN);
    }
}

#[test]
fn test_distinct_count_matches_duplicates() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("SCHEDA NUMERO,CODICE CLIENTE\n");
    for i in 0..30 {
        content.push_str(&format!("{},C{}\n", i % 10, i % 3));
    }
    let input = write_input(&dir, "collisions.csv", &content);
    let output = dir.path().join("collisions_with_ids.csv");

    for method in Method::ALL {
        let result = run(&input, &output, method).unwrap();
        assert_eq!(result.total_rows(), 30);
        assert_eq!(
            result.distinct_count() + result.duplicates().len(),
            result.total_rows(),
            "{method}"
        );
    }
    let scheda = run(&input, &output, Method::RecordNumberOnly).unwrap();
    assert_eq!(scheda.distinct_count(), 10);
    let cliente = run(&input, &output, Method::ClientCodeOnly).unwrap();
    assert_eq!(cliente.distinct_count(), 3);
}

#[test]
fn test_progress_observer_receives_milestones() {
    struct Recorder(Vec<usize>);

    impl ProgressObserver for Recorder {
        fn on_progress(&mut self, rows_processed: usize) {
            self.0.push(rows_processed);
        }
    }

    let dir = TempDir::new().unwrap();
    let mut content = String::from("SCHEDA NUMERO,CODICE CLIENTE\n");
    for i in 0..250 {
        content.push_str(&format!("{i},C{i}\n"));
    }
    let input = write_input(&dir, "large.csv", &content);
    let output = dir.path().join("large_with_ids.csv");

    let mut recorder = Recorder(Vec::new());
    let result = run_with(&input, &output, &RunOptions::default(), Some(&mut recorder)).unwrap();

    assert_eq!(result.total_rows(), 250);
    assert_eq!(recorder.0, vec![100, 200]);
}

#[test]
fn test_generated_file_feeds_lookup() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "clients.csv",
        "SCHEDA NUMERO;CODICE CLIENTE;EMAIL\n100;ABC123;a@b.com\n200;XYZ;x@y.com\n",
    );
    let output = dir.path().join("clients_with_ids.csv");
    run(&input, &output, Method::Combined).unwrap();

    let index = UserIndex::load(&output).unwrap();
    assert_eq!(index.len(), 2);
    let user = index.get("ACF00CF43792B09FEBF85AC8").unwrap();
    assert_eq!(user.record_number, "200");
    assert_eq!(user.client_code, "XYZ");
    assert_eq!(user.email.as_deref(), Some("x@y.com"));
}
