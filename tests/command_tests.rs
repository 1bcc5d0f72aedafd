use calltree_studio::commands::{
    execute_generate, execute_verify, print_trace_file, GenerateArgs, VerifyArgs,
};
use calltree_studio::output::{read_binary_file, write_binary_file, write_text_file};
use calltree_studio::tree::CallTree;
use calltree_studio::utils::error::VerifyError;
use calltree_studio::workload::{DemoMethod, OWNER_TYPE};
use std::path::Path;
use tempfile::TempDir;

fn generate_into(dir: &Path, apps: usize) -> (GenerateArgs, Vec<CallTree>) {
    let args = GenerateArgs {
        text_path: dir.join("data.txt"),
        binary_path: dir.join("data.bin"),
        apps,
        workers: 3,
        seed: Some(2017),
        print_trees: false,
    };
    let trees = execute_generate(args.clone()).unwrap();
    (args, trees)
}

fn verify_args(generate: &GenerateArgs) -> VerifyArgs {
    VerifyArgs {
        text_path: generate.text_path.clone(),
        binary_path: generate.binary_path.clone(),
        ..Default::default()
    }
}

#[test]
fn test_generate_writes_both_files() {
    let dir = TempDir::new().unwrap();
    let (args, trees) = generate_into(dir.path(), 5);

    assert_eq!(trees.len(), 5);
    assert!(args.text_path.exists());
    assert!(args.binary_path.exists());
    assert_eq!(read_binary_file(&args.binary_path).unwrap(), trees);

    let text = std::fs::read_to_string(&args.text_path).unwrap();
    assert_eq!(text.matches("entry_point\n").count(), 5);
    // every run starts at abc
    let first_call = format!("entry_point\n-{}.{}(String var0 = ", OWNER_TYPE, DemoMethod::Abc.name());
    assert!(text.starts_with(&first_call));
}

#[test]
fn test_generate_then_verify_passes() {
    let dir = TempDir::new().unwrap();
    let (args, _) = generate_into(dir.path(), 5);

    let report = execute_verify(&verify_args(&args)).unwrap();

    assert!(report.passed);
    assert_eq!(report.text_trees, 5);
    assert_eq!(report.binary_trees, 5);
    assert_eq!(report.verdict(), "well done, everything is fine");
}

#[test]
fn test_verify_detects_a_single_difference() {
    let dir = TempDir::new().unwrap();
    let (args, mut trees) = generate_into(dir.path(), 3);

    // replace the last binary tree with a different one
    trees[2] = CallTree::new();
    write_binary_file(&trees, &args.binary_path).unwrap();

    let report = execute_verify(&verify_args(&args)).unwrap();
    assert!(!report.passed);
    assert_eq!(report.mismatched, vec![2]);
    assert!(matches!(
        report.ensure_passed(),
        Err(VerifyError::TreesDiffer(_))
    ));
}

#[test]
fn test_verify_count_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (args, trees) = generate_into(dir.path(), 3);
    write_binary_file(&trees[..2], &args.binary_path).unwrap();

    let err = execute_verify(&verify_args(&args)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerifyError>(),
        Some(VerifyError::CountMismatch { text: 3, binary: 2 })
    ));
}

#[test]
fn test_verify_rejects_unknown_symbols_unless_accept_all() {
    let dir = TempDir::new().unwrap();
    let text_path = dir.path().join("foreign.txt");
    let binary_path = dir.path().join("foreign.bin");

    let mut tree = CallTree::new();
    drop(tree.step_in(
        calltree_studio::tree::CallSite::new("other.Type", "go", ["int"]),
        [5],
    ));
    write_text_file([&tree], &text_path).unwrap();
    write_binary_file([&tree], &binary_path).unwrap();

    let mut args = VerifyArgs {
        text_path,
        binary_path,
        ..Default::default()
    };
    let err = execute_verify(&args).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VerifyError>(),
        Some(VerifyError::UndecodableText(1))
    ));

    args.accept_all = true;
    assert!(execute_verify(&args).unwrap().passed);
}

#[test]
fn test_verify_missing_binary_file() {
    let dir = TempDir::new().unwrap();
    let (mut args, _) = generate_into(dir.path(), 1);
    args.binary_path = dir.path().join("absent.bin");

    assert!(execute_verify(&verify_args(&args)).is_err());
}

#[test]
fn test_print_trace_file_counts() {
    let dir = TempDir::new().unwrap();
    let (args, _) = generate_into(dir.path(), 2);

    let (printed, rejected) = print_trace_file(&args.text_path, false).unwrap();
    assert_eq!((printed, rejected), (2, 0));

    let garbled = dir.path().join("garbled.txt");
    std::fs::write(&garbled, "entry_point\n-Nope(\n\nentry_point\n\n").unwrap();
    let (printed, rejected) = print_trace_file(&garbled, false).unwrap();
    assert_eq!((printed, rejected), (1, 1));
}

#[test]
fn test_report_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let (args, _) = generate_into(dir.path(), 1);
    let report = execute_verify(&verify_args(&args)).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["text_trees"], 1);
    assert!(json["verified_at"].is_string());
}
