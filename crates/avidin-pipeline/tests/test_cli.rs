use assert_cmd::Command;
use avidin_test_data::TestFile;

#[test]
fn train_help_lists_the_flags() {
    let mut cmd = Command::cargo_bin("avidin-pipeline").unwrap();
    cmd.arg("train").arg("--help");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("--data"));
    assert!(stdout.contains("--featurizer"));
    assert!(stdout.contains("--trees"));
}

#[test]
fn train_requires_a_data_path() {
    let mut cmd = Command::cargo_bin("avidin-pipeline").unwrap();
    cmd.arg("train");
    cmd.assert().failure();
}

#[test]
fn offline_training_run_prints_metrics() {
    let (csvfile, _tmp) = TestFile::bindingdb_01().create_temp().unwrap();
    let mut cmd = Command::cargo_bin("avidin-pipeline").unwrap();

    cmd.arg("train")
        .arg("--data")
        .arg(csvfile)
        .arg("--featurizer")
        .arg("hash")
        .arg("--trees")
        .arg("25")
        .arg("--seed")
        .arg("7");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("Loaded 10 usable binding records"));
    assert!(stdout.contains("MSE"));
    assert!(stdout.contains("MAE"));
    assert!(stdout.contains("R2"));
}

#[test]
fn missing_affinity_column_fails() {
    let (csvfile, _tmp) = TestFile::bindingdb_missing_ki().create_temp().unwrap();
    let mut cmd = Command::cargo_bin("avidin-pipeline").unwrap();

    cmd.arg("train")
        .arg("--data")
        .arg(csvfile)
        .arg("--featurizer")
        .arg("hash");

    cmd.assert().failure();
}

#[test]
#[ignore = "downloads ONNX checkpoints from the HuggingFace hub"]
fn hub_training_run_prints_metrics() {
    let (csvfile, _tmp) = TestFile::bindingdb_01().create_temp().unwrap();
    let mut cmd = Command::cargo_bin("avidin-pipeline").unwrap();

    cmd.arg("train")
        .arg("--data")
        .arg(csvfile)
        .arg("--trees")
        .arg("10");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("MSE"));
}
