//! Literal end-to-end scenarios, run against the compiled binary.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use serde_json::Value;

fn run_scenario(fixture: &str) -> Value {
    let temp = TempDir::new().unwrap();
    let output = temp.child("result.json");

    let fixture_path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), fixture);

    Command::cargo_bin("genetic-nest")
        .unwrap()
        .arg("1") // fixed seed for reproducibility
        .arg("--input")
        .arg(&fixture_path)
        .arg("--output")
        .arg(output.path())
        .arg("--population-size")
        .arg("12")
        .arg("--generations")
        .arg("5")
        .arg("--elite-size")
        .arg("2")
        .arg("--tournament-size")
        .arg("3")
        .assert()
        .success();

    let contents = std::fs::read_to_string(output.path()).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn one_square_on_one_board_at_one_percent_efficiency() {
    let doc = run_scenario("one_square.json");
    assert_eq!(doc["board_count"], 1);
    let boards = doc["boards"].as_array().unwrap();
    assert_eq!(boards.len(), 1);
    let pieces = boards[0]["pieces"].as_array().unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0]["position_x"], 0.0);
    assert_eq!(pieces[0]["position_y"], 0.0);
    assert!((doc["total_efficiency"].as_f64().unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn four_squares_fill_one_board_completely() {
    let doc = run_scenario("four_squares.json");
    assert_eq!(doc["board_count"], 1);
    let boards = doc["boards"].as_array().unwrap();
    let pieces = boards[0]["pieces"].as_array().unwrap();
    assert_eq!(pieces.len(), 4);
    assert!((doc["total_efficiency"].as_f64().unwrap() - 100.0).abs() < 1e-6);
}

#[test]
fn five_squares_spill_onto_a_second_board() {
    let doc = run_scenario("five_squares.json");
    assert_eq!(doc["board_count"], 2);
    let total_pieces: usize = doc["boards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["pieces"].as_array().unwrap().len())
        .sum();
    assert_eq!(total_pieces, 5);
    assert!((doc["total_efficiency"].as_f64().unwrap() - 62.5).abs() < 1e-6);
}

#[test]
fn two_large_squares_cannot_share_a_board_under_clearance() {
    let doc = run_scenario("two_clearance_squares.json");
    assert_eq!(doc["board_count"], 2);
}

#[test]
fn long_rectangle_is_rotated_to_fit() {
    let doc = run_scenario("long_rectangle.json");
    assert_eq!(doc["board_count"], 1);
    let boards = doc["boards"].as_array().unwrap();
    let pieces = boards[0]["pieces"].as_array().unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0]["angle"], 90);
    assert!((doc["total_efficiency"].as_f64().unwrap() - 10.0).abs() < 1e-6);
}
