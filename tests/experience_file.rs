use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use approx::assert_abs_diff_eq;
use ndarray::Axis;

use mdpstats::{derive_model, ExperienceError, ExperienceTable};


fn sample_table() -> ExperienceTable {
    let mut table = ExperienceTable::new(4, 2);
    let samples = [
        (0, 1, 0, 1.0),
        (0, 1, 0, 3.0),
        (0, 2, 0, -2.0),
        (1, 3, 1, 10.0),
        (3, 3, 1, 0.5),
        (3, 0, 0, 0.0),
    ];
    for (s, s1, a, r) in samples {
        table.accumulate(s, s1, a, r);
    }
    table
}

#[test]
fn saved_table_derives_same_model() {
    // Arrange
    let table = sample_table();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.txt");
    table.write_to(BufWriter::new(File::create(&path).unwrap())).unwrap();
    // Act
    let mut loaded = ExperienceTable::new(4, 2);
    loaded.read_from(BufReader::new(File::open(&path).unwrap())).unwrap();
    // Assert
    assert_eq!(loaded.visits(), table.visits());
    assert_eq!(loaded.reward_sums(), table.reward_sums());
    assert_eq!(derive_model(&loaded), derive_model(&table));
}

#[test]
fn derived_model_is_well_formed() {
    // Act
    let model = sample_table().derive_model();
    // Assert
    for total in model.transitions().sum_axis(Axis(1)).iter() {
        assert_abs_diff_eq!(*total, 1.0, epsilon = 1e-9);
    }
    let p = model.transitions();
    let r = model.rewards();
    assert_abs_diff_eq!(p[[0, 1, 0]], 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(p[[0, 2, 0]], 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r[[0, 1, 0]], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(r[[0, 2, 0]], -2.0, epsilon = 1e-12);
    // State 2 was never left.
    assert_eq!(p[[2, 2, 0]], 1.0);
    assert_eq!(p[[2, 2, 1]], 1.0);
}

#[test]
fn truncated_file_leaves_empty_table() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.txt");
    let text = sample_table().to_string();
    let cut = &text[..text.len() / 2];
    File::create(&path).unwrap().write_all(cut.as_bytes()).unwrap();
    let mut table = sample_table();
    // Act
    let result = table.read_from(File::open(&path).unwrap());
    // Assert
    assert!(result.is_err());
    assert_eq!(table, ExperienceTable::new(4, 2));
}

#[test]
fn table_with_wrong_dimensions_is_rejected() {
    // Arrange
    let text = sample_table().to_string();
    let mut bigger = ExperienceTable::new(5, 2);
    // Act
    let result = bigger.read_from(text.as_bytes());
    // Assert
    assert!(matches!(result, Err(ExperienceError::Truncated { expected: 100, found: 64 })));
    assert!(bigger.visits().iter().all(|&v| v == 0));
}

#[test]
fn accumulating_after_reload_continues_counts() {
    // Arrange
    let mut table = ExperienceTable::new(4, 2);
    table.read_from(sample_table().to_string().as_bytes()).unwrap();
    // Act
    table.accumulate(0, 2, 0, 4.0);
    // Assert
    assert_eq!(table.visits()[[0, 2, 0]], 2);
    assert_eq!(table.action_total(0, 0), 4);
    let model = table.derive_model();
    assert_abs_diff_eq!(model.transitions()[[0, 2, 0]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(model.rewards()[[0, 2, 0]], 1.0, epsilon = 1e-12);
}
