use super::*;
use crate::fidelity::ViewErrorSweep;

fn create_sweep() -> ViewErrorSweep {
    ViewErrorSweep {
        distances: vec![0.0, 0.25, 0.5],
        errors: vec![0.0, 0.125, 0.5],
    }
}

#[test]
fn test_view_block_layout() {
    let mut out = Vec::new();
    let mut writer = FidelityReportWriter::new(&mut out);
    let curve = FidelityCurve { slope: 2.0, peak: 1.0 };

    writer.view_block("view_00.png", &create_sweep(), &curve).unwrap();
    writer.flush().unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    // Stats line: name, slope, peak, minimum sampled distance, first error
    assert_eq!(lines[0], "view_00.png\t2\t1\t0.25\t0.125");
    // Distance and error rows, tab separated
    assert_eq!(lines[1], "0\t0.25\t0.5\t");
    assert_eq!(lines[2], "0\t0.125\t0.5\t");
    // Blank separator line
    assert_eq!(lines[3], "");
}

#[test]
fn test_view_block_without_samples() {
    let mut out = Vec::new();
    let mut writer = FidelityReportWriter::new(&mut out);
    let sweep = ViewErrorSweep {
        distances: vec![0.0],
        errors: vec![0.0],
    };

    writer
        .view_block("lonely.png", &sweep, &FidelityCurve::linear(0.0))
        .unwrap();
    writer.flush().unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("lonely.png\t0\t0\t0\t0"));
}

#[test]
fn test_target_section_rows() {
    let mut out = Vec::new();
    let mut writer = FidelityReportWriter::new(&mut out);
    let curve = FidelityCurve { slope: 1.5, peak: 0.75 };

    writer.target_section_header().unwrap();
    writer.source_only_row("extra_view", &curve, 0.25, 1.25).unwrap();
    writer.ranked_row("kept_view", &curve, 0.5, 0.6, 2.5).unwrap();
    writer.flush().unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Expected error for views in target view set:"));
    assert!(text.contains("extra_view\t1.5\t0.75\tn/a\t0.25\t1.25"));
    assert!(text.contains("kept_view\t1.5\t0.75\t0.5\t0.6\t2.5"));
}
