//! Integration tests for the chart renderer.

use std::path::PathBuf;

use survey_report::report::artifact::ChartData;
use survey_report::{
    group_by, ChartLabels, ChartRenderer, ChartStyle, Dataset, Field, Overlay, ReportError,
};

fn sample() -> Dataset {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/titanic_sample.csv");
    Dataset::load(path).unwrap()
}

fn renderer() -> ChartRenderer {
    ChartRenderer::new(ChartStyle::default())
}

fn labels(title: &str) -> ChartLabels {
    ChartLabels::new(title).x("x").y("y")
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[test]
fn histogram_excludes_missing_and_marks_mean() {
    let ages = [Some(22.0), Some(38.0), Some(26.0), None];
    let artifact = renderer()
        .render_histogram(&ages, 2, Overlay::mean(), labels("Ages"))
        .unwrap();

    let hist = artifact.histogram().unwrap();
    let counts: Vec<usize> = hist.buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![2, 1]);
    assert_eq!(hist.excluded, 1);
    assert_eq!(hist.total(), 3);
    assert!((hist.mean.unwrap() - 28.6667).abs() < 1e-3);
    assert!(hist.median.is_none());
    assert_eq!(hist.range(), Some((22.0, 38.0)));
}

#[test]
fn histogram_bucket_counts_cover_all_present_values() {
    let ds = sample();
    let ages = ds.numeric_values(Field::Age).unwrap();
    for bins in [1, 3, 7, 20] {
        let artifact = renderer()
            .render_histogram(&ages, bins, Overlay::both(), labels("Age"))
            .unwrap();
        let hist = artifact.histogram().unwrap();
        assert_eq!(hist.buckets.len(), bins);
        assert_eq!(hist.total(), 12);
        assert!((hist.median.unwrap() - 31.0).abs() < 1e-9);
    }
}

#[test]
fn histogram_of_constant_series() {
    let values = [Some(5.0), Some(5.0), Some(5.0)];
    let artifact = renderer()
        .render_histogram(&values, 4, Overlay::none(), labels("Constant"))
        .unwrap();
    assert_eq!(artifact.histogram().unwrap().total(), 3);
}

#[test]
fn histogram_rejects_zero_bins_and_empty_input() {
    let r = renderer();
    assert!(matches!(
        r.render_histogram(&[Some(1.0)], 0, Overlay::none(), labels("a"))
            .unwrap_err(),
        ReportError::InvalidArgument(_)
    ));
    assert!(matches!(
        r.render_histogram(&[None, None], 5, Overlay::none(), labels("a"))
            .unwrap_err(),
        ReportError::InvalidArgument(_)
    ));
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

#[test]
fn bar_chart_single_key() {
    let view = group_by(&sample(), &[Field::Survived]).unwrap();
    let artifact = renderer()
        .render_bar_chart(&view, false, false, labels("Survival Counts"))
        .unwrap();
    assert_eq!(artifact.name(), "survival_counts");

    let bars = artifact.bars().unwrap();
    assert_eq!(bars.categories, vec!["0", "1"]);
    assert_eq!(bars.series.len(), 1);
    assert_eq!(bars.series[0].name, "count");
    assert_eq!(bars.series[0].values, vec![5.0, 8.0]);
}

#[test]
fn stacked_bar_chart_two_keys() {
    let view = group_by(&sample(), &[Field::Pclass, Field::Survived]).unwrap();
    let artifact = renderer()
        .render_bar_chart(&view, true, false, labels("By class"))
        .unwrap();
    let bars = artifact.bars().unwrap();
    assert!(bars.stacked);
    assert_eq!(bars.categories, vec!["1", "2", "3"]);
    assert_eq!(bars.series.len(), 2);
    assert_eq!(bars.series[0].name, "Survived = 0");
    assert_eq!(bars.bar_total(0), 5.0);
    assert_eq!(bars.bar_total(2), 7.0);
}

#[test]
fn normalized_bar_chart_totals_hundred() {
    let view = group_by(&sample(), &[Field::Pclass, Field::Survived]).unwrap();
    let artifact = renderer()
        .render_bar_chart(&view, true, true, labels("Share"))
        .unwrap();
    let bars = artifact.bars().unwrap();
    assert!(bars.normalized);
    for i in 0..bars.categories.len() {
        assert!((bars.bar_total(i) - 100.0).abs() < 1e-9);
    }
}

#[test]
fn normalized_single_key_bar_chart_totals_hundred_per_bar() {
    let view = group_by(&sample(), &[Field::Embarked]).unwrap();
    let artifact = renderer()
        .render_bar_chart(&view, false, true, labels("Ports"))
        .unwrap();
    let bars = artifact.bars().unwrap();
    assert_eq!(bars.series[0].name, "percent");
    for i in 0..bars.categories.len() {
        assert!((bars.bar_total(i) - 100.0).abs() < 1e-9);
    }
}

#[test]
fn bar_chart_reports_excluded_rows() {
    let view = group_by(&sample(), &[Field::Embarked]).unwrap();
    let artifact = renderer()
        .render_bar_chart(&view, false, false, labels("Ports"))
        .unwrap();
    assert_eq!(artifact.bars().unwrap().excluded, 1);
}

#[test]
fn bar_chart_of_empty_view_errors() {
    let view = group_by(&Dataset::from_records(Vec::new()), &[Field::Sex]).unwrap();
    assert!(renderer()
        .render_bar_chart(&view, false, false, labels("Empty"))
        .is_err());
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[test]
fn scatter_rejects_misaligned_series() {
    let err = renderer()
        .render_scatter(&[Some(1.0), Some(2.0)], &[Some(1.0)], None, labels("s"))
        .unwrap_err();
    match err {
        ReportError::Alignment {
            left_len,
            right_len,
            ..
        } => {
            assert_eq!(left_len, 2);
            assert_eq!(right_len, 1);
        }
        other => panic!("expected Alignment, got {:?}", other),
    }

    let colors = vec![Some("a".to_string())];
    assert!(matches!(
        renderer()
            .render_scatter(
                &[Some(1.0), Some(2.0)],
                &[Some(1.0), Some(2.0)],
                Some(colors.as_slice()),
                labels("s"),
            )
            .unwrap_err(),
        ReportError::Alignment { .. }
    ));
}

#[test]
fn scatter_drops_incomplete_points() {
    let xs = [Some(1.0), None, Some(3.0), Some(4.0)];
    let ys = [Some(1.0), Some(2.0), None, Some(4.0)];
    let artifact = renderer()
        .render_scatter(&xs, &ys, None, labels("s"))
        .unwrap();
    let scatter = artifact.scatter().unwrap();
    assert_eq!(scatter.point_count(), 2);
    assert_eq!(scatter.excluded, 2);
    assert_eq!(scatter.groups.len(), 1);
    assert!(scatter.groups[0].label.is_none());
}

#[test]
fn scatter_groups_by_color() {
    let ds = sample();
    let colors = ds.categories(Field::Survived).unwrap();
    let artifact = renderer()
        .render_scatter(
            &ds.numeric_values(Field::Age).unwrap(),
            &ds.numeric_values(Field::Fare).unwrap(),
            Some(colors.as_slice()),
            labels("Age vs Fare"),
        )
        .unwrap();
    let scatter = artifact.scatter().unwrap();
    assert_eq!(scatter.groups.len(), 2);
    assert_eq!(scatter.groups[0].label.as_deref(), Some("0"));
    // Passenger 6 has no age.
    assert_eq!(scatter.groups[0].xs.len(), 4);
    assert_eq!(scatter.groups[1].xs.len(), 8);
    assert_eq!(scatter.excluded, 1);
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

#[test]
fn box_plot_per_class() {
    let ds = sample();
    let artifact = renderer()
        .render_box_plot(
            &ds.numeric_values(Field::Age).unwrap(),
            &ds.categories(Field::Pclass).unwrap(),
            labels("Age by class"),
        )
        .unwrap();
    match artifact.data() {
        ChartData::Box(data) => {
            let names: Vec<&str> = data.groups.iter().map(|g| g.label.as_str()).collect();
            assert_eq!(names, vec!["1", "2", "3"]);
            assert_eq!(data.groups[1].stats.count, 1);
            assert_eq!(data.excluded, 1);
        }
        other => panic!("expected box data, got {:?}", other),
    }
}

#[test]
fn box_plot_rejects_misaligned_series() {
    assert!(matches!(
        renderer()
            .render_box_plot(&[Some(1.0)], &[], labels("b"))
            .unwrap_err(),
        ReportError::Alignment { .. }
    ));
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

#[test]
fn renderer_applies_style_to_layout() {
    let style: ChartStyle = "dark".parse().unwrap();
    let renderer = ChartRenderer::new(style.clone());
    let artifact = renderer
        .render_histogram(&[Some(1.0), Some(2.0)], 2, Overlay::none(), labels("Dark"))
        .unwrap();
    let json = artifact.plot().to_json();
    assert!(json.contains(&style.background_color));
    assert!(json.contains("Dark"));
}
