//! The four summary charts.
//!
//! Each function returns a complete SVG document. Countries lacking the
//! values a chart needs are left out of that chart.

use super::svg::{nice_ticks, tick_label, Anchor, LinearScale, Stroke, Svg};
use crate::analysis::{quantile_sorted, sorted_by_change, top_impacted, CountryImpact, Period};
use std::cmp::Ordering;

pub const DEEP_PURPLE: &str = "#4A148C";
pub const PURPLE: &str = "#9C27B0";
pub const DEEP_INDIGO: &str = "#1A237E";
pub const INDIGO: &str = "#3F51B5";

const MEDIAN_COLOR: &str = "#FF7F0E";
const AXIS: Stroke<'static> = Stroke {
    color: "#333333",
    width: 1.0,
    opacity: 1.0,
    dashed: false,
};
const GRID: Stroke<'static> = Stroke {
    color: "#B0B0B0",
    width: 0.8,
    opacity: 0.3,
    dashed: false,
};

const TITLE_SIZE: f64 = 16.0;
const LABEL_SIZE: f64 = 13.0;
const TICK_SIZE: f64 = 11.0;

/// Pixel rectangle of the plotting area.
#[derive(Debug, Clone, Copy)]
struct Plot {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Plot {
    fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

fn draw_title(svg: &mut Svg, title: &str) {
    let x = svg.width() / 2.0;
    svg.text(x, 34.0, title, TITLE_SIZE, Anchor::Middle, None);
}

fn draw_axis_labels(svg: &mut Svg, plot: &Plot, x_label: Option<&str>, y_label: &str) {
    if let Some(label) = x_label {
        let x = plot.x0 + plot.width() / 2.0;
        svg.text(x, plot.y1 + 45.0, label, LABEL_SIZE, Anchor::Middle, None);
    }
    let y = plot.y0 + plot.height() / 2.0;
    svg.text(20.0, y, y_label, LABEL_SIZE, Anchor::Middle, Some(-90.0));
}

fn draw_frame(svg: &mut Svg, plot: &Plot) {
    svg.line(plot.x0, plot.y1, plot.x1, plot.y1, AXIS);
    svg.line(plot.x0, plot.y0, plot.x0, plot.y1, AXIS);
}

/// Vertical grid lines with tick labels under the plot.
fn draw_x_ticks(svg: &mut Svg, plot: &Plot, scale: &LinearScale, ticks: &[f64]) {
    for &t in ticks {
        let x = scale.map(t);
        svg.line(x, plot.y0, x, plot.y1, GRID);
        svg.text(x, plot.y1 + 18.0, &tick_label(t), TICK_SIZE, Anchor::Middle, None);
    }
}

/// Horizontal grid lines with tick labels left of the plot.
fn draw_y_ticks(svg: &mut Svg, plot: &Plot, scale: &LinearScale, ticks: &[f64]) {
    for &t in ticks {
        let y = scale.map(t);
        svg.line(plot.x0, y, plot.x1, y, GRID);
        svg.text(plot.x0 - 8.0, y + 4.0, &tick_label(t), TICK_SIZE, Anchor::End, None);
    }
}

fn draw_no_data(svg: &mut Svg, plot: &Plot) {
    let x = plot.x0 + plot.width() / 2.0;
    let y = plot.y0 + plot.height() / 2.0;
    svg.text(x, y, "No data", LABEL_SIZE, Anchor::Middle, None);
}

/// Value range that always contains zero.
fn range_with_zero(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Horizontal bar chart of the during-period change for every country.
pub fn impact_by_country(impacts: &[CountryImpact], width: f64, height: f64) -> String {
    let data: Vec<(&str, f64)> = sorted_by_change(impacts, true)
        .into_iter()
        .filter_map(|i| i.pct_change_during.map(|v| (i.country.as_str(), v)))
        .collect();

    let mut svg = Svg::new(width, height);
    draw_title(&mut svg, "COVID-19 Impact on AI Hiring Rates by Country");

    let longest = data
        .iter()
        .map(|(c, _)| c.chars().count())
        .max()
        .unwrap_or(0);
    let label_width = (longest as f64 * 6.5 + 16.0).max(60.0);
    let plot = Plot {
        x0: 50.0 + label_width,
        y0: 60.0,
        x1: width - 30.0,
        y1: height - 70.0,
    };
    draw_axis_labels(
        &mut svg,
        &plot,
        Some("Percentage Change During COVID (%)"),
        "Country",
    );

    if data.is_empty() {
        draw_no_data(&mut svg, &plot);
        draw_frame(&mut svg, &plot);
        return svg.finish();
    }

    let (lo, hi) = range_with_zero(data.iter().map(|(_, v)| *v));
    let (lo, hi, ticks) = nice_ticks(lo, hi, 8);
    let x = LinearScale::new((lo, hi), (plot.x0, plot.x1));
    draw_x_ticks(&mut svg, &plot, &x, &ticks);

    let band = plot.height() / data.len() as f64;
    let font = (band * 0.8).clamp(6.0, TICK_SIZE);
    let zero = x.map(0.0);

    // First entry at the bottom, as in a conventional barh layout.
    for (i, (country, value)) in data.iter().enumerate() {
        let center = plot.y1 - (i as f64 + 0.5) * band;
        let color = if *value < 0.0 { DEEP_PURPLE } else { DEEP_INDIGO };
        svg.line(plot.x0, center, plot.x1, center, GRID);
        svg.rect(
            zero,
            center - band * 0.4,
            x.map(*value) - zero,
            band * 0.8,
            color,
            1.0,
            None,
        );
        svg.text(plot.x0 - 8.0, center + font / 3.0, country, font, Anchor::End, None);
    }

    svg.line(zero, plot.y0, zero, plot.y1, Stroke::dashed("gray", 1.2, 0.5));
    draw_frame(&mut svg, &plot);
    svg.finish()
}

/// Five-number summary with 1.5 IQR whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let low_limit = q1 - 1.5 * iqr;
        let high_limit = q3 + 1.5 * iqr;

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (low_limit..=high_limit).contains(v))
            .collect();
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| !(low_limit..=high_limit).contains(v))
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low: inside.first().copied().unwrap_or(q1),
            whisker_high: inside.last().copied().unwrap_or(q3),
            fliers,
        })
    }
}

/// Box plots of the per-country period means.
pub fn period_distribution(impacts: &[CountryImpact], width: f64, height: f64) -> String {
    let groups: Vec<(Period, Option<BoxStats>)> = Period::ALL
        .iter()
        .map(|&p| {
            let values: Vec<f64> = impacts.iter().filter_map(|i| i.period_mean(p)).collect();
            (p, BoxStats::from_values(&values))
        })
        .collect();

    let mut svg = Svg::new(width, height);
    draw_title(
        &mut svg,
        "Distribution of AI Hiring Rates Across Different Periods",
    );
    let plot = Plot {
        x0: 80.0,
        y0: 60.0,
        x1: width - 30.0,
        y1: height - 60.0,
    };
    draw_axis_labels(&mut svg, &plot, None, "Relative AI Hiring Rate");

    let extremes: Vec<f64> = groups
        .iter()
        .filter_map(|(_, stats)| stats.as_ref())
        .flat_map(|s| {
            let mut v = vec![s.whisker_low, s.whisker_high];
            v.extend(s.fliers.iter().copied());
            v
        })
        .collect();

    let band = plot.width() / groups.len() as f64;
    for (i, (period, _)) in groups.iter().enumerate() {
        let center = plot.x0 + (i as f64 + 0.5) * band;
        svg.text(center, plot.y1 + 20.0, period.label(), LABEL_SIZE, Anchor::Middle, None);
    }

    if extremes.is_empty() {
        draw_no_data(&mut svg, &plot);
        draw_frame(&mut svg, &plot);
        return svg.finish();
    }

    let lo = extremes.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = extremes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi, ticks) = nice_ticks(lo, hi, 6);
    let y = LinearScale::new((lo, hi), (plot.y1, plot.y0));
    draw_y_ticks(&mut svg, &plot, &y, &ticks);

    let box_width = band * 0.5;
    let outline = Stroke::solid("#000000", 1.0);
    for (i, (_, stats)) in groups.iter().enumerate() {
        let Some(s) = stats else { continue };
        let center = plot.x0 + (i as f64 + 0.5) * band;
        let left = center - box_width / 2.0;
        let cap = box_width / 4.0;

        svg.line(center, y.map(s.q1), center, y.map(s.whisker_low), outline);
        svg.line(center, y.map(s.q3), center, y.map(s.whisker_high), outline);
        svg.line(center - cap, y.map(s.whisker_low), center + cap, y.map(s.whisker_low), outline);
        svg.line(center - cap, y.map(s.whisker_high), center + cap, y.map(s.whisker_high), outline);

        svg.rect(
            left,
            y.map(s.q3),
            box_width,
            y.map(s.q1) - y.map(s.q3),
            INDIGO,
            0.8,
            Some(outline),
        );
        svg.line(
            left,
            y.map(s.median),
            left + box_width,
            y.map(s.median),
            Stroke::solid(MEDIAN_COLOR, 2.0),
        );

        for &f in &s.fliers {
            svg.circle(center, y.map(f), 3.5, "#000000", 0.5);
        }
    }

    draw_frame(&mut svg, &plot);
    svg.finish()
}

/// Vertical bars for the `n` most negatively affected countries.
pub fn top_impacted_chart(impacts: &[CountryImpact], n: usize, width: f64, height: f64) -> String {
    let data = top_impacted(impacts, n);

    let mut svg = Svg::new(width, height);
    draw_title(&mut svg, &format!("{} Most Impacted Countries", n));
    let plot = Plot {
        x0: 80.0,
        y0: 60.0,
        x1: width - 30.0,
        y1: height - 130.0,
    };
    draw_axis_labels(&mut svg, &plot, None, "Percentage Change During COVID (%)");

    if data.is_empty() {
        draw_no_data(&mut svg, &plot);
        draw_frame(&mut svg, &plot);
        return svg.finish();
    }

    let (lo, hi) = range_with_zero(data.iter().filter_map(|i| i.pct_change_during));
    let (lo, hi, ticks) = nice_ticks(lo, hi, 6);
    let y = LinearScale::new((lo, hi), (plot.y1, plot.y0));
    draw_y_ticks(&mut svg, &plot, &y, &ticks);

    let band = plot.width() / data.len() as f64;
    let zero = y.map(0.0);
    for (i, impact) in data.iter().enumerate() {
        let Some(value) = impact.pct_change_during else { continue };
        let center = plot.x0 + (i as f64 + 0.5) * band;
        svg.rect(
            center - band * 0.4,
            zero,
            band * 0.8,
            y.map(value) - zero,
            DEEP_PURPLE,
            1.0,
            None,
        );
        svg.text(
            center,
            plot.y1 + 14.0,
            &impact.country,
            TICK_SIZE,
            Anchor::End,
            Some(-45.0),
        );
    }

    draw_frame(&mut svg, &plot);
    svg.finish()
}

/// Scatter of the during-period change against the post-vs-pre change.
///
/// Points beyond `annotate_threshold` on either axis are labelled.
pub fn recovery_analysis(
    impacts: &[CountryImpact],
    annotate_threshold: f64,
    width: f64,
    height: f64,
) -> String {
    let points: Vec<(&str, f64, f64)> = impacts
        .iter()
        .filter_map(|i| match (i.pct_change_during, i.pct_change_post) {
            (Some(x), Some(y)) => Some((i.country.as_str(), x, y)),
            _ => None,
        })
        .collect();

    let mut svg = Svg::new(width, height);
    draw_title(&mut svg, "COVID Impact vs Recovery Analysis");
    let plot = Plot {
        x0: 80.0,
        y0: 60.0,
        x1: width - 30.0,
        y1: height - 70.0,
    };
    draw_axis_labels(
        &mut svg,
        &plot,
        Some("Impact During COVID (%)"),
        "Post vs Pre-COVID Change (%)",
    );

    if points.is_empty() {
        draw_no_data(&mut svg, &plot);
        draw_frame(&mut svg, &plot);
        return svg.finish();
    }

    let (x_lo, x_hi) = range_with_zero(points.iter().map(|p| p.1));
    let (y_lo, y_hi) = range_with_zero(points.iter().map(|p| p.2));
    let (x_lo, x_hi, x_ticks) = nice_ticks(x_lo, x_hi, 8);
    let (y_lo, y_hi, y_ticks) = nice_ticks(y_lo, y_hi, 6);
    let x = LinearScale::new((x_lo, x_hi), (plot.x0, plot.x1));
    let y = LinearScale::new((y_lo, y_hi), (plot.y1, plot.y0));
    draw_x_ticks(&mut svg, &plot, &x, &x_ticks);
    draw_y_ticks(&mut svg, &plot, &y, &y_ticks);

    let quadrant = Stroke::dashed("gray", 1.0, 0.3);
    svg.line(plot.x0, y.map(0.0), plot.x1, y.map(0.0), quadrant);
    svg.line(x.map(0.0), plot.y0, x.map(0.0), plot.y1, quadrant);

    for &(country, px, py) in &points {
        let (cx, cy) = (x.map(px), y.map(py));
        svg.circle(cx, cy, 5.0, PURPLE, 0.6);
        if px.abs() > annotate_threshold || py.abs() > annotate_threshold {
            svg.text(cx + 5.0, cy - 5.0, country, 10.0, Anchor::Start, None);
        }
    }

    draw_frame(&mut svg, &plot);
    svg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impact(country: &str, pre: f64, during: f64, post: f64) -> CountryImpact {
        CountryImpact {
            country: country.to_string(),
            pre_mean: Some(pre),
            during_mean: Some(during),
            post_mean: Some(post),
            pct_change_during: Some((during - pre) / pre * 100.0),
            pct_change_post: Some((post - pre) / pre * 100.0),
        }
    }

    fn sample() -> Vec<CountryImpact> {
        vec![
            impact("Brazil", 2.0, 1.0, 2.5),
            impact("India", 1.0, 1.8, 2.0),
            impact("Canada", 1.5, 1.4, 1.5),
            CountryImpact {
                country: "Nowhere".to_string(),
                pre_mean: None,
                during_mean: Some(1.0),
                post_mean: None,
                pct_change_during: None,
                pct_change_post: None,
            },
        ]
    }

    #[test]
    fn test_box_stats() {
        let mut values: Vec<f64> = (1..=9).map(f64::from).collect();
        values.push(100.0);
        let stats = BoxStats::from_values(&values).unwrap();

        assert_eq!(stats.q1, 3.25);
        assert_eq!(stats.median, 5.5);
        assert_eq!(stats.q3, 7.75);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 9.0);
        assert_eq!(stats.fliers, vec![100.0]);

        assert!(BoxStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_impact_by_country_colors_and_labels() {
        let svg = impact_by_country(&sample(), 1200.0, 800.0);
        assert!(svg.contains("COVID-19 Impact on AI Hiring Rates by Country"));
        assert!(svg.contains(DEEP_PURPLE));
        assert!(svg.contains(DEEP_INDIGO));
        assert!(svg.contains(">Brazil<"));
        assert!(!svg.contains(">Nowhere<"));
    }

    #[test]
    fn test_period_distribution_labels() {
        let svg = period_distribution(&sample(), 1000.0, 600.0);
        assert!(svg.contains("Pre-COVID"));
        assert!(svg.contains("During COVID"));
        assert!(svg.contains("Post-COVID"));
        assert!(svg.contains("Relative AI Hiring Rate"));
    }

    #[test]
    fn test_top_impacted_limits_bars() {
        let svg = top_impacted_chart(&sample(), 2, 1200.0, 600.0);
        assert!(svg.contains("2 Most Impacted Countries"));
        assert!(svg.contains(">Brazil<"));
        assert!(svg.contains(">Canada<"));
        assert!(!svg.contains(">India<"));
    }

    #[test]
    fn test_recovery_annotations() {
        // Brazil: -50% during, India: +80% during; Canada stays within +-50
        let svg = recovery_analysis(&sample(), 50.0, 1200.0, 600.0);
        assert!(svg.contains(">India<"));
        assert!(!svg.contains(">Canada<"));
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_empty_input_renders_placeholder() {
        let svg = impact_by_country(&[], 800.0, 600.0);
        assert!(svg.contains("No data"));
        let svg = recovery_analysis(&[], 50.0, 800.0, 600.0);
        assert!(svg.contains("No data"));
    }
}
