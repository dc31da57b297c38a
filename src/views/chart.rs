use std::fmt::Write;

use super::escape;
use crate::database::models::SpendBucket;

const WIDTH: f64 = 480.0;
const HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_TOP: f64 = 30.0;

/// Vertical bar chart of total spend per category as inline SVG.
pub fn bar_chart(title: &str, buckets: &[SpendBucket]) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" role=\"img\">\
         <title>{t}</title><text x=\"{x}\" y=\"18\" text-anchor=\"middle\" font-weight=\"bold\">{t}</text>",
        t = escape(title),
        x = WIDTH / 2.0,
    );

    let plot_w = WIDTH - MARGIN_LEFT - 10.0;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_h;
    let _ = write!(
        svg,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{baseline}\" x2=\"{}\" y2=\"{baseline}\" stroke=\"#333\"/>",
        MARGIN_LEFT + plot_w
    );

    if buckets.is_empty() {
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\">No data loaded</text></svg>",
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        return svg;
    }

    let max = buckets
        .iter()
        .map(|b| b.total_spend)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let slot = plot_w / buckets.len() as f64;
    let bar_w = (slot * 0.7).max(1.0);

    for (i, bucket) in buckets.iter().enumerate() {
        let h = (bucket.total_spend.max(0.0) / max) * plot_h;
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
        let y = baseline - h;
        let cx = x + bar_w / 2.0;
        let _ = write!(
            svg,
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{bar_w:.1}\" height=\"{h:.1}\" fill=\"#4472c4\">\
             <title>{label}: {spend:.2}</title></rect>\
             <text x=\"{cx:.1}\" y=\"{ty:.1}\" text-anchor=\"middle\" font-size=\"11\">{spend:.0}</text>\
             <text x=\"{cx:.1}\" y=\"{ly:.1}\" text-anchor=\"middle\" font-size=\"12\">{label}</text>",
            label = escape(&bucket.category),
            spend = bucket.total_spend,
            ty = y - 4.0,
            ly = baseline + 16.0,
        );
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(category: &str, total_spend: f64) -> SpendBucket {
        SpendBucket {
            category: category.to_string(),
            total_spend,
        }
    }

    #[test]
    fn draws_one_bar_per_bucket() {
        let svg = bar_chart("Income Range", &[bucket("35-49K", 34.75), bucket("50-74K", 3.25), bucket("<25K", 1.0)]);
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("35-49K: 34.75"));
        assert!(svg.contains("&lt;25K"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn tallest_bar_fills_plot() {
        let svg = bar_chart("t", &[bucket("a", 10.0), bucket("b", 5.0)]);
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        assert!(svg.contains(&format!("height=\"{:.1}\"", plot_h)));
        assert!(svg.contains(&format!("height=\"{:.1}\"", plot_h / 2.0)));
    }

    #[test]
    fn empty_chart_says_so() {
        let svg = bar_chart("Household Size", &[]);
        assert!(svg.contains("No data loaded"));
        assert!(!svg.contains("<rect"));
    }
}
