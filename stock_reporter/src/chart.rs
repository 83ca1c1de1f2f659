//! Bar chart of the latest snapshot.
//!
//! The newest `stock_prices_<stamp>.json` is loaded, failed and unpriced
//! records are dropped, and the rest are drawn as one bar per ticker: green when
//! the price is at or above the previous close, red otherwise (including when
//! the previous close is unknown). The PNG reuses the snapshot's stamp,
//! `chart_<stamp>.png`.
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, register_font};
use stock_common::artifacts::{self, ArtifactKind};
use stock_common::config::Layout;
use stock_common::{PipelineError, Result, Snapshot, Ticker};
use strum::Display;

const FONT_FAMILY: &str = "sans-serif";
const FONT_REGULAR: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const FONT_BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

const CHART_SIZE: (u32, u32) = (1500, 900);
const UP_COLOR: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
const DOWN_COLOR: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

/// Day direction relative to the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    /// Price at or above previous close.
    Up,
    /// Price below previous close, or previous close unknown.
    Down,
}

impl Trend {
    /// Classify `price` against `previous_close`.
    pub fn classify(price: f64, previous_close: Option<f64>) -> Self {
        match previous_close {
            Some(prev) if price >= prev => Trend::Up,
            _ => Trend::Down,
        }
    }

    fn color(self) -> RGBColor {
        match self {
            Trend::Up => UP_COLOR,
            Trend::Down => DOWN_COLOR,
        }
    }
}

/// One plotted bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// X-axis label.
    pub ticker: Ticker,
    /// Bar height.
    pub price: f64,
    /// Bar color.
    pub trend: Trend,
}

/// What `generate_chart` did.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    /// No snapshot file in the data directory.
    NoSnapshot,
    /// The latest snapshot had nothing plottable.
    NoValidRecords,
    /// A chart was written.
    Rendered {
        /// Output PNG.
        path: PathBuf,
        /// Plotted tickers, in snapshot order.
        tickers: Vec<Ticker>,
    },
}

/// Records without an error and with a price, in snapshot order.
pub fn select_bars(snapshot: &Snapshot) -> Vec<Bar> {
    snapshot
        .stocks
        .iter()
        .filter_map(|record| {
            let price = record.price()?;
            Some(Bar {
                ticker: record.ticker.clone(),
                price,
                trend: Trend::classify(price, record.previous_close()),
            })
        })
        .collect()
}

fn chart_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Chart(e.to_string())
}

fn register_fonts() -> Result<()> {
    register_font(FONT_FAMILY, FontStyle::Normal, FONT_REGULAR)
        .map_err(|_| chart_err("invalid bundled font: DejaVuSans.ttf"))?;
    register_font(FONT_FAMILY, FontStyle::Bold, FONT_BOLD)
        .map_err(|_| chart_err("invalid bundled font: DejaVuSans-Bold.ttf"))?;
    Ok(())
}

/// Draw `bars` into a PNG at `path`.
pub fn render(bars: &[Bar], path: &Path) -> Result<()> {
    register_fonts()?;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let max_price = bars.iter().map(|b| b.price).fold(0.0_f64, f64::max);
    let y_top = if max_price > 0.0 { max_price * 1.15 } else { 1.0 };
    let segments = bars.len() as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Stock Prices - Latest",
            (FONT_FAMILY, 36).into_font().style(FontStyle::Bold),
        )
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d((0u32..segments).into_segmented(), 0f64..y_top)
        .map_err(chart_err)?;

    let x_label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|b| b.ticker.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len() + 1)
        .x_label_formatter(&x_label)
        .y_label_formatter(&|y| format!("{y:.0}"))
        .x_desc("Ticker")
        .y_desc("Price (USD)")
        .axis_desc_style((FONT_FAMILY, 24).into_font().style(FontStyle::Bold))
        .label_style((FONT_FAMILY, 20).into_font())
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(chart_err)?;

    let span = |i: usize, bar: &Bar| {
        let i = i as u32;
        [
            (SegmentValue::Exact(i), 0.0),
            (SegmentValue::Exact(i + 1), bar.price),
        ]
    };

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(span(i, bar), bar.trend.color().mix(0.8).filled());
            rect.set_margin(0, 0, 15, 15);
            rect
        }))
        .map_err(chart_err)?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(span(i, bar), BLACK.stroke_width(2));
            rect.set_margin(0, 0, 15, 15);
            rect
        }))
        .map_err(chart_err)?;

    let annotation = TextStyle::from((FONT_FAMILY, 20).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                format!("${:.2}", bar.price),
                (SegmentValue::CenterOf(i as u32), bar.price),
                annotation.clone(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Render the newest snapshot in `layout.data_dir` into `layout.charts_dir`.
pub fn generate_chart(layout: &Layout) -> Result<ChartOutcome> {
    let Some(source) = artifacts::latest(&layout.data_dir, ArtifactKind::Snapshot)? else {
        warn!(
            "No stock_prices_*.json files found in {}",
            layout.data_dir.display()
        );
        return Ok(ChartOutcome::NoSnapshot);
    };
    info!("Using data file: {}", source.file_name());

    let snapshot = Snapshot::load(&source.path)?;
    let bars = select_bars(&snapshot);
    if bars.is_empty() {
        warn!("No valid data to plot");
        return Ok(ChartOutcome::NoValidRecords);
    }

    fs::create_dir_all(&layout.charts_dir)?;
    let path = layout
        .charts_dir
        .join(ArtifactKind::Chart.file_name(source.stamp));
    render(&bars, &path)?;

    let tickers: Vec<Ticker> = bars.iter().map(|b| b.ticker.clone()).collect();
    let plotted: Vec<String> = bars
        .iter()
        .map(|b| format!("{} {}", b.ticker, b.trend))
        .collect();
    info!("Chart saved to {}", path.display());
    info!("Plotted {} stocks: {}", tickers.len(), plotted.join(", "));
    Ok(ChartOutcome::Rendered { path, tickers })
}
