//! Analysis pipeline: index charts, country join, regression and scatter chart.

use crate::charts::{select_annotations, ChartRenderer, LineChart, ScatterChart, Series};
use crate::config::AnalysisConfig;
use crate::data::{CountryPairs, DataLoader, DataProcessor, QuarterlyIndices};
use crate::stats::{fit_line, LinearFit};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub const GDP_CHART_FILE: &str = "GDP_Index_Plot.png";
pub const CONSUMPTION_CHART_FILE: &str = "Consumption_Index_Plot.png";
pub const SCATTER_CHART_FILE: &str = "Scatter_Plot.png";

pub const GOV_METRIC: &str = "G_EXP_Growth";
pub const INF_METRIC: &str = "INF_Growth";

const INDEX_AXIS: &str = "Index (2008Q1=100)";

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub fit: LinearFit,
    pub pairs: CountryPairs,
    pub charts: Vec<PathBuf>,
}

/// Run every step once, in order.
pub fn run(config: &AnalysisConfig, renderer: &mut dyn ChartRenderer) -> Result<AnalysisReport> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "creating output directory {}",
            config.output_dir.display()
        )
    })?;
    let mut charts = Vec::with_capacity(3);

    // Ireland vs Euro Area indices
    let indices_path = config.indices_path();
    let indices = DataLoader::load_quarterly_indices(&indices_path)
        .with_context(|| format!("loading {}", indices_path.display()))?;
    if indices.is_empty() {
        bail!("{} has no quarters", indices_path.display());
    }
    info!(quarters = indices.len(), "loaded index table");

    let gdp = index_chart(
        &indices,
        "GDP Index: Ireland vs. Euro Area (2008Q1=100)",
        [0, 1],
    )?;
    charts.push(render_lines(renderer, &gdp, config.output_dir.join(GDP_CHART_FILE))?);

    let consumption = index_chart(
        &indices,
        "Consumption Index: Ireland vs. Euro Area (2008Q1=100)",
        [2, 3],
    )?;
    charts.push(render_lines(
        renderer,
        &consumption,
        config.output_dir.join(CONSUMPTION_CHART_FILE),
    )?);

    // Government spending vs core inflation
    let gov_path = config.government_path();
    let gov = DataLoader::load_country_metric(
        &gov_path,
        config.government_aggregate_rows,
        config.government_growth_column,
        GOV_METRIC,
    )
    .with_context(|| format!("loading {}", gov_path.display()))?;

    let inf_path = config.inflation_path();
    let inf = DataLoader::load_country_metric(
        &inf_path,
        0,
        config.inflation_growth_column,
        INF_METRIC,
    )
    .with_context(|| format!("loading {}", inf_path.display()))?;

    let joined = DataProcessor::join_countries(&gov, &inf).context("joining country tables")?;
    let pairs = DataProcessor::to_pairs(&joined, GOV_METRIC, INF_METRIC)?;
    if pairs.is_empty() {
        bail!(
            "no country appears in both {} and {}",
            gov_path.display(),
            inf_path.display()
        );
    }
    info!(countries = pairs.len(), "joined country tables");

    let fit = fit_line(&pairs.x, &pairs.y).context("fitting INF_Growth on G_EXP_Growth")?;
    info!(
        n = fit.n,
        slope = fit.slope,
        intercept = fit.intercept,
        r_squared = fit.r_squared,
        slope_std_err = ?fit.slope_std_err,
        p_value = ?fit.p_value,
        "fitted trend line"
    );

    let scatter = ScatterChart {
        title: "Cumulative Government Spending Growth vs. Core Inflation (2019 Q4 - 2022 Q4)"
            .to_string(),
        x_label: "Cumulative Government Spending Growth (%)".to_string(),
        y_label: "Cumulative Core Inflation Growth (%)".to_string(),
        points: pairs.x.iter().copied().zip(pairs.y.iter().copied()).collect(),
        trend: fit.sample_line(config.fit_samples),
        trend_label: format!("Trendline ({})", fit.equation()),
        annotations: select_annotations(
            &pairs.countries,
            &pairs.x,
            &pairs.y,
            &config.labeled_countries,
        ),
    };
    let scatter_path = config.output_dir.join(SCATTER_CHART_FILE);
    renderer
        .render_scatter(&scatter, &scatter_path)
        .with_context(|| format!("rendering {}", scatter_path.display()))?;
    charts.push(scatter_path);

    Ok(AnalysisReport { fit, pairs, charts })
}

fn index_chart(indices: &QuarterlyIndices, title: &str, positions: [usize; 2]) -> Result<LineChart> {
    let series = positions
        .iter()
        .map(|&position| {
            let (label, values) = indices.series(position)?;
            Ok(Series { label, values })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LineChart {
        title: title.to_string(),
        x_label: "Quarter".to_string(),
        y_label: INDEX_AXIS.to_string(),
        categories: indices.quarters()?,
        series,
    })
}

fn render_lines(
    renderer: &mut dyn ChartRenderer,
    chart: &LineChart,
    path: PathBuf,
) -> Result<PathBuf> {
    renderer
        .render_lines(chart, &path)
        .with_context(|| format!("rendering {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::PlotError;
    use std::path::Path;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingRenderer {
        lines: Vec<(PathBuf, LineChart)>,
        scatters: Vec<(PathBuf, ScatterChart)>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render_lines(&mut self, chart: &LineChart, path: &Path) -> Result<(), PlotError> {
            self.lines.push((path.to_path_buf(), chart.clone()));
            Ok(())
        }

        fn render_scatter(&mut self, chart: &ScatterChart, path: &Path) -> Result<(), PlotError> {
            self.scatters.push((path.to_path_buf(), chart.clone()));
            Ok(())
        }
    }

    const INDICES_CSV: &str = "\
,Ireland GDP,EA GDP,Ireland C,EA C
2008Q1,100,100,100,100
2008Q2,98.1,99.6,97.5,99.8
2008Q3,96.4,99.0,n/a,99.4
";

    // 7 aggregate rows, growth in column 3
    const GOV_CSV: &str = "\
GEO,2019Q4,2022Q4,Growth
EU27,1,1,99
EA20,1,1,99
EA19,1,1,99
EU28,1,1,99
EA,1,1,99
EU,1,1,99
EEA,1,1,99
Ireland,1,1,10
Germany,1,1,20
Spain,1,1,30
France,1,1,40
Italy,1,1,40
Malta,1,1,:
";

    // growth in column 5; INF = 0.5 * G + 2
    const INF_CSV: &str = "\
GEO,a,b,c,d,Growth
Ireland,x,x,x,x,7
Germany,x,x,x,x,12
Spain,x,x,x,x,17
Italy,x,x,x,x,22
Norway,x,x,x,x,3
Malta,x,x,x,x,5
";

    fn fixture_config(root: &Path) -> AnalysisConfig {
        fs::write(root.join("ireland_ea.csv"), INDICES_CSV).unwrap();
        fs::write(root.join("gov.csv"), GOV_CSV).unwrap();
        fs::write(root.join("inf.csv"), INF_CSV).unwrap();
        AnalysisConfig {
            data_dir: root.to_path_buf(),
            output_dir: root.join("out"),
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn full_run_produces_three_charts_and_fit() {
        let dir = tempdir().unwrap();
        let config = fixture_config(dir.path());
        let mut renderer = RecordingRenderer::default();

        let report = run(&config, &mut renderer).unwrap();

        let out = dir.path().join("out");
        assert!(out.is_dir());
        assert_eq!(
            report.charts,
            vec![
                out.join(GDP_CHART_FILE),
                out.join(CONSUMPTION_CHART_FILE),
                out.join(SCATTER_CHART_FILE),
            ]
        );
        assert_eq!(renderer.lines.len(), 2);
        assert_eq!(renderer.scatters.len(), 1);

        assert!((report.fit.slope - 0.5).abs() < 1e-9);
        assert!((report.fit.intercept - 2.0).abs() < 1e-9);
        assert_eq!(
            report.pairs.countries,
            vec!["Ireland", "Germany", "Spain", "Italy"]
        );
    }

    #[test]
    fn index_charts_carry_quarters_and_gaps() {
        let dir = tempdir().unwrap();
        let config = fixture_config(dir.path());
        let mut renderer = RecordingRenderer::default();
        run(&config, &mut renderer).unwrap();

        let (_, gdp) = &renderer.lines[0];
        assert_eq!(gdp.categories, vec!["2008Q1", "2008Q2", "2008Q3"]);
        assert_eq!(gdp.series[0].label, "Ireland GDP Index (2008Q1=100)");
        assert_eq!(gdp.series[1].label, "Euro Area GDP Index (2008Q1=100)");

        let (_, consumption) = &renderer.lines[1];
        assert_eq!(
            consumption.series[0].values,
            vec![Some(100.0), Some(97.5), None]
        );
    }

    #[test]
    fn scatter_labels_only_allow_listed_countries() {
        let dir = tempdir().unwrap();
        let config = fixture_config(dir.path());
        let mut renderer = RecordingRenderer::default();
        run(&config, &mut renderer).unwrap();

        let (_, scatter) = &renderer.scatters[0];
        let labeled: Vec<&str> = scatter.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(labeled, vec!["Ireland", "Germany", "Spain"]);
        assert_eq!(scatter.points.len(), 4);
        assert_eq!(scatter.trend.len(), 100);
        assert_eq!(scatter.trend_label, "Trendline (y = 0.50x + 2.00)");
    }

    #[test]
    fn disjoint_country_tables_fail() {
        let dir = tempdir().unwrap();
        let config = fixture_config(dir.path());
        fs::write(dir.path().join("inf.csv"), "GEO,a,b,c,d,Growth\nNorway,x,x,x,x,3\n").unwrap();

        let err = run(&config, &mut RecordingRenderer::default()).unwrap_err();
        assert!(err.to_string().contains("no country appears in both"));
    }

    #[test]
    fn missing_input_names_the_file() {
        let dir = tempdir().unwrap();
        let config = AnalysisConfig {
            data_dir: dir.path().join("missing"),
            output_dir: dir.path().join("out"),
            ..AnalysisConfig::default()
        };

        let err = run(&config, &mut RecordingRenderer::default()).unwrap_err();
        assert!(format!("{err:#}").contains("ireland_ea.csv"));
    }
}
