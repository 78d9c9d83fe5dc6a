use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use serde::Serialize;
use std::path::{Path, PathBuf};
use transit_dash::dashboard::{DashboardPage, MapPanel, Notice, profile_page};
use transit_dash::profile::load_portrait;
use transit_dash::stats::{self, Kpis, LineScore, WeekdayMatrix};
use transit_dash::viz::util::{format_count, format_decimal};
use transit_dash::viz::{self, ChartInput, ChartKind, ChartOptions, LegendMode};
use transit_dash::{
    AmenityLoad, AppConfig, DataCache, Dashboard, DateWindow, Page, Selection, load_amenities,
    storage,
};

#[derive(Parser, Debug)]
#[command(
    name = "tdash",
    version,
    about = "Simulate, summarize & chart transit punctuality and station amenities"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the simulated punctuality series (and optionally save it).
    Simulate(SimulateArgs),
    /// Print the dashboard figures for a selection.
    Report(ReportArgs),
    /// Render one dashboard chart to .svg or .png.
    Chart(ChartArgs),
    /// List or export the amenity table.
    Amenities(AmenitiesArgs),
    /// Print the profile header.
    Profile(SourceArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Timeline,
    Ranking,
    Weekly,
    Map,
}

impl From<KindArg> for ChartKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Timeline => ChartKind::Timeline,
            KindArg::Ranking => ChartKind::Ranking,
            KindArg::Weekly => ChartKind::WeeklyHeatmap,
            KindArg::Map => ChartKind::Map,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Inside,
    Right,
    Top,
    Bottom,
}

impl From<LegendArg> for LegendMode {
    fn from(l: LegendArg) -> Self {
        match l {
            LegendArg::Inside => LegendMode::Inside,
            LegendArg::Right => LegendMode::Right,
            LegendArg::Top => LegendMode::Top,
            LegendArg::Bottom => LegendMode::Bottom,
        }
    }
}

/// Where the data comes from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// JSON config file; every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Amenity table (semicolon-delimited CSV).
    #[arg(long)]
    data: Option<PathBuf>,
    /// Seed for the simulation (reproducible output).
    #[arg(long)]
    seed: Option<u64>,
}

impl SourceArgs {
    fn load_config(&self) -> Result<AppConfig> {
        let mut cfg = AppConfig::load(self.config.as_deref())?;
        if let Some(data) = &self.data {
            cfg.data_path = data.clone();
        }
        if self.seed.is_some() {
            cfg.simulation.seed = self.seed;
        }
        Ok(cfg)
    }
}

/// Which lines and days to look at.
#[derive(Args, Debug)]
struct SelectArgs {
    /// Line identifiers separated by comma or semicolon (e.g., 1,4,13). Defaults to the config.
    #[arg(short, long)]
    lines: Option<String>,
    /// First day (YYYY-MM-DD); defaults to the start of the simulated calendar.
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD); defaults to the end of the simulated calendar.
    #[arg(long, value_parser = parse_day)]
    until: Option<NaiveDate>,
}

impl SelectArgs {
    fn selection(&self, dashboard: &Dashboard, defaults: &[String]) -> Result<Selection> {
        let calendar = dashboard.calendar();
        let window = DateWindow::new(
            self.from.unwrap_or(calendar.start()),
            self.until.unwrap_or(calendar.end()),
        )?;
        Ok(match &self.lines {
            Some(list) => Selection::new(parse_list(list), window),
            None => Selection {
                window,
                ..dashboard.default_selection(defaults)
            },
        })
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Save the records to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    select: SelectArgs,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ChartArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[command(flatten)]
    select: SelectArgs,
    /// Chart to draw.
    #[arg(long, value_enum, default_value = "timeline")]
    kind: KindArg,
    /// Output path (.svg or .png).
    #[arg(long)]
    out: PathBuf,
    /// Width of the chart (default from config, 1000).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the chart (default from config, 600).
    #[arg(long)]
    height: Option<u32>,
    /// Legend placement for the timeline.
    #[arg(long, value_enum)]
    legend: Option<LegendArg>,
    /// Chart title; a default per kind when omitted.
    #[arg(long)]
    title: Option<String>,
    /// Number format of labels (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct AmenitiesArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Only these lines (comma or semicolon separated).
    #[arg(short, long)]
    lines: Option<String>,
    /// Save the rows to file instead of listing them.
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.2}"),
        _ => "NA".to_string(),
    }
}

fn out_format(format: Option<OutFormat>, path: &Path) -> Result<OutFormat> {
    if let Some(f) = format {
        return Ok(f);
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase()
        .as_str()
    {
        "csv" => Ok(OutFormat::Csv),
        "json" => Ok(OutFormat::Json),
        other => bail!("unsupported format: {}", other),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Report(args) => cmd_report(args),
        Command::Chart(args) => cmd_chart(args),
        Command::Amenities(args) => cmd_amenities(args),
        Command::Profile(args) => cmd_profile(args),
    }
}

fn cmd_simulate(args: SimulateArgs) -> Result<()> {
    let cfg = args.source.load_config()?;
    let records = transit_dash::generate(&cfg.simulation)?;

    if let Some(path) = args.out.as_ref() {
        match out_format(args.format, path)? {
            OutFormat::Csv => storage::save_regularity_csv(&records, path)?,
            OutFormat::Json => storage::save_json(&records, path)?,
        }
        eprintln!("Saved {} rows to {}", records.len(), path.display());
    }

    for s in stats::grouped_summary(&records) {
        println!(
            "line {:>3}  days={}  min={} max={} mean={} median={}",
            s.line,
            s.count,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

/// Build the dashboard and resolve the selection; `None` means an empty selection.
fn dashboard_page(
    source: &SourceArgs,
    select: &SelectArgs,
) -> Result<(AppConfig, Option<Box<DashboardPage>>)> {
    let cfg = source.load_config()?;
    let mut cache = DataCache::new();
    let dashboard = Dashboard::from_cache(&mut cache, &cfg)?;
    let selection = select.selection(&dashboard, &cfg.default_lines)?;
    let page = match dashboard.page(&selection) {
        Page::Dashboard(page) => Some(page),
        Page::Prompt(prompt) => {
            println!("{prompt}");
            None
        }
        _ => None,
    };
    Ok((cfg, page))
}

#[derive(Serialize)]
struct Report<'a> {
    lines: &'a [String],
    from: NaiveDate,
    until: NaiveDate,
    kpis: &'a Kpis,
    ranking: &'a [LineScore],
    weekly: &'a WeekdayMatrix,
    amenities_located: usize,
    notices: Vec<String>,
}

fn map_state(map: &MapPanel) -> String {
    match map {
        MapPanel::Ready { located, rows } => {
            format!("{located} of {} amenities located", rows.len())
        }
        other => other.notice().map(|n| n.to_string()).unwrap_or_default(),
    }
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let (cfg, page) = dashboard_page(&args.source, &args.select)?;
    let Some(page) = page else {
        return Ok(());
    };
    for n in &page.notices {
        eprintln!("{n}");
    }

    if args.json {
        let report = Report {
            lines: &page.lines,
            from: page.window.start(),
            until: page.window.end(),
            kpis: &page.kpis,
            ranking: &page.ranking,
            weekly: &page.weekly,
            amenities_located: match &page.map {
                MapPanel::Ready { located, .. } => *located,
                _ => 0,
            },
            notices: page.notices.iter().map(Notice::to_string).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let locale = cfg.chart.locale.as_str();
    let k = &page.kpis;
    println!(
        "Lines {}  {} .. {}",
        page.lines.join(", "),
        page.window.start(),
        page.window.end()
    );
    println!(
        "mean={}  worst day={}  amenities={}  lines={}  riders={}",
        k.mean_rate.map_or("NA".into(), |v| format_decimal(v, locale)),
        k.worst_day.map_or("NA".into(), |v| format_decimal(v, locale)),
        k.amenity_count,
        k.line_count,
        format_count(k.total_ridership, locale)
    );

    println!("\nRanking");
    for (pos, s) in page.ranking.iter().enumerate() {
        println!(
            "{:>2}. line {:>3}  {}",
            pos + 1,
            s.line,
            format_decimal(s.mean_rate, locale)
        );
    }

    println!("\nWeekly mean");
    let header: Vec<String> = WeekdayMatrix::columns()
        .iter()
        .map(|d| format!("{:>6}", &d[..3]))
        .collect();
    println!("{:>8}{}", "line", header.join(""));
    for (line, cells) in page.weekly.lines.iter().zip(&page.weekly.cells) {
        let row: Vec<String> = cells
            .iter()
            .map(|c| format!("{:>6}", c.map_or("NA".into(), |v| format_decimal(v, locale))))
            .collect();
        println!("{line:>8}{}", row.join(""));
    }

    println!("\nMap: {}", map_state(&page.map));
    Ok(())
}

fn cmd_chart(args: ChartArgs) -> Result<()> {
    let (cfg, page) = dashboard_page(&args.source, &args.select)?;
    let Some(page) = page else {
        bail!("no line selected, nothing to draw");
    };
    let opts = ChartOptions {
        width: args.width.unwrap_or(cfg.chart.width),
        height: args.height.unwrap_or(cfg.chart.height),
        title: args.title.clone().unwrap_or_default(),
        legend: args.legend.map_or(cfg.chart.legend, LegendMode::from),
        target_rate: cfg.target_rate,
        locale: args.locale.clone().unwrap_or_else(|| cfg.chart.locale.clone()),
    };
    viz::render_chart(args.kind.into(), &ChartInput::from_page(&page), &args.out, &opts)?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_amenities(args: AmenitiesArgs) -> Result<()> {
    let cfg = args.source.load_config()?;
    let path = cfg.resolved_data_path();
    let rows = match load_amenities(&path)? {
        AmenityLoad::Missing => {
            eprintln!(
                "info: amenity table '{}' not found; no amenities to list",
                path.display()
            );
            Vec::new()
        }
        AmenityLoad::Loaded(rows) => rows,
    };
    let wanted = args.lines.as_deref().map(parse_list);
    let rows: Vec<_> = rows
        .into_iter()
        .filter(|a| wanted.as_ref().is_none_or(|w| w.contains(&a.line)))
        .collect();

    if let Some(out) = args.out.as_ref() {
        match out_format(args.format, out)? {
            OutFormat::Csv => storage::save_amenities_csv(&rows, out)?,
            OutFormat::Json => storage::save_json(&rows, out)?,
        }
        eprintln!("Saved {} rows to {}", rows.len(), out.display());
        return Ok(());
    }

    for a in &rows {
        let coords = a
            .coordinates()
            .map_or("-".to_string(), |(lon, lat)| format!("{lat:.5},{lon:.5}"));
        println!("{:>3}  {}  {}  {}  {}", a.line, a.station, a.municipality, a.address, coords);
    }
    eprintln!("{} rows", rows.len());
    Ok(())
}

fn cmd_profile(args: SourceArgs) -> Result<()> {
    let cfg = args.load_config()?;
    let portrait = load_portrait(cfg.resolved_portrait_path());
    let page = profile_page(&cfg.profile, &portrait);
    println!("{}\n{}", page.profile.name, page.profile.headline);
    for line in &page.profile.summary {
        println!("\n{line}");
    }
    if !page.profile.skills.is_empty() {
        println!("\nSkills: {}", page.profile.skills.join(", "));
    }
    if let Some(n) = page.notice {
        eprintln!("{n}");
    }
    Ok(())
}
