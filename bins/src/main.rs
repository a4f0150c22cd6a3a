use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use env::Env;
use eyre::Context;
use log::info;
use model::statistics::MonthKey;
use serde_json::json;
use stats::{
    clients::{ClientDimension, ConversionMetric},
    filter::{DateRange, NewClientFilterOptions, SessionFilter},
    payroll::{PayrollDimension, PayrollMetric},
    rank::{paginate, ViewMode},
    ranked,
    sessions::SessionMetric,
    sorted, Statistics,
};
use storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Classes,
    Trainers,
    Clients,
    Months,
    Years,
    All,
}

impl Section {
    fn includes(self, other: Section) -> bool {
        self == Section::All || self == other
    }
}

/// Studio class, trainer and new-client analytics
#[derive(Parser, Debug)]
#[command(name = "studio-cli")]
struct Args {
    #[arg(value_enum, default_value = "all")]
    section: Section,

    /// Print the aggregated rows as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Metric used to sort classes and month deltas
    #[arg(long, default_value = "fill_rate")]
    class_metric: SessionMetric,

    /// Metric used to rank trainers
    #[arg(long, default_value = "efficiency_score")]
    trainer_metric: PayrollMetric,

    /// Metric used to sort conversion tables
    #[arg(long, default_value = "conversion_rate")]
    client_metric: ConversionMetric,

    /// Rows in the top/bottom trainer tables, overrides REPORT_TOP_COUNT
    #[arg(long)]
    top: Option<usize>,

    /// Show one page of the class and conversion tables, starting at 1
    #[arg(long)]
    page: Option<usize>,

    /// Sessions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Sessions on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long)]
    location: Vec<String>,

    #[arg(long)]
    trainer: Vec<String>,

    #[arg(long)]
    format: Vec<String>,
}

impl Args {
    fn session_filter(&self) -> SessionFilter {
        SessionFilter {
            date_range: DateRange {
                start: self.from,
                end: self.to,
            },
            locations: self.location.clone(),
            trainers: self.trainer.clone(),
            formats: self.format.clone(),
        }
    }

    fn page(&self) -> Option<usize> {
        self.page.map(|page| page.saturating_sub(1))
    }
}

fn page_rows<R: Clone>(rows: Vec<R>, page: Option<usize>) -> Vec<R> {
    match page {
        Some(page) => paginate(&rows, page).to_vec(),
        None => rows,
    }
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();
    let env = Env::load().context("Failed to load configuration")?;
    pretty_env_logger::formatted_builder()
        .parse_filters(env.rust_log())
        .init();
    color_eyre::install()?;

    info!("Loading records");
    let storage = Storage::new(env.sessions_path(), env.payroll_path(), env.clients_path());
    let records = storage.load().context("Failed to load records")?;
    info!(
        "Loaded {} sessions, {} payroll rows, {} new clients",
        records.sessions.len(),
        records.payroll.len(),
        records.clients.len()
    );

    let client_filter = match env.client_filter_path() {
        Some(path) => storage::read_json::<NewClientFilterOptions>(path)
            .with_context(|| format!("Failed to load client filter {}", path.display()))?,
        None => NewClientFilterOptions::default(),
    };
    let session_filter = args.session_filter();
    let top = args.top.unwrap_or_else(|| env.top_count());
    let page = args.page();

    let stats = Statistics::new(&records.sessions, &records.payroll, &records.clients);
    if stats.is_empty() {
        info!("No records found");
    }

    if args.json {
        let mut out = serde_json::Map::new();
        if args.section.includes(Section::Classes) {
            let mut overview = stats.class_overview(&session_filter);
            overview.sort_by(args.class_metric);
            if let Some(page) = page {
                overview.keep_page(page);
            }
            out.insert("classes".to_owned(), serde_json::to_value(overview)?);
        }
        if args.section.includes(Section::Trainers) {
            let rows = stats.trainers_by(&[PayrollDimension::Trainer]);
            out.insert(
                "trainers".to_owned(),
                json!({
                    "top": ranked(&rows, args.trainer_metric, ViewMode::Top, top),
                    "bottom": ranked(&rows, args.trainer_metric, ViewMode::Bottom, top),
                    "formats": stats.format_breakdown(),
                }),
            );
        }
        if args.section.includes(Section::Clients) {
            let rows = |dimension: ClientDimension| {
                let rows = stats.conversion_by(&[dimension], &client_filter);
                page_rows(sorted(rows, args.client_metric), page)
            };
            out.insert(
                "clients".to_owned(),
                json!({
                    "byTrainer": rows(ClientDimension::Trainer),
                    "byLocation": rows(ClientDimension::Location),
                    "byPaymentMethod": rows(ClientDimension::PaymentMethod),
                    "total": stats.conversion_totals(&client_filter),
                }),
            );
        }
        if args.section.includes(Section::Months) {
            let mom = stats.month_on_month(&session_filter, &client_filter);
            out.insert("months".to_owned(), serde_json::to_value(mom)?);
        }
        if args.section.includes(Section::Years) {
            out.insert("years".to_owned(), serde_json::to_value(stats.year_on_year(&session_filter))?);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut sections = vec![];
    if args.section.includes(Section::Classes) {
        sections.push(report::classes(&stats, &session_filter, args.class_metric, page));
    }
    if args.section.includes(Section::Trainers) {
        sections.push(report::trainers(&stats, args.trainer_metric, top));
    }
    if args.section.includes(Section::Clients) {
        sections.push(report::clients(&stats, &client_filter, args.client_metric, page));
    }
    if args.section.includes(Section::Months) {
        info!("Month on month through {}", MonthKey::current());
        let mom = stats.month_on_month(&session_filter, &client_filter);
        sections.push(report::months(&mom, args.class_metric));
    }
    if args.section.includes(Section::Years) {
        sections.push(report::years(&stats.year_on_year(&session_filter), args.class_metric));
    }
    println!("{}", sections.join("\n"));
    Ok(())
}
