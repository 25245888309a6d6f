use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portal_core::booking::{
    BookingKind, admission_request, appointment_request, televisit_request,
};
use portal_core::config::{
    page_size_from_env_value, resolve_fixtures_path, retention_days_from_env_value,
};
use portal_core::constants::{LIST_PATIENT_DIRECTORY, SLOT_PATIENT};
use portal_core::stats::{AdmissionSummary, PaymentSummary, status_breakdown};
use portal_core::validation::{parse_id, window_from_days};
use portal_core::{
    CascadeSelector, Criteria, DataSource, FilterParams, InMemoryStore, ListView, Mutable,
    PortalError, PortalStores, Position, Reference, ResourceKind, ViewConfig,
};
use portal_models::{Admission, AdmissionType, Appointment, Televisit, VisitType};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Care portal list and booking shell")]
struct Cli {
    /// Fixture document to seed the in-memory backend (overrides PORTAL_FIXTURES)
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of a filtered list
    List(ListArgs),
    /// Show summary figures for a list
    Stats {
        /// Resource to summarise (admissions, payments, audit-events, ...)
        resource: String,
    },
    /// Fill a booking form and submit it
    Book(BookArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Resource to list (admissions, appointments, televisits, payments, ...)
    resource: String,
    /// Keep records with this status (wire form, e.g. ACTIVE)
    #[arg(long)]
    status: Option<String>,
    /// Free-text search across the record's text fields
    #[arg(long)]
    search: Option<String>,
    /// Keep records stamped within the last N days
    #[arg(long)]
    within_days: Option<i64>,
    /// Keep records stamped at least N days ago
    #[arg(long)]
    older_than_days: Option<i64>,
    /// Only records belonging to this patient id
    #[arg(long)]
    subject: Option<String>,
    /// Page to show (1-based; out-of-range values are clamped)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    /// Records per page (defaults to PORTAL_PAGE_SIZE)
    #[arg(long)]
    page_size: Option<usize>,
    /// Print the page as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BookArgs {
    /// Booking form: admission, visit or televisit
    form: String,
    /// Slot selection as slot=id, applied in chain order
    #[arg(long = "select", value_parser = parse_pair)]
    selections: Vec<(String, String)>,
    /// Free-text field as field=value
    #[arg(long = "text", value_parser = parse_pair)]
    texts: Vec<(String, String)>,
    /// Admission type for admissions
    #[arg(long, default_value = "ELECTIVE")]
    admission_type: String,
    /// Visit type for visits
    #[arg(long, default_value = "IN_PERSON")]
    visit_type: String,
    /// Patient id for visits (the visit form has no patient slot)
    #[arg(long)]
    patient: Option<String>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Entry point for the portal shell.
///
/// Loads the fixture document into in-memory collaborators, then runs one command
/// against them.
///
/// # Environment Variables
/// - `PORTAL_FIXTURES`: fixture document (default: `fixtures/portal.yaml`)
/// - `PORTAL_PAGE_SIZE`: default page size (default: 10)
/// - `PORTAL_AUDIT_RETENTION_DAYS`: audit retention window in days (default: 90)
/// - `RUST_LOG`: log filter (default: `portal=info`)
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portal=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'portal --help' for commands");
        return Ok(());
    };

    let page_size = page_size_from_env_value(std::env::var("PORTAL_PAGE_SIZE").ok())?;
    let retention_days =
        retention_days_from_env_value(std::env::var("PORTAL_AUDIT_RETENTION_DAYS").ok())?;
    let config = Arc::new(ViewConfig::new(page_size, Position::Head, retention_days)?);

    let override_path = cli
        .fixtures
        .or_else(|| std::env::var("PORTAL_FIXTURES").ok().map(PathBuf::from));
    let path = resolve_fixtures_path(override_path)?;
    let stores = PortalStores::load(&path)
        .with_context(|| format!("loading fixtures from {}", path.display()))?;
    tracing::info!("++ Loaded fixtures from {}", path.display());

    match command {
        Commands::List(args) => run_list(&stores, config, &args).await,
        Commands::Stats { resource } => run_stats(&stores, &config, &resource).await,
        Commands::Book(args) => run_book(&stores, config, &args).await,
    }
}

// ============================================================================
// LIST
// ============================================================================

async fn run_list(
    stores: &PortalStores,
    config: Arc<ViewConfig>,
    args: &ListArgs,
) -> anyhow::Result<()> {
    let kind = ResourceKind::from_str(&args.resource)?;
    match kind {
        ResourceKind::Admissions => list_records(&stores.admissions, config, args).await,
        ResourceKind::Appointments => list_records(&stores.appointments, config, args).await,
        ResourceKind::Televisits => list_records(&stores.televisits, config, args).await,
        ResourceKind::Payments => list_records(&stores.payments, config, args).await,
        ResourceKind::Prescriptions => list_records(&stores.prescriptions, config, args).await,
        ResourceKind::Consents => list_records(&stores.consents, config, args).await,
        ResourceKind::AuditEvents => list_records(&stores.audit_events, config, args).await,
        ResourceKind::Notifications => list_records(&stores.notifications, config, args).await,
    }
}

fn criteria_from_args<E>(args: &ListArgs) -> anyhow::Result<Criteria<E>>
where
    E: Mutable,
    E::Status: FromStr,
    <E::Status as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let mut criteria = Criteria::<E>::new();
    if let Some(status) = &args.status {
        criteria = criteria.with_status(status.parse()?);
    }
    if let Some(query) = &args.search {
        criteria = criteria.with_search(query)?;
    }
    if let Some(days) = args.within_days {
        criteria = criteria.within(window_from_days(days)?);
    }
    if let Some(days) = args.older_than_days {
        criteria = criteria.older_than(window_from_days(days)?);
    }
    Ok(criteria)
}

async fn list_records<E>(
    store: &InMemoryStore<E>,
    config: Arc<ViewConfig>,
    args: &ListArgs,
) -> anyhow::Result<()>
where
    E: Mutable + Serialize,
    E::Status: FromStr,
    <E::Status as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let params = match &args.subject {
        Some(subject) => FilterParams::for_subject(parse_id(subject)?),
        None => FilterParams::new(),
    };

    let mut view = ListView::<E>::new(config).with_params(params);
    if let Err(err) = view.load(store).await {
        eprintln!("{}", view.error_message().unwrap_or("failed to load"));
        return Err(err.into());
    }

    view.set_criteria(criteria_from_args::<E>(args)?);
    if let Some(size) = args.page_size {
        view.set_page_size(size)?;
    }
    view.set_page(args.page);

    let page = view.visible();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
        return Ok(());
    }

    if page.items.is_empty() {
        println!("No {} found.", E::KIND);
        return Ok(());
    }
    for record in &page.items {
        let at = record
            .timestamp()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>6}  {:<12}  {:<16}  {}",
            record.id(),
            record.status(),
            at,
            record.search_fields().join(" | ")
        );
    }
    println!(
        "Page {} of {} ({} matching)",
        page.page_index, page.total_pages, page.total_items
    );
    Ok(())
}

// ============================================================================
// STATS
// ============================================================================

async fn run_stats(
    stores: &PortalStores,
    config: &ViewConfig,
    resource: &str,
) -> anyhow::Result<()> {
    let params = FilterParams::new();
    let kind = ResourceKind::from_str(resource)?;
    match kind {
        ResourceKind::Admissions => {
            let list = fetch(&stores.admissions, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
            let summary = AdmissionSummary::from_admissions(&list);
            match summary.average_stay {
                Some(stay) => println!("Average stay: {:.1} days", stay.num_hours() as f64 / 24.0),
                None => println!("Average stay: n/a"),
            }
        }
        ResourceKind::Payments => {
            let list = fetch(&stores.payments, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
            println!("{}", serde_json::to_string_pretty(&PaymentSummary::from_payments(&list))?);
        }
        ResourceKind::AuditEvents => {
            let list = fetch(&stores.audit_events, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
            let expired = Criteria::new().older_than(config.audit_retention());
            let count = portal_core::filter::filter(&list, &expired).len();
            println!(
                "Older than {} days: {count}",
                config.audit_retention_days()
            );
        }
        ResourceKind::Appointments => {
            let list = fetch(&stores.appointments, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
        }
        ResourceKind::Televisits => {
            let list = fetch(&stores.televisits, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
        }
        ResourceKind::Prescriptions => {
            let list = fetch(&stores.prescriptions, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
        }
        ResourceKind::Consents => {
            let list = fetch(&stores.consents, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
        }
        ResourceKind::Notifications => {
            let list = fetch(&stores.notifications, &params).await?;
            print_breakdown(kind, status_breakdown(&list).iter());
        }
    }
    Ok(())
}

async fn fetch<E: Mutable>(
    store: &InMemoryStore<E>,
    params: &FilterParams,
) -> anyhow::Result<Vec<E>> {
    Ok(store.fetch_list(E::KIND, params).await?)
}

fn print_breakdown<'a, K: std::fmt::Display + 'a>(
    kind: ResourceKind,
    counts: impl Iterator<Item = (&'a K, usize)>,
) {
    println!("{kind}:");
    let mut total = 0;
    for (status, count) in counts {
        println!("  {status:<12} {count}");
        total += count;
    }
    println!("  {:<12} {total}", "TOTAL");
}

// ============================================================================
// BOOK
// ============================================================================

async fn run_book(
    stores: &PortalStores,
    config: Arc<ViewConfig>,
    args: &BookArgs,
) -> anyhow::Result<()> {
    let kind = BookingKind::from_str(&args.form)?;
    let mut selector = CascadeSelector::new(kind.chain()?);
    selector.load_roots(&stores.options).await;

    for (slot, _) in &args.selections {
        selector.chain().index_of(slot)?;
    }

    // Chain order, whatever order the flags came in.
    let order: Vec<String> = selector
        .chain()
        .slots()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    for slot in &order {
        let Some((_, raw)) = args.selections.iter().find(|(name, _)| name == slot) else {
            continue;
        };
        let id = parse_id(raw)?;
        selector.choose(&stores.options, slot, Some(id)).await?;

        for later in &order {
            if let Some(message) = selector.error_message(later)? {
                bail!("could not load {later} options: {message}");
            }
        }
    }

    for (field, value) in &args.texts {
        selector.set_text(field, value)?;
    }

    let payload = selector.payload().map_err(PortalError::Validation)?;

    match kind {
        BookingKind::Admission => {
            let admission_type = AdmissionType::from_str(&args.admission_type)?;
            let request = admission_request(&payload, admission_type)?;
            let mut view = ListView::<Admission>::new(config);
            view.load(&stores.admissions).await?;
            let created = view.create_default(&stores.admissions, request).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        BookingKind::Visit => {
            let visit_type = VisitType::from_str(&args.visit_type)?;
            let patient = visit_patient(stores, args.patient.as_deref())?;
            let request = appointment_request(&payload, patient, visit_type)?;
            let mut view = ListView::<Appointment>::new(config);
            view.load(&stores.appointments).await?;
            let created = view.create_default(&stores.appointments, request).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        BookingKind::Televisit => {
            let request = televisit_request(&payload)?;
            let mut view = ListView::<Televisit>::new(config);
            view.load(&stores.televisits).await?;
            let created = view.create_default(&stores.televisits, request).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
    }
    Ok(())
}

/// Resolves the `--patient` id against the catalogue's patient lists.
fn visit_patient(stores: &PortalStores, raw: Option<&str>) -> anyhow::Result<Reference> {
    let Some(raw) = raw else {
        bail!("--patient is required for visits");
    };
    let id = parse_id(raw)?;
    let catalogue = stores.options.catalogue();
    let option = catalogue
        .find(LIST_PATIENT_DIRECTORY, &id)
        .or_else(|| catalogue.find(SLOT_PATIENT, &id))
        .with_context(|| format!("unknown patient {id}"))?;
    Ok(Reference::from(option))
}
