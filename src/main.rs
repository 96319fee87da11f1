use clap::{Parser, ValueEnum};
use courseway::application::enrollment::EnrollmentCoordinator;
use courseway::application::progress::ProgressTracker;
use courseway::config::{
    DEFAULT_CANCEL_URL, DEFAULT_CURRENCY, DEFAULT_FEE_RATE, DEFAULT_SUCCESS_URL, EnrollmentConfig,
};
use courseway::domain::ports::{
    CompletionStoreBox, CourseCatalogBox, PaymentGatewayBox, UserStoreBox,
};
use courseway::infrastructure::in_memory::{
    InMemoryCompletionStore, InMemoryCourseCatalog, InMemoryUserStore,
};
use courseway::infrastructure::simulated_gateway::SimulatedGateway;
use courseway::infrastructure::stripe::{DEFAULT_API_BASE, DEFAULT_TIMEOUT, StripeCheckoutGateway};
use courseway::interfaces::csv::catalog_reader::CatalogReader;
use courseway::interfaces::csv::report_writer::ReportWriter;
use courseway::interfaces::csv::request_reader::RequestReader;
use courseway::interfaces::driver::RequestDriver;
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GatewayKind {
    /// In-process gateway; checkouts are settled by `settle`/`expire` rows.
    Simulated,
    /// Stripe Checkout through its REST API.
    Stripe,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests CSV file (action, user, course, lesson)
    requests: PathBuf,

    /// Course catalog CSV file (id, name, price, paid, instructor, payout_account)
    #[arg(long)]
    catalog: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = GatewayKind::Simulated)]
    gateway: GatewayKind,

    #[arg(long, env = "STRIPE_SECRET", hide_env_values = true)]
    stripe_secret: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    stripe_api_base: String,

    /// Platform share of paid enrollments
    #[arg(long, default_value_t = DEFAULT_FEE_RATE)]
    fee_rate: Decimal,

    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,

    #[arg(long, env = "STRIPE_SUCCESS_URL", default_value = DEFAULT_SUCCESS_URL)]
    success_url: String,

    #[arg(long, env = "STRIPE_CANCEL_URL", default_value = DEFAULT_CANCEL_URL)]
    cancel_url: String,
}

impl Cli {
    fn config(&self) -> Result<EnrollmentConfig> {
        if self.fee_rate < Decimal::ZERO || self.fee_rate > Decimal::ONE {
            return Err(miette!("--fee-rate must be between 0 and 1"));
        }
        Ok(EnrollmentConfig {
            fee_rate: self.fee_rate,
            currency: self.currency.clone(),
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        })
    }
}

struct Stores {
    users: UserStoreBox,
    catalog: CourseCatalogBox,
    completions: CompletionStoreBox,
}

fn in_memory_stores() -> Stores {
    Stores {
        users: Box::new(InMemoryUserStore::new()),
        catalog: Box::new(InMemoryCourseCatalog::new()),
        completions: Box::new(InMemoryCompletionStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&PathBuf>) -> Result<Stores> {
    use courseway::infrastructure::rocksdb::RocksDBStore;

    let Some(db_path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        users: Box::new(store.clone()),
        catalog: Box::new(store.clone()),
        completions: Box::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
        );
    }
    Ok(in_memory_stores())
}

fn open_gateway(cli: &Cli) -> Result<(PaymentGatewayBox, Option<SimulatedGateway>)> {
    match cli.gateway {
        GatewayKind::Simulated => {
            let gateway = SimulatedGateway::new();
            Ok((Box::new(gateway.clone()), Some(gateway)))
        }
        GatewayKind::Stripe => {
            let secret = cli
                .stripe_secret
                .clone()
                .ok_or_else(|| miette!("--gateway stripe needs --stripe-secret or STRIPE_SECRET"))?;
            let gateway =
                StripeCheckoutGateway::new(secret, cli.stripe_api_base.clone(), DEFAULT_TIMEOUT)
                    .into_diagnostic()?;
            Ok((Box::new(gateway), None))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let stores = open_stores(cli.db_path.as_ref())?;
    let (gateway, simulated) = open_gateway(&cli)?;

    // Seed the catalog
    let catalog_file = File::open(&cli.catalog).into_diagnostic()?;
    for course in CatalogReader::new(catalog_file).courses() {
        match course {
            Ok(course) => stores.catalog.store(course).await.into_diagnostic()?,
            Err(e) => warn!("Error reading course: {e}"),
        }
    }

    let coordinator = EnrollmentCoordinator::new(stores.users, stores.catalog, gateway, config);
    let tracker = ProgressTracker::new(stores.completions);
    let driver = RequestDriver::new(coordinator, tracker, simulated);

    // Process requests
    let file = File::open(&cli.requests).into_diagnostic()?;
    for request in RequestReader::new(file).requests() {
        match request {
            Ok(request) => {
                if let Err(e) = driver.handle(&request).await {
                    warn!("Error processing request: {e}");
                }
            }
            Err(e) => {
                warn!("Error reading request: {e}");
            }
        }
    }

    // Output final state
    let rows = driver.report().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_rows(rows).into_diagnostic()?;

    Ok(())
}
