use chrono::Utc;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rentflow::application::activation::ActivationTrigger;
use rentflow::application::dashboard::DashboardReadModel;
use rentflow::application::orchestrator::PaymentOrchestrator;
use rentflow::application::signing::LeaseSigning;
use rentflow::application::tracker::PaymentTracker;
use rentflow::application::wallets::WalletService;
use rentflow::domain::lease::Lease;
use rentflow::domain::ports::{LeaseStoreRef, PaymentStoreRef, WalletStoreRef};
use rentflow::domain::wallet::Wallet;
use rentflow::infrastructure::gateway::{LoggingPromoter, ScriptedGateway};
use rentflow::infrastructure::in_memory::{
    InMemoryLeaseStore, InMemoryPaymentStore, InMemoryWalletStore,
};
use rentflow::interfaces::csv::command_reader::{Command, ScenarioReader};
use rentflow::interfaces::csv::report_writer::ReportWriter;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scenario CSV file to replay
    scenario: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

type Stores = (LeaseStoreRef, PaymentStoreRef, WalletStoreRef);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryLeaseStore::new()),
        Arc::new(InMemoryPaymentStore::new()),
        Arc::new(InMemoryWalletStore::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn persistent_stores(path: &std::path::Path) -> Result<Stores> {
    let ledger =
        rentflow::infrastructure::rocksdb::RocksDbLedger::open(path).into_diagnostic()?;
    Ok((
        Arc::new(ledger.clone()),
        Arc::new(ledger.clone()),
        Arc::new(ledger),
    ))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn persistent_stores(_path: &std::path::Path) -> Result<Stores> {
    Err(miette::miette!(
        "this build has no persistent storage; rebuild with --features storage-rocksdb"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let (leases, payments, wallets) = match &cli.db_path {
        Some(path) => persistent_stores(path)?,
        None => in_memory_stores(),
    };

    let gateway = Arc::new(ScriptedGateway::new());
    let tracker = PaymentTracker::new(leases.clone(), payments.clone());
    let activation = ActivationTrigger::new(
        leases.clone(),
        tracker.clone(),
        Arc::new(LoggingPromoter),
    );
    let wallet_service = WalletService::new(wallets.clone());
    let orchestrator = PaymentOrchestrator::new(
        payments.clone(),
        leases.clone(),
        wallet_service.clone(),
        gateway.clone(),
        activation,
    );
    let signing = LeaseSigning::new(leases.clone(), payments.clone());
    let dashboard = DashboardReadModel::new(tracker);

    // Replay the scenario. Row failures are reported and skipped; a failed
    // settlement is a normal outcome, not a reason to abort the run.
    let file = File::open(&cli.scenario).into_diagnostic()?;
    for command in ScenarioReader::new(file).commands() {
        match command {
            Ok(command) => {
                if let Err(e) =
                    run_command(command, &signing, &wallet_service, &orchestrator, &gateway).await
                {
                    eprintln!("Error processing row: {e}");
                }
            }
            Err(e) => eprintln!("Error reading row: {e}"),
        }
    }

    // Final ledger state.
    let now = Utc::now();
    let mut overviews = Vec::new();
    for lease in leases.all().await.into_diagnostic()? {
        overviews.push(
            dashboard
                .lease_overview(&lease.id, now)
                .await
                .into_diagnostic()?,
        );
    }
    let all_payments = payments.all().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer
        .write_report(overviews, all_payments)
        .into_diagnostic()?;

    Ok(())
}

async fn run_command(
    command: Command,
    signing: &LeaseSigning,
    wallet_service: &WalletService,
    orchestrator: &PaymentOrchestrator,
    gateway: &ScriptedGateway,
) -> rentflow::error::Result<()> {
    match command {
        Command::CreateLease {
            id,
            tenant,
            property,
            rent,
            deposit,
            landlord_address,
        } => {
            signing
                .create_lease(Lease::new(
                    id,
                    tenant,
                    property,
                    rent,
                    deposit,
                    landlord_address,
                    Utc::now(),
                ))
                .await
        }
        Command::Sign { lease, party } => signing.sign(&lease, party).await.map(|_| ()),
        Command::RegisterWallet {
            id,
            owner,
            address,
            kind,
        } => {
            wallet_service
                .register(Wallet::new(id, owner, address, kind))
                .await
        }
        Command::SetPrimary { owner, wallet } => wallet_service.set_primary(&owner, &wallet).await,
        Command::Initiate {
            payment,
            wallet,
            outcome,
        } => {
            gateway.push(outcome).await;
            orchestrator
                .initiate(&payment, wallet.as_deref())
                .await
                .map(|_| ())
        }
    }
}
