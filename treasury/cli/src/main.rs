//! Treasury CLI - command-line access to the Modern Treasury API

use std::path::PathBuf;
use std::pin::pin;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::TryStreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use treasury_lib::options::with_cancellation;
use treasury_lib::{
    ApiClient, ApiClientBuilder, DocumentCreateParams, DocumentableCollection,
    ExpectedPaymentListParams, ExpectedPaymentStatus, Field, FilePart, PaymentOrderListParams,
    PaymentOrderStatus,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "treasury")]
#[command(about = "Command-line client for the Modern Treasury API", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// API base URL [default: production]
    #[arg(long, global = true, env = "MODERN_TREASURY_BASE_URL")]
    base_url: Option<String>,

    /// Retries after the first attempt
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Per-attempt timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment orders
    #[command(subcommand)]
    PaymentOrders(PaymentOrderCommand),

    /// Expected payments
    #[command(subcommand)]
    ExpectedPayments(ExpectedPaymentCommand),

    /// Documents
    #[command(subcommand)]
    Documents(DocumentCommand),
}

#[derive(Subcommand)]
enum PaymentOrderCommand {
    /// Show one payment order
    Get {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List payment orders
    List {
        /// Filter by status (e.g. approved, needs_approval)
        #[arg(long)]
        status: Option<PaymentOrderStatus>,

        /// Page size
        #[arg(long)]
        per_page: Option<i64>,

        /// Follow cursors and print every page
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ExpectedPaymentCommand {
    /// Show one expected payment
    Get {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List expected payments
    List {
        /// Filter by status (archived, reconciled, unreconciled)
        #[arg(long)]
        status: Option<ExpectedPaymentStatus>,

        /// Page size
        #[arg(long)]
        per_page: Option<i64>,

        /// Follow cursors and print every page
        #[arg(long)]
        all: bool,
    },

    /// Delete an expected payment
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Subcommand)]
enum DocumentCommand {
    /// Upload a file and attach it to an object
    Upload {
        /// File to upload
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Id of the object the document belongs to
        #[arg(long)]
        documentable_id: String,

        /// Collection of that object (e.g. payment_orders, counterparties)
        #[arg(long)]
        documentable_type: DocumentableCollection,

        /// Free-form document category
        #[arg(long)]
        document_type: Option<String>,
    },
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,treasury_lib=info".to_string(),
            2 => "info,treasury_lib=debug".to_string(),
            _ => "debug,treasury_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(false)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_client(
    cli: &Cli,
    cancel: &CancellationToken,
) -> Result<ApiClient, Box<dyn std::error::Error>> {
    let mut builder = ApiClientBuilder::from_env()?.option(with_cancellation(cancel));
    if let Some(url) = &cli.base_url {
        builder = builder.base_url(url.as_str());
    }
    if let Some(max_retries) = cli.max_retries {
        builder = builder.max_retries(max_retries);
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

async fn payment_orders(client: &ApiClient, command: PaymentOrderCommand) -> CliResult {
    let service = client.payment_orders();
    match command {
        PaymentOrderCommand::Get { id } => print_json(&service.get(&id, &[]).await?),
        PaymentOrderCommand::List {
            status,
            per_page,
            all,
        } => {
            let params = PaymentOrderListParams {
                status: Field::from_option(status),
                per_page: Field::from_option(per_page),
                ..Default::default()
            };
            if all {
                let mut stream = pin!(service.list_auto_paging(&params, &[])?);
                while let Some(order) = stream.try_next().await? {
                    println!("{}", serde_json::to_string(&order)?);
                }
                Ok(())
            } else {
                let page = service.list(&params, &[]).await?;
                print_json(&page.items())?;
                if let Some(cursor) = page.after_cursor() {
                    eprintln!("next cursor: {cursor}");
                }
                Ok(())
            }
        }
    }
}

async fn expected_payments(client: &ApiClient, command: ExpectedPaymentCommand) -> CliResult {
    let service = client.expected_payments();
    match command {
        ExpectedPaymentCommand::Get { id } => print_json(&service.get(&id, &[]).await?),
        ExpectedPaymentCommand::List {
            status,
            per_page,
            all,
        } => {
            let params = ExpectedPaymentListParams {
                status: Field::from_option(status),
                per_page: Field::from_option(per_page),
                ..Default::default()
            };
            if all {
                let mut stream = pin!(service.list_auto_paging(&params, &[])?);
                while let Some(payment) = stream.try_next().await? {
                    println!("{}", serde_json::to_string(&payment)?);
                }
                Ok(())
            } else {
                let page = service.list(&params, &[]).await?;
                print_json(&page.items())?;
                if let Some(cursor) = page.after_cursor() {
                    eprintln!("next cursor: {cursor}");
                }
                Ok(())
            }
        }
        ExpectedPaymentCommand::Delete { id } => print_json(&service.delete(&id, &[]).await?),
    }
}

async fn documents(client: &ApiClient, command: DocumentCommand) -> CliResult {
    match command {
        DocumentCommand::Upload {
            file,
            documentable_id,
            documentable_type,
            document_type,
        } => {
            let file = FilePart::from_path(&file).await?;
            let mut params = DocumentCreateParams::new(documentable_id, documentable_type, file);
            params.document_type = Field::from_option(document_type);
            print_json(&client.documents().create(&params, &[]).await?)
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json_logs);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling in-flight request");
            on_signal.cancel();
        }
    });

    let client = match build_client(&cli, &cancel) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::PaymentOrders(command) => payment_orders(&client, command).await,
        Commands::ExpectedPayments(command) => expected_payments(&client, command).await,
        Commands::Documents(command) => documents(&client, command).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
