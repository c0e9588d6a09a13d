use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use role_data::{ExplorerClient, RpcClient};
use role_scan::{scan_receipts, scan_topics, ScanFlags, ScanReport, ROLE_GRANTED_TOPIC};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "role-scan")]
#[command(about = "Scan AccessControl role grants and revocations on EVM chains")]
#[command(version)]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Log)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// How the decoded events are reported once the scan finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Tracing lines only.
    Log,
    /// comfy-table summary on stdout.
    Table,
    /// Pretty JSON array on stdout.
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find RoleGranted logs via the explorer, then decode them from full receipts.
    Receipts(ReceiptsArgs),
    /// Read RoleGranted and RoleRevoked straight from explorer log topics.
    Topics(TopicsArgs),
}

/// Explorer and contract flags shared by both scans.
#[derive(Args, Debug)]
struct ExplorerArgs {
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    etherscan_api_key: Option<String>,

    #[arg(long, env = "ETHERSCAN_BASE_URL")]
    etherscan_base_url: Option<String>,

    /// Address of the AccessControl contract.
    #[arg(long)]
    sc_address: Option<String>,
}

#[derive(Args, Debug)]
struct ReceiptsArgs {
    #[arg(long, env = "RPC_URL")]
    rpc_url: Option<String>,

    #[command(flatten)]
    explorer: ExplorerArgs,

    /// topic0 to search for.
    #[arg(long, default_value_t = ROLE_GRANTED_TOPIC.to_string())]
    topic: String,

    #[arg(long, default_value_t = 0)]
    from_block: u64,

    /// Last block to scan; 0 scans up to the chain head.
    #[arg(long, default_value_t = 0)]
    to_block: u64,
}

#[derive(Args, Debug)]
struct TopicsArgs {
    #[command(flatten)]
    explorer: ExplorerArgs,

    #[arg(long)]
    from_block: Option<u64>,

    #[arg(long)]
    to_block: Option<u64>,
}

impl ReceiptsArgs {
    fn into_flags(self) -> ScanFlags {
        ScanFlags {
            rpc_url: self.rpc_url,
            etherscan_api_key: self.explorer.etherscan_api_key,
            etherscan_base_url: self.explorer.etherscan_base_url,
            sc_address: self.explorer.sc_address,
            topic: Some(self.topic),
            from_block: Some(self.from_block),
            to_block: Some(self.to_block),
        }
    }
}

impl TopicsArgs {
    fn into_flags(self) -> ScanFlags {
        ScanFlags {
            etherscan_api_key: self.explorer.etherscan_api_key,
            etherscan_base_url: self.explorer.etherscan_base_url,
            sc_address: self.explorer.sc_address,
            from_block: self.from_block,
            to_block: self.to_block,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let report = match cli.command {
        Commands::Receipts(args) => handle_receipts(args).await?,
        Commands::Topics(args) => handle_topics(args).await?,
    };

    match cli.output {
        OutputFormat::Log => {}
        OutputFormat::Table => print_events_table(&report),
        OutputFormat::Json => print_events_json(&report)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

/// Receipt scan: explorer discovery, receipt fetch and `RoleGranted` decoding.
///
/// # Errors
/// Returns error on invalid flags or any explorer or RPC failure.
async fn handle_receipts(args: ReceiptsArgs) -> Result<ScanReport> {
    let request = args
        .into_flags()
        .validate_receipts()
        .wrap_err("invalid receipts arguments")?;

    let rpc_url = request
        .rpc_url
        .as_deref()
        .ok_or_else(|| eyre!("RPC URL is required."))?;
    let chain = RpcClient::connect(rpc_url).wrap_err("failed to create RPC client")?;
    let explorer = ExplorerClient::new(&request.explorer_base_url, &request.explorer_api_key)
        .wrap_err("failed to create explorer client")?;

    let report = scan_receipts(&chain, &explorer, &request)
        .await
        .wrap_err("receipt scan failed")?;

    info!(
        contract = %request.contract_address,
        events = report.events.len(),
        logs = report.logs_discovered,
        transactions = report.transactions,
        skipped = report.skipped,
        "receipts command finished"
    );
    Ok(report)
}

/// Direct-topic scan over `RoleGranted` then `RoleRevoked`.
///
/// # Errors
/// Returns error on invalid flags, explorer failure or a log with too few topics.
async fn handle_topics(args: TopicsArgs) -> Result<ScanReport> {
    let request = args
        .into_flags()
        .validate_topics()
        .wrap_err("invalid topics arguments")?;

    let explorer = ExplorerClient::new(&request.explorer_base_url, &request.explorer_api_key)
        .wrap_err("failed to create explorer client")?;

    let report = scan_topics(&explorer, &request)
        .await
        .wrap_err("topic scan failed")?;

    info!(
        contract = %request.contract_address,
        events = report.events.len(),
        logs = report.logs_discovered,
        "topics command finished"
    );
    Ok(report)
}

fn print_events_table(report: &ScanReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Event",
        "Block",
        "Transaction",
        "Role",
        "Account",
        "Sender",
    ]);

    for event in &report.events {
        table.add_row(vec![
            event.kind.event_name().to_string(),
            event.block_number.to_string(),
            event.transaction_hash.to_string(),
            event.role.to_string(),
            format!("{:#x}", event.account),
            format!("{:#x}", event.sender),
        ]);
    }

    println!("{}\n", table);

    println!("Summary:");
    println!("  Events:           {}", report.events.len());
    println!("  Logs discovered:  {}", report.logs_discovered);
    println!("  Transactions:     {}", report.transactions);
    println!("  Receipt logs:     {}", report.receipt_logs);
    println!("  Skipped:          {}\n", report.skipped);
}

fn print_events_json(report: &ScanReport) -> Result<()> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct JsonEvent {
        event: &'static str,
        block_number: u64,
        transaction_hash: String,
        contract: String,
        role: String,
        account: String,
        sender: String,
    }

    let events: Vec<JsonEvent> = report
        .events
        .iter()
        .map(|event| JsonEvent {
            event: event.kind.event_name(),
            block_number: event.block_number,
            transaction_hash: event.transaction_hash.to_string(),
            contract: format!("{:#x}", event.contract),
            role: event.role.to_string(),
            account: format!("{:#x}", event.account),
            sender: format!("{:#x}", event.sender),
        })
        .collect();

    let json_str = serde_json::to_string_pretty(&events).wrap_err("failed to serialize JSON")?;
    println!("{}", json_str);

    Ok(())
}
