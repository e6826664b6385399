use bankledger::application::engine::{LedgerConfig, LedgerEngine};
use bankledger::domain::account::AccountId;
use bankledger::error::{LedgerError, Result};
use bankledger::interfaces::csv::balance_writer::BalanceWriter;
use bankledger::interfaces::csv::operation_reader::{Operation, OperationKind, OperationReader};
use clap::Parser;
use miette::{IntoDiagnostic, Result as CliResult};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input operations CSV file (op, account, counterparty, amount, description)
    input: PathBuf,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = LedgerEngine::in_memory(LedgerConfig::default());

    // The file numbers accounts its own way; map those to ledger ids as
    // `open` rows come through.
    let mut ids: HashMap<u64, AccountId> = HashMap::new();

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => {
                if let Err(e) = apply(&engine, &mut ids, op).await {
                    eprintln!("Error applying operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    let accounts = engine.accounts().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_accounts(&accounts).into_diagnostic()?;

    Ok(())
}

async fn apply(
    engine: &LedgerEngine,
    ids: &mut HashMap<u64, AccountId>,
    op: Operation,
) -> Result<()> {
    let description = op.description.as_deref().unwrap_or_default();
    match op.op {
        OperationKind::Open => {
            let id = engine.open_account(op.amount).await?;
            ids.insert(op.account, id);
        }
        OperationKind::Deposit => {
            let account = resolve(ids, op.account)?;
            engine.deposit(account, op.amount, description).await?;
        }
        OperationKind::Withdrawal => {
            let account = resolve(ids, op.account)?;
            engine.withdraw(account, op.amount, description).await?;
        }
        OperationKind::Transfer => {
            let sender = resolve(ids, op.account)?;
            let receiver = op.counterparty.ok_or_else(|| {
                LedgerError::InvalidAmount("transfer requires a counterparty".into())
            })?;
            let receiver = resolve(ids, receiver)?;
            engine
                .transfer(sender, receiver, op.amount, description)
                .await?;
        }
    }
    Ok(())
}

fn resolve(ids: &HashMap<u64, AccountId>, key: u64) -> Result<AccountId> {
    ids.get(&key)
        .copied()
        .ok_or(LedgerError::AccountNotFound(AccountId(key)))
}
