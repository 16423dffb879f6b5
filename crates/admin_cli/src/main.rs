use std::error::Error;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{ApplyCmd, Engine, EngineError, Money, TransactionKind, WalletAudit};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "wallet_admin")]
#[command(about = "Admin utilities for the wallet ledger (migrate, inspect, audit)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./wallet.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the schema and exit.
    Migrate(MigrateArgs),
    /// Print the current balance of a wallet.
    Balance(WalletArgs),
    /// Print the transactions of a wallet, newest first.
    History(WalletArgs),
    /// Compare stored balances with the sum of their transactions.
    ///
    /// Without a wallet id every wallet is checked.
    Audit(AuditArgs),
    Credit(ApplyArgs),
    Debit(ApplyArgs),
}

#[derive(Args, Debug)]
struct MigrateArgs {
    #[arg(value_enum, default_value_t = MigrateAction::Up)]
    action: MigrateAction,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MigrateAction {
    /// Apply pending migrations.
    Up,
    /// Roll back every migration.
    Down,
    /// Drop all tables and apply every migration again.
    Fresh,
    /// List applied and pending migrations.
    Status,
}

#[derive(Args, Debug)]
struct WalletArgs {
    wallet_id: String,
}

#[derive(Args, Debug)]
struct AuditArgs {
    wallet_id: Option<String>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    wallet_id: String,
    /// Decimal amount, e.g. `12.50`.
    amount: String,
}

async fn migrate(
    db: &DatabaseConnection,
    action: MigrateAction,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match action {
        MigrateAction::Up => Migrator::up(db, None).await?,
        MigrateAction::Down => Migrator::down(db, None).await?,
        MigrateAction::Fresh => Migrator::fresh(db).await?,
        MigrateAction::Status => Migrator::status(db).await?,
    }
    Ok(())
}

fn print_audit(audit: &WalletAudit) {
    let status = if audit.is_consistent() {
        "ok"
    } else {
        "MISMATCH"
    };
    println!(
        "{status}\t{}\trecorded={}\tledger={}\ttransactions={}",
        audit.wallet_id, audit.recorded, audit.ledger, audit.transactions
    );
}

async fn apply(
    engine: &Engine,
    args: ApplyArgs,
    kind: TransactionKind,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let amount = match args.amount.parse::<Money>() {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    match engine
        .apply(ApplyCmd::new(args.wallet_id, amount, kind))
        .await
    {
        Ok(tx) => {
            println!(
                "recorded {} #{}: {} on {}",
                tx.kind, tx.id, tx.amount, tx.wallet_id
            );
            Ok(())
        }
        Err(err @ (EngineError::InvalidArgument(_) | EngineError::InsufficientBalance { .. })) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    if let Command::Migrate(args) = &cli.command {
        migrate(&db, args.action).await?;
        if args.action != MigrateAction::Status {
            println!("migrate {:?}: done", args.action);
        }
        return Ok(());
    }
    Migrator::up(&db, None).await?;

    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate(_) => {}
        Command::Balance(args) => match engine.balance(&args.wallet_id).await {
            Ok(wallet) => println!("{}\t{}", wallet.id, wallet.balance),
            Err(EngineError::NotFound(id)) => {
                eprintln!("wallet not found: {id}");
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        },
        Command::History(args) => {
            for tx in engine.list_transactions(&args.wallet_id).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    tx.id,
                    tx.timestamp.to_rfc3339(),
                    tx.kind,
                    tx.amount
                );
            }
        }
        Command::Audit(args) => {
            let wallet_ids = match args.wallet_id {
                Some(id) => vec![id],
                None => engine.wallet_ids().await?,
            };

            let mut consistent = true;
            for wallet_id in wallet_ids {
                let audit = engine.audit(&wallet_id).await?;
                print_audit(&audit);
                consistent &= audit.is_consistent();
            }

            if !consistent {
                std::process::exit(1);
            }
        }
        Command::Credit(args) => apply(&engine, args, TransactionKind::Credit).await?,
        Command::Debit(args) => apply(&engine, args, TransactionKind::Debit).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wallet_admin").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn migrate_defaults_to_up() {
        let cli = parse(&["--database-url", "sqlite::memory:", "migrate"]);
        assert!(matches!(
            cli.command,
            Command::Migrate(MigrateArgs {
                action: MigrateAction::Up
            })
        ));
    }

    #[test]
    fn migrate_accepts_every_action() {
        for (raw, action) in [
            ("up", MigrateAction::Up),
            ("down", MigrateAction::Down),
            ("fresh", MigrateAction::Fresh),
            ("status", MigrateAction::Status),
        ] {
            let cli = parse(&["--database-url", "sqlite::memory:", "migrate", raw]);
            match cli.command {
                Command::Migrate(args) => assert_eq!(args.action, action),
                other => panic!("unexpected command: {other:?}"),
            }
        }
        assert!(Cli::try_parse_from(["wallet_admin", "migrate", "sideways"]).is_err());
    }

    #[test]
    fn audit_id_is_optional() {
        let cli = parse(&["--database-url", "sqlite::memory:", "audit"]);
        assert!(matches!(
            cli.command,
            Command::Audit(AuditArgs { wallet_id: None })
        ));

        let cli = parse(&["--database-url", "sqlite::memory:", "credit", "w1", "12,50"]);
        match cli.command {
            Command::Credit(args) => {
                assert_eq!(args.wallet_id, "w1");
                assert_eq!(args.amount.parse::<Money>().unwrap(), Money::new(1250));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[tokio::test]
    async fn migrate_actions_run_against_a_database() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migrate(&db, MigrateAction::Up).await.unwrap();
        migrate(&db, MigrateAction::Status).await.unwrap();
        migrate(&db, MigrateAction::Down).await.unwrap();
        migrate(&db, MigrateAction::Fresh).await.unwrap();

        let engine = Engine::builder().database(db).build().await.unwrap();
        engine
            .apply(ApplyCmd::credit("w1", Money::new(100)))
            .await
            .unwrap();
    }
}
