use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Currency, Engine, ExpenseShare, Money, PostExpenseCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "fairsplit_admin")]
#[command(about = "Admin utilities for FairSplit (inspect and fix group ledgers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./fairsplit.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Group(Group),
    User(User),
    Expense(Expense),
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    /// Open debts of a group.
    Balances(GroupArgs),
    /// Suggested transfers settling a group.
    Simplify(GroupArgs),
    /// Show budget and spending.
    Stats(GroupArgs),
    /// Set the budget, in major units of `--currency`.
    Budget(BudgetArgs),
}

#[derive(Args, Debug)]
struct GroupArgs {
    #[arg(long)]
    group: String,
}

#[derive(Args, Debug)]
struct BudgetArgs {
    #[arg(long)]
    group: String,
    #[arg(long)]
    amount: String,
    #[arg(long, default_value = "INR")]
    currency: String,
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Open debts of a user across groups.
    Summary(UserArgs),
    /// Requests waiting on a user.
    Pending(UserArgs),
}

#[derive(Args, Debug)]
struct UserArgs {
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug)]
struct Expense {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// Post an expense, e.g. `--share alice=10.00 --share bob=5`.
    Post(ExpensePostArgs),
}

#[derive(Args, Debug)]
struct ExpensePostArgs {
    #[arg(long)]
    group: String,
    #[arg(long)]
    payer: String,
    #[arg(long, default_value = "INR")]
    currency: String,
    #[arg(long = "share", required = true)]
    shares: Vec<String>,
}

fn parse_share(raw: &str, currency: Currency) -> Result<ExpenseShare, Box<dyn Error + Send + Sync>> {
    let Some((user, amount)) = raw.split_once('=') else {
        return Err(format!("invalid share (expected user=amount): {raw}").into());
    };
    Ok(ExpenseShare::new(user, Money::parse(amount, currency)?))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Group(Group { command }) => match command {
            GroupCommand::Balances(args) => {
                for debt in engine.group_balances(&args.group).await? {
                    println!(
                        "{} owes {} {} {} [{}] ({})",
                        debt.ower_id,
                        debt.owed_to_id,
                        debt.amount.to_major_string(debt.currency),
                        debt.currency,
                        debt.status.as_str(),
                        debt.id
                    );
                }
            }
            GroupCommand::Simplify(args) => {
                for transfer in engine.simplify(&args.group).await? {
                    println!(
                        "{} -> {}: {} {}",
                        transfer.from,
                        transfer.to,
                        transfer.amount.to_major_string(transfer.currency),
                        transfer.currency
                    );
                }
            }
            GroupCommand::Stats(args) => {
                let stats = engine.group_stats(&args.group).await?;
                println!(
                    "budget {} / spent {} / left {} (minor units)",
                    stats.budget.minor(),
                    stats.spent.minor(),
                    stats.money_left().minor()
                );
            }
            GroupCommand::Budget(args) => {
                let currency = Currency::try_from(args.currency.as_str())?;
                let budget = Money::parse(&args.amount, currency)?;
                let stats = engine.set_group_budget(&args.group, budget).await?;
                println!(
                    "budget of {} set to {} {currency}",
                    stats.group_id,
                    stats.budget.to_major_string(currency)
                );
            }
        },
        Command::User(User { command }) => match command {
            UserCommand::Summary(args) => {
                let summary = engine.user_summary(&args.user).await?;
                for totals in &summary.totals {
                    println!(
                        "{}: owes {} / owed {} / net {}",
                        totals.currency,
                        totals.owed.to_major_string(totals.currency),
                        totals.receivable.to_major_string(totals.currency),
                        totals.net().to_major_string(totals.currency)
                    );
                }
            }
            UserCommand::Pending(args) => {
                for pending in engine.list_pending_for(&args.user).await? {
                    println!(
                        "{} {} from {} on {} {} ({})",
                        pending.request.kind.as_str(),
                        pending.request.id,
                        pending.request.requested_by,
                        pending.debt_amount.to_major_string(pending.currency),
                        pending.currency,
                        pending.request.debt_id
                    );
                }
            }
        },
        Command::Expense(Expense {
            command: ExpenseCommand::Post(args),
        }) => {
            let currency = Currency::try_from(args.currency.as_str())?;
            let shares = args
                .shares
                .iter()
                .map(|raw| parse_share(raw, currency))
                .collect::<Result<Vec<_>, _>>()?;
            engine
                .post_expense(PostExpenseCmd::new(&args.group, currency, &args.payer).shares(shares))
                .await?;
            println!("posted expense in {} paid by {}", args.group, args.payer);
        }
    }

    Ok(())
}
