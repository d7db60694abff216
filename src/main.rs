//! tillbook main entry point

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tillbook_config::{Config, QuickRange};
use tillbook_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use tillbook_core::reports::{
    CashLedgerReport, DashboardReport, ExpensesReport, HistoryLine, ImportSummary,
    OutstandingReport, RefundsReport, SalesReport, SupplierStatementReport, SuppliersReport,
};
use tillbook_core::{
    BalanceFilter, BalanceMode, Bookkeeper, Books, BooksStore, CoreError, DateFilter, EntityType,
    ExpenseDraft, Filter, SaleDraft, SupplierDraft, SupplierOrderDraft, TransactionType,
};
use tillbook_store::JsonSnapshotStore;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "tillbook")]
#[command(version = "0.1.0")]
#[command(about = "Bookkeeping for a small shop: sales, refunds, suppliers, expenses and cash", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "tillbook.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Search text and date criteria shared by the list views
#[derive(clap::Args, Debug, Default)]
struct ViewArgs {
    #[arg(short, long, default_value = "")]
    search: String,
    /// Quick range: all, today, week or month
    #[arg(short, long)]
    range: Option<QuickRange>,
    /// Inclusive start date, YYYY-MM-DD
    #[arg(long)]
    from: Option<String>,
    /// Inclusive end date, YYYY-MM-DD
    #[arg(long)]
    to: Option<String>,
}

#[derive(clap::Args, Debug)]
struct BalanceArgs {
    #[arg(short, long, default_value = "")]
    search: String,
    /// all, credit or debit
    #[arg(short, long, default_value = "all")]
    mode: BalanceMode,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration file
    InitConfig {
        #[arg(default_value = "tillbook.yaml")]
        path: PathBuf,
    },
    /// Global figures: cash, receivable, payable, profit
    Dashboard,
    /// Running cash ledger
    Cash(ViewArgs),
    Sales(ViewArgs),
    Refunds(ViewArgs),
    Expenses(ViewArgs),
    Suppliers(BalanceArgs),
    /// One supplier's statement
    Supplier {
        id: u64,
        #[command(flatten)]
        filter: BalanceArgs,
    },
    /// Sales customers still owe on
    Receivables(ViewArgs),
    /// Refunds still owed to customers
    Payables(ViewArgs),
    /// Sales total less refunded cash
    NetSales(ViewArgs),
    /// Edit history of one record
    History { entity: EntityType, id: u64 },
    /// Known customer names
    Names,
    /// Import sales from a CSV export
    ImportSales { csv: PathBuf },
    /// Set the opening cash balance
    Opening { amount: String },
    AddSale {
        #[arg(long)]
        customer: String,
        #[arg(long)]
        product: String,
        #[arg(long)]
        total: String,
        #[arg(long, default_value = "")]
        cash: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Refund against an invoice; customer and product come from the sale
    AddRefund {
        #[arg(long)]
        invoice: String,
        #[arg(long)]
        total: String,
        #[arg(long, default_value = "")]
        cash: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    AddSupplier {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(long, default_value = "")]
        debit: String,
        #[arg(long, default_value = "")]
        credit: String,
    },
    AddOrder {
        #[arg(long)]
        supplier: u64,
        #[arg(long)]
        customer: String,
        #[arg(long, default_value = "")]
        product: String,
        /// invoice, return, payment or refund
        #[arg(long = "type", default_value = "invoice")]
        transaction_type: TransactionType,
        #[arg(long, default_value = "")]
        credit: String,
        #[arg(long, default_value = "")]
        debit: String,
        #[arg(long)]
        date: Option<String>,
    },
    AddExpense {
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        cash: String,
        #[arg(long, default_value = "")]
        note: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Change fields of a sale; omitted fields keep their value
    EditSale {
        id: u64,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        total: Option<String>,
        #[arg(long)]
        cash: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    Delete { entity: EntityType, id: u64 },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_config(path: &Path) -> anyhow::Result<String> {
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(format!("Wrote {}", path.display()))
}

fn load_config(path: &Path) -> anyhow::Result<(Config, bool)> {
    if path.exists() {
        let config = Config::load(path.to_path_buf())
            .map_err(|e| anyhow::anyhow!(e.to_details().to_string()))?;
        Ok((config, true))
    } else {
        Ok((Config::default(), false))
    }
}

fn view_filter(keeper: &Bookkeeper, args: &ViewArgs) -> Filter {
    let mut filter = match args.range {
        Some(range) => Filter::new(
            args.search.clone(),
            DateFilter::new(range).with_spans(keeper.range_spans()),
        ),
        None => keeper.default_filter(args.search.clone()),
    };
    if args.from.is_some() {
        filter.dates.set_from(args.from.clone());
    }
    if args.to.is_some() {
        filter.dates.set_to(args.to.clone());
    }
    filter
}

fn date_or_today(date: &Option<String>, today: NaiveDate) -> String {
    date.clone().unwrap_or_else(|| today.format("%Y-%m-%d").to_string())
}

/// Log core errors with their code and swap in the detailed message
fn report(context: ErrorContext, error: anyhow::Error) -> anyhow::Error {
    match error.downcast::<CoreError>() {
        Ok(core) => {
            DefaultErrorLogger.log_error(&core, &context);
            anyhow::anyhow!(core.to_details().to_string())
        }
        Err(other) => other,
    }
}

fn json<T: Serialize>(value: &T) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run one command against the loaded books, committing any new snapshot
async fn run(keeper: &Bookkeeper, command: Command, today: NaiveDate) -> anyhow::Result<serde_json::Value> {
    let books = keeper.books();
    let fmt = keeper.money_format();

    match command {
        Command::InitConfig { path } => json(&init_config(&path)?),
        Command::Dashboard => json(&DashboardReport::build(&books.dashboard(keeper.opening_balance()), &fmt)),
        Command::Cash(args) => {
            let filter = view_filter(keeper, &args);
            let ledger = books.cash_ledger(keeper.opening_balance(), &filter, today);
            json(&CashLedgerReport::build(&ledger, filter.dates.description(), &fmt))
        }
        Command::Sales(args) => json(&SalesReport::build(&books.sales_view(&view_filter(keeper, &args), today), &fmt)),
        Command::Refunds(args) => {
            json(&RefundsReport::build(&books.refunds_view(&view_filter(keeper, &args), today), &fmt))
        }
        Command::Expenses(args) => {
            json(&ExpensesReport::build(&books.expenses_view(&view_filter(keeper, &args), today), &fmt))
        }
        Command::Suppliers(args) => {
            let filter = BalanceFilter::new(args.search, args.mode);
            json(&SuppliersReport::build(&books.suppliers_view(&filter), &fmt))
        }
        Command::Supplier { id, filter } => {
            let statement = books.supplier_statement(id, &BalanceFilter::new(filter.search, filter.mode))?;
            let order_count = books.supplier_orders.iter().filter(|o| o.supplier_id == id).count();
            json(&SupplierStatementReport::build(&statement, order_count, &fmt))
        }
        Command::Receivables(args) => json(&OutstandingReport::receivables(
            &books.receivables(&view_filter(keeper, &args), today),
            &fmt,
        )),
        Command::Payables(args) => json(&OutstandingReport::payables(
            &books.payables(&view_filter(keeper, &args), today),
            &fmt,
        )),
        Command::NetSales(args) => json(&fmt.format(books.net_sales(&view_filter(keeper, &args), today))),
        Command::History { entity, id } => {
            let lines: Vec<HistoryLine> = books.history(entity, id).into_iter().map(HistoryLine::build).collect();
            json(&lines)
        }
        Command::Names => json(&books.customer_names()),
        Command::ImportSales { csv } => {
            let report = keeper.import_csv(&csv, today).await?;
            json(&ImportSummary::from(&report))
        }
        Command::Opening { amount } => {
            let next = books.set_cash_opening(&amount);
            keeper.commit(next).await?;
            json(&fmt.format(keeper.opening_balance()))
        }
        Command::AddSale {
            customer,
            product,
            total,
            cash,
            date,
            note,
        } => {
            let draft = SaleDraft {
                date: date_or_today(&date, today),
                customer_name: customer,
                product,
                total,
                cash,
                note,
            };
            let (next, sale) = books.create_sale(&draft)?;
            keeper.commit(next).await?;
            json(&sale)
        }
        Command::AddRefund {
            invoice,
            total,
            cash,
            date,
            note,
        } => {
            let mut draft = books.refund_draft_for_invoice(&invoice);
            draft.date = date_or_today(&date, today);
            draft.total = total;
            draft.cash = cash;
            draft.note = note;
            let (next, refund) = books.create_refund(&draft)?;
            keeper.commit(next).await?;
            json(&refund)
        }
        Command::AddSupplier {
            name,
            note,
            debit,
            credit,
        } => {
            let (next, supplier) = books.create_supplier(&SupplierDraft {
                name,
                note,
                debit,
                credit,
            })?;
            keeper.commit(next).await?;
            json(&supplier)
        }
        Command::AddOrder {
            supplier,
            customer,
            product,
            transaction_type,
            credit,
            debit,
            date,
        } => {
            let (next, order) = books.create_supplier_order(&SupplierOrderDraft {
                supplier_id: Some(supplier),
                date: date_or_today(&date, today),
                customer_name: customer,
                product,
                transaction_type,
                amount_credit: credit,
                amount_debit: debit,
            })?;
            keeper.commit(next).await?;
            json(&order)
        }
        Command::AddExpense {
            description,
            cash,
            note,
            date,
        } => {
            let draft = ExpenseDraft {
                date: date.unwrap_or_default(),
                description,
                note,
                cash,
            };
            let (next, expense) = books.create_expense(&draft, today)?;
            keeper.commit(next).await?;
            json(&expense)
        }
        Command::EditSale {
            id,
            customer,
            product,
            total,
            cash,
            date,
            note,
        } => {
            let mut draft = SaleDraft::from(books.sale(id)?);
            draft.customer_name = customer.unwrap_or(draft.customer_name);
            draft.product = product.unwrap_or(draft.product);
            draft.total = total.unwrap_or(draft.total);
            draft.cash = cash.unwrap_or(draft.cash);
            draft.date = date.unwrap_or(draft.date);
            draft.note = note.unwrap_or(draft.note);

            let (next, entry) = books.edit_sale(id, &draft, Utc::now())?;
            keeper.commit(next).await?;
            match entry {
                Some(entry) => json(&HistoryLine::build(&entry)),
                None => json(&"No changes"),
            }
        }
        Command::Delete { entity, id } => {
            let next: Books = match entity {
                EntityType::Sale => books.delete_sale(id)?,
                EntityType::Refund => books.delete_refund(id)?,
                EntityType::Supplier => books.delete_supplier(id)?,
                EntityType::SupplierOrder => books.delete_supplier_order(id)?,
                EntityType::Expense => books.delete_expense(id)?,
            };
            keeper.commit(next).await?;
            json(&format!("Deleted {} {}", entity, id))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Needs neither a config nor the books
    if let Command::InitConfig { path } = &args.command {
        return print_json(&init_config(path)?);
    }

    let (config, from_file) = load_config(&args.config)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    if from_file {
        log::debug!("Config loaded from {}", args.config.display());
    } else {
        log::warn!(
            "Config file {} not found, using defaults (run `tillbook init-config` to create one)",
            args.config.display()
        );
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let snapshot = config.snapshot_path();
        let store: BooksStore = Arc::new(JsonSnapshotStore::new(snapshot.clone()));
        let keeper = Bookkeeper::new(config, store);
        keeper.load().await.map_err(|e| {
            let context = ErrorContext::new("load")
                .with_data("snapshot", serde_json::json!(snapshot.display().to_string()));
            report(context, e.into())
        })?;

        let today = Local::now().date_naive();
        let context = ErrorContext::new(format!("{:?}", args.command))
            .with_data("today", serde_json::json!(today.to_string()));
        let output = run(&keeper, args.command, today)
            .await
            .map_err(|e| report(context, e))?;
        print_json(&output)
    })
}
