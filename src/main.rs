use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use farm_ledger::{
    config::{database, settings},
    core::{
        classifier, directory, export,
        format::format_currency,
        report::{self, Month},
        sales::{self, GradeQuantity, GroupSettlement, SaleUpdate},
    },
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Utc};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Sales settlement ledger for a produce farm.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the farm settings file
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database tables
    InitDb,
    /// Print the revenue board for a month (defaults to the current month)
    Summary {
        /// Month as YYYY-MM
        #[arg(long)]
        month: Option<String>,
    },
    /// List unsettled partner deliveries grouped by partner and day
    Unsettled,
    /// Write settled partner deliveries to a CSV file
    ExportSettled {
        /// Output file
        #[arg(long)]
        out: PathBuf,
        /// First day included, YYYY-MM-DD (defaults to the first of this month)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day included, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Confirm payment for a sale
    Settle {
        /// Sale id
        #[arg(long)]
        id: i64,
        /// Amount actually received
        #[arg(long)]
        amount: Option<i64>,
        /// Payment method (card, cash, transfer)
        #[arg(long)]
        method: Option<String>,
    },
    /// Book a partner's payment against one day of deliveries
    SettleGroup {
        /// Partner id
        #[arg(long)]
        partner: i64,
        /// Delivery day, YYYY-MM-DD
        #[arg(long)]
        day: NaiveDate,
        /// Amount actually received for the day
        #[arg(long)]
        amount: i64,
        /// Final grade as GRADE:QTY or GRADE:QTY:PRICE, repeatable
        #[arg(long = "grade", value_parser = parse_grade, required = true)]
        grades: Vec<GradeQuantity>,
        /// Day the payment arrived (defaults to today)
        #[arg(long)]
        paid_on: Option<NaiveDate>,
        /// Payment method (card, cash, transfer)
        #[arg(long)]
        method: Option<String>,
    },
    /// Set the agreed price of a sale
    SetPrice {
        /// Sale id
        #[arg(long)]
        id: i64,
        /// Agreed price
        #[arg(long)]
        price: i64,
    },
    /// Show the default per-unit courier costs
    Costs,
}

fn parse_grade(value: &str) -> std::result::Result<GradeQuantity, String> {
    let mut parts = value.split(':');
    let grade = parts.next().unwrap_or_default().trim();
    if grade.is_empty() {
        return Err(format!("missing grade in '{value}'"));
    }
    let quantity = parts
        .next()
        .ok_or_else(|| format!("missing quantity in '{value}'"))?
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad quantity in '{value}': {e}"))?;
    let price = parts
        .next()
        .map(|p| p.trim().parse::<i64>())
        .transpose()
        .map_err(|e| format!("bad price in '{value}': {e}"))?;
    if parts.next().is_some() {
        return Err(format!("too many fields in '{value}'"));
    }

    Ok(GradeQuantity {
        grade: grade.to_string(),
        quantity,
        price,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();
    let args = Args::parse();

    let settings = settings::load_settings(&args.config)
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    let ctx = settings.farm_context();

    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    match args.command {
        Command::InitDb => {
            database::create_tables(&db).await?;
            info!("Database tables ready");
        }
        Command::Summary { month } => {
            let month = match month {
                Some(value) => Month::parse(&value)?,
                None => Month::containing(Utc::now()),
            };
            let summary = report::generate_monthly_summary(&db, &ctx, month).await?;

            println!("Revenue for {}", summary.month);
            println!("  total        {}", format_currency(summary.total_revenue));
            println!("  partners     {}", format_currency(summary.b2b_revenue));
            println!("  consumers    {}", format_currency(summary.b2c_revenue));
            println!("  shipping     {}", format_currency(summary.b2c_shipping_spend));
            println!(
                "Outstanding from partners: {} across {} deliveries ({} settled this month)",
                format_currency(summary.unsettled_b2b_amount),
                summary.unsettled_b2b_count,
                summary.settled_b2b_count
            );
            println!(
                "Consumer orders awaiting payment: {}",
                summary.unsettled_b2c.len()
            );
        }
        Command::Unsettled => {
            let records = sales::list_unsettled(&db, &ctx).await?;
            let names = directory::load_name_book(&db, &ctx).await?;

            for group in report::group_unsettled_b2b(&records, &names) {
                println!(
                    "{} {} - {} units, {}",
                    group.day,
                    group.name,
                    group.total_quantity(),
                    format_currency(group.expected_total())
                );
                for line in report::annotate(&group.records, &names) {
                    println!(
                        "    #{} {} [{}] {}",
                        line.record.id,
                        line.record.grade.as_deref().unwrap_or("-"),
                        line.status.label,
                        format_currency(line.total)
                    );
                }
            }
        }
        Command::ExportSettled { out, from, to } => {
            let today = Utc::now().date_naive();
            let from = from.unwrap_or_else(|| today.with_day(1).unwrap_or(today));
            let to = to.unwrap_or(today);
            let rows = export::export_settled(&db, &ctx, from, to, &out).await?;
            println!(
                "Wrote {rows} settled deliveries ({from} to {to}) to {}",
                out.display()
            );
        }
        Command::Settle { id, amount, method } => {
            let sale = sales::settle_sale(&db, &ctx, id, amount, method).await?;
            let status = classifier::classify_settlement(&sale);
            println!(
                "Sale #{} is now {} ({})",
                sale.id,
                status.label,
                format_currency(classifier::calculate_total(&sale))
            );
        }
        Command::SettleGroup {
            partner,
            day,
            amount,
            grades,
            paid_on,
            method,
        } => {
            let rows = sales::settle_delivery_group(
                &db,
                &ctx,
                GroupSettlement {
                    partner_id: partner,
                    day,
                    grades,
                    actual_amount: amount,
                    settled_on: paid_on.unwrap_or_else(|| Utc::now().date_naive()),
                    payment_method: method,
                },
            )
            .await?;
            let expected: i64 = rows.iter().map(|r| r.price.unwrap_or(0)).sum();
            println!(
                "Settled {} rows for {day}: received {} against {} agreed",
                rows.len(),
                format_currency(amount),
                format_currency(expected)
            );
        }
        Command::SetPrice { id, price } => {
            let sale = sales::get_sale(&db, &ctx, id)
                .await?
                .ok_or(Error::SaleNotFound { id })?;
            let update = SaleUpdate {
                price: Some(price),
                ..SaleUpdate::from_record(&sale)
            };
            let sale = sales::update_sale(&db, &ctx, id, update).await?;
            println!(
                "Sale #{} is now {}",
                sale.id,
                classifier::classify_settlement(&sale).label
            );
        }
        Command::Costs => {
            println!(
                "shipping {} / material {} per unit",
                format_currency(settings.costs.unit_shipping),
                format_currency(settings.costs.unit_material)
            );
        }
    }

    Ok(())
}
