use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod loader;
mod mailer;
mod models;
mod renewal;
mod report;
mod status;

use mailer::{SenderCredentials, SmtpMailer};
use models::ContractTable;

const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Parser)]
#[command(name = "contract-renewal-report")]
#[command(about = "Subscription status and renewal reports for contract exports", long_about = None)]
struct Cli {
    /// Evaluate the renewal window as of this date instead of today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show contracts grouped by subscription status
    Status {
        #[arg(long)]
        file: PathBuf,
        /// Render colored HTML instead of markdown
        #[arg(long)]
        html: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List contracts expiring within the renewal window
    Renewals {
        #[arg(long)]
        file: PathBuf,
        /// Renewal horizon in days (default 90)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_DAYS))]
        window_days: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// List expired contracts
    Expired {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Write the renewal email body to an HTML file
    Render {
        #[arg(long)]
        file: PathBuf,
        /// Renewal horizon in days (default 90)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_DAYS))]
        window_days: Option<u32>,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
    },
    /// Email the renewal report (reads SMTP_USERNAME and SMTP_PASSWORD)
    Send {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,
        #[arg(long, default_value = mailer::DEFAULT_SUBJECT)]
        subject: String,
        /// Renewal horizon in days (default 90)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_WINDOW_DAYS))]
        window_days: Option<u32>,
        #[arg(long, default_value = mailer::DEFAULT_SMTP_HOST)]
        smtp_host: String,
        #[arg(long, default_value_t = mailer::DEFAULT_SMTP_PORT)]
        smtp_port: u16,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_contracts(path: &Path) -> anyhow::Result<ContractTable> {
    let data = loader::load_table(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let table = ContractTable::from_data(&data)?;
    Ok(table)
}

fn select_renewals(
    table: &ContractTable,
    today: NaiveDate,
    window_days: Option<u32>,
) -> ContractTable {
    match window_days {
        Some(days) => renewal::upcoming_renewals_within(table, today, days),
        None => renewal::upcoming_renewals(table, today),
    }
}

fn print_records(table: &ContractTable, json: bool, empty_message: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", report::render_json(&table.records)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }

    for record in &table.records {
        println!(
            "- {} / {} ({}) valid {} to {}",
            record.sold_to_name,
            record.material_number,
            record.material_name,
            record.valid_from,
            record.valid_until
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Commands::Status { file, html, out } => {
            let table = load_contracts(&file)?;
            let groups = status::partition_by_status(&table);
            let rendered = if html {
                report::render_status_html(&groups)
            } else {
                report::render_status_markdown(&groups)
            };

            match out {
                Some(out) => {
                    std::fs::write(&out, rendered)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!("Status view written to {}.", out.display());
                }
                None => print!("{rendered}"),
            }
        }
        Commands::Renewals {
            file,
            window_days,
            json,
        } => {
            let table = load_contracts(&file)?;
            let upcoming = select_renewals(&table, today, window_days);
            if !json {
                println!(
                    "Contracts expiring between {} and {}:",
                    today,
                    renewal::window_end(
                        today,
                        window_days.unwrap_or(renewal::RENEWAL_WINDOW_DAYS)
                    )
                );
            }
            print_records(&upcoming, json, "No contracts expire within this window.")?;
        }
        Commands::Expired { file, json } => {
            let table = load_contracts(&file)?;
            let expired = renewal::expired_contracts(&table);
            print_records(&expired, json, "No expired contracts.")?;
        }
        Commands::Render {
            file,
            window_days,
            out,
        } => {
            let table = load_contracts(&file)?;
            let upcoming = select_renewals(&table, today, window_days);
            let expired = renewal::expired_contracts(&table);
            std::fs::write(&out, report::render_report_html(&upcoming, &expired))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Send {
            file,
            recipients,
            subject,
            window_days,
            smtp_host,
            smtp_port,
        } => {
            let credentials = SenderCredentials {
                address: std::env::var("SMTP_USERNAME")
                    .context("SMTP_USERNAME must be set to the sending mailbox address")?,
                password: std::env::var("SMTP_PASSWORD")
                    .context("SMTP_PASSWORD must be set to the mailbox app password")?,
            };

            let table = load_contracts(&file)?;
            let upcoming = select_renewals(&table, today, window_days);
            let expired = renewal::expired_contracts(&table);
            let transport = SmtpMailer {
                host: smtp_host,
                port: smtp_port,
            };

            mailer::send_report(
                &transport,
                &credentials,
                &recipients,
                &subject,
                &upcoming,
                &expired,
            )
            .context("failed to send email")?;
            println!("Email has been sent to {}!", recipients.join(", "));
        }
    }

    Ok(())
}
