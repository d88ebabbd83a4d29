//! Prospect CLI
//!
//! Command-line interface for a running Prospect API:
//! - Manage contacts (list, add, tag, import)
//! - Build, preview, run and export reports
//! - Browse templates and the dashboard
//! - Check status, generate config

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use prospect::report::{
    parse_filter_expression, ChartSeries, ChartType, ReportDefinition, ReportRun, Visualization,
};
use prospect::store::{Contact, ContactDraft, ContactStatus};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prospect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CRM contacts and ad-hoc reports")]
#[command(long_about = "Prospect keeps your contacts and builds reports over contacts, deals and tasks.\nReports render as tables or chart-ready series.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Contact management
    #[command(subcommand)]
    Contacts(ContactCommands),

    /// Saved and ad-hoc reports
    #[command(subcommand)]
    Reports(ReportCommands),

    /// List built-in report templates
    Templates,

    /// Show dashboard widgets
    Dashboard,

    /// Show system status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ContactCommands {
    /// List contacts
    List {
        /// Search first/last name, email, phone, company, title
        #[arg(short, long)]
        search: Option<String>,
        /// Lead, Customer or Partner
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// all, last7days, last30days, last90days
        #[arg(long)]
        created: Option<String>,
        /// Sort field (default: lastName)
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Filter expression, e.g. "tags contains 'VIP'"
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show one contact
    Show { id: String },

    /// Add a contact
    Add {
        first_name: String,
        last_name: String,
        email: String,
        company: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(short = 'T', long)]
        tag: Vec<String>,
    },

    /// Delete a contact
    Delete { id: String },

    /// Add a tag to a contact
    Tag { id: String, tag: String },

    /// Remove a tag from a contact
    Untag { id: String, tag: String },

    /// List distinct companies
    Companies,

    /// Import contacts from a CSV file
    Import { path: PathBuf },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// List saved reports
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a saved report definition
    Show { id: String },

    /// Run a saved report
    Run { id: String },

    /// Run an unsaved report
    Preview {
        /// contacts, deals or tasks
        entity: String,
        /// Fields to show (comma-separated or multiple args)
        fields: Vec<String>,
        /// table, bar, line, pie, area
        #[arg(short, long, default_value = "table")]
        chart: String,
        /// Filter expression, e.g. "stage != 'Closed Lost' AND amount > 10000"
        #[arg(long)]
        filter: Option<String>,
    },

    /// Save a copy of a template
    FromTemplate {
        template_id: String,
        /// Name for the copy (default: "<template> (Copy)")
        #[arg(long)]
        name: Option<String>,
    },

    /// Export a saved report as CSV
    Export {
        id: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a saved report
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client {
        http: reqwest::Client::new(),
        base: cli.api_url.trim_end_matches('/').to_string(),
    };

    match cli.command {
        Commands::Contacts(cmd) => run_contacts(&client, cmd, &cli.format).await?,
        Commands::Reports(cmd) => run_reports(&client, cmd, &cli.format).await?,

        Commands::Templates => {
            let data = client.get("/api/v1/templates").await?;
            let templates: Vec<ReportDefinition> =
                serde_json::from_value(data["templates"].clone())?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&templates)?);
            } else {
                println!("{:<30} {:<30} {:<10} {}", "ID", "Name", "Chart", "Entity");
                println!("{}", "-".repeat(80));
                for t in templates {
                    println!("{:<30} {:<30} {:<10} {}", t.id, t.name, t.chart_type, t.entity);
                }
            }
        }

        Commands::Dashboard => {
            let data = client.get("/api/v1/dashboard").await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("Contacts: {}", data["totalContacts"]);
                if let Some(statuses) = data["byStatus"].as_array() {
                    for s in statuses {
                        println!("  {:<10} {}", s["status"].as_str().unwrap_or("-"), s["count"]);
                    }
                }
                println!("New in last 30 days: {}", data["newLast30Days"]);
                println!("Saved reports: {}", data["reportCount"]);

                if let Some(companies) = data["topCompanies"].as_array() {
                    println!();
                    println!("Top companies:");
                    for c in companies {
                        println!("  {:<25} {}", c["company"].as_str().unwrap_or("-"), c["count"]);
                    }
                }

                let recent: Vec<Contact> =
                    serde_json::from_value(data["recentContacts"].clone()).unwrap_or_default();
                if !recent.is_empty() {
                    println!();
                    println!("Recently added:");
                    for c in recent {
                        println!("  {:<25} {}", c.full_name(), c.company);
                    }
                }
            }
        }

        Commands::Status => {
            let response = client.http.get(client.url("/health")).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Prospect v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!("Contacts: {}", health["contacts"]);
                    println!("Reports: {}", health["reports"]);

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Prospect API at {}", client.base);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Prospect API server is running:");
                    eprintln!("  cargo run --bin prospect-api");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = prospect::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn run_contacts(client: &Client, cmd: ContactCommands, format: &str) -> anyhow::Result<()> {
    match cmd {
        ContactCommands::List {
            search,
            status,
            company,
            created,
            sort,
            desc,
            filter,
        } => {
            if let Some(expr) = filter.as_deref() {
                parse_filter_expression(expr).context("invalid --filter")?;
            }

            let mut params: Vec<(&str, String)> = Vec::new();
            params.extend(search.map(|v| ("search", v)));
            params.extend(status.map(|v| ("status", v)));
            params.extend(company.map(|v| ("company", v)));
            params.extend(created.map(|v| ("dateRange", v)));
            params.extend(sort.map(|v| ("sort", v)));
            params.extend(filter.map(|v| ("filter", v)));
            if desc {
                params.push(("direction", "desc".to_string()));
            }

            let response = client
                .http
                .get(client.url("/api/v1/contacts"))
                .query(&params)
                .send()
                .await?;
            let data: serde_json::Value = check(response).await?.json().await?;
            let contacts: Vec<Contact> = serde_json::from_value(data["contacts"].clone())?;

            match format {
                "json" => println!("{}", serde_json::to_string_pretty(&contacts)?),
                "csv" => print_contacts_csv(&contacts)?,
                _ => print_contacts_table(&contacts),
            }
        }

        ContactCommands::Show { id } => {
            let data = client.get(&format!("/api/v1/contacts/{}", id)).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        ContactCommands::Add {
            first_name,
            last_name,
            email,
            company,
            phone,
            title,
            status,
            tag,
        } => {
            let mut draft = ContactDraft::new(first_name, last_name, email, company);
            if let Some(phone) = phone {
                draft = draft.phone(phone);
            }
            if let Some(title) = title {
                draft = draft.title(title);
            }
            if let Some(status) = status {
                match ContactStatus::parse(&status) {
                    Some(s) => draft = draft.status(s),
                    None => bail!("unknown status '{}' (expected Lead, Customer or Partner)", status),
                }
            }
            for t in tag {
                draft = draft.tag(t);
            }

            let response = client
                .http
                .post(client.url("/api/v1/contacts"))
                .json(&draft)
                .send()
                .await?;
            let contact: Contact = check(response).await?.json().await?;
            println!("Created {} ({})", contact.full_name(), contact.id);
        }

        ContactCommands::Delete { id } => {
            let response = client
                .http
                .delete(client.url(&format!("/api/v1/contacts/{}", id)))
                .send()
                .await?;
            check(response).await?;
            println!("Deleted contact {}", id);
        }

        ContactCommands::Tag { id, tag } => {
            let response = client
                .http
                .post(client.url(&format!("/api/v1/contacts/{}/tags", id)))
                .json(&serde_json::json!({ "tag": tag }))
                .send()
                .await?;
            let contact: Contact = check(response).await?.json().await?;
            println!("{}: {}", contact.full_name(), contact.tags.join(", "));
        }

        ContactCommands::Untag { id, tag } => {
            let response = client
                .http
                .delete(client.url(&format!("/api/v1/contacts/{}/tags/{}", id, tag)))
                .send()
                .await?;
            let contact: Contact = check(response).await?.json().await?;
            println!("{}: {}", contact.full_name(), contact.tags.join(", "));
        }

        ContactCommands::Companies => {
            let data = client.get("/api/v1/contacts/companies").await?;
            let companies: Vec<String> = serde_json::from_value(data)?;
            for company in companies {
                println!("{}", company);
            }
        }

        ContactCommands::Import { path } => {
            if !path.exists() {
                eprintln!("File not found: {:?}", path);
                std::process::exit(1);
            }
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {:?}", path))?;

            let response = client
                .http
                .post(client.url("/api/v1/contacts/import"))
                .header(reqwest::header::CONTENT_TYPE, "text/csv")
                .body(body)
                .send()
                .await?;
            let result: serde_json::Value = check(response).await?.json().await?;

            println!("Import results:");
            println!("  Imported: {}", result["imported"]);
            println!("  Failed: {}", result["failed"]);

            if let Some(errors) = result["errors"].as_array() {
                println!();
                println!("Errors (first 10):");
                for error in errors.iter().take(10) {
                    println!(
                        "  line {}: {}",
                        error["line"],
                        error["message"].as_str().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_reports(client: &Client, cmd: ReportCommands, format: &str) -> anyhow::Result<()> {
    match cmd {
        ReportCommands::List { search } => {
            let mut request = client.http.get(client.url("/api/v1/reports"));
            if let Some(search) = search {
                request = request.query(&[("search", search)]);
            }
            let data: serde_json::Value = check(request.send().await?).await?.json().await?;
            let reports: Vec<ReportDefinition> = serde_json::from_value(data["reports"].clone())?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No saved reports yet.");
                println!();
                println!("Start from a template with:");
                println!("  prospect reports from-template template-sales-pipeline");
            } else {
                println!("{:<38} {:<30} {:<10} {:<10} {}", "ID", "Name", "Chart", "Entity", "Last run");
                println!("{}", "-".repeat(110));
                for r in reports {
                    let last_run = r
                        .last_run
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string());
                    println!(
                        "{:<38} {:<30} {:<10} {:<10} {}",
                        r.id, r.name, r.chart_type, r.entity, last_run
                    );
                }
            }
        }

        ReportCommands::Show { id } => {
            let data = client.get(&format!("/api/v1/reports/{}", id)).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        ReportCommands::Run { id } => {
            let response = client
                .http
                .post(client.url(&format!("/api/v1/reports/{}/run", id)))
                .send()
                .await?;
            let run: ReportRun = check(response).await?.json().await?;
            print_run(&run, format)?;
        }

        ReportCommands::Preview {
            entity,
            fields,
            chart,
            filter,
        } => {
            let chart_type = ChartType::from_str(&chart)
                .with_context(|| format!("unknown chart type '{}'", chart))?;

            let fields: Vec<String> = fields
                .iter()
                .flat_map(|f| f.split(',').map(|s| s.trim().to_string()))
                .filter(|f| !f.is_empty())
                .collect();

            let mut definition = ReportDefinition {
                entity,
                fields,
                chart_type,
                ..Default::default()
            };
            if let Some(expr) = filter.as_deref() {
                definition.filters = parse_filter_expression(expr).context("invalid --filter")?;
            }
            definition.normalize();

            let response = client
                .http
                .post(client.url("/api/v1/reports/preview"))
                .json(&definition)
                .send()
                .await?;
            let run: ReportRun = check(response).await?.json().await?;
            print_run(&run, format)?;
        }

        ReportCommands::FromTemplate { template_id, name } => {
            let response = client
                .http
                .post(client.url(&format!("/api/v1/templates/{}/instantiate", template_id)))
                .send()
                .await?;
            let mut definition: ReportDefinition = check(response).await?.json().await?;
            if let Some(name) = name {
                definition.name = name;
            }

            let response = client
                .http
                .post(client.url("/api/v1/reports"))
                .json(&definition)
                .send()
                .await?;
            let saved: ReportDefinition = check(response).await?.json().await?;
            println!("Saved '{}' ({})", saved.name, saved.id);
        }

        ReportCommands::Export { id, output } => {
            let response = client
                .http
                .get(client.url(&format!("/api/v1/reports/{}/export", id)))
                .send()
                .await?;
            let data = check(response).await?.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Exported to {:?}", path);
                }
                None => print!("{}", data),
            }
        }

        ReportCommands::Delete { id } => {
            let response = client
                .http
                .delete(client.url(&format!("/api/v1/reports/{}", id)))
                .send()
                .await?;
            check(response).await?;
            println!("Deleted report {}", id);
        }
    }

    Ok(())
}

struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> anyhow::Result<serde_json::Value> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Print the API's error body and exit non-zero on failure
async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| {
            let error = &body["error"];
            let mut message = error["message"].as_str()?.to_string();
            if let Some(fields) = error["fields"].as_object() {
                for (field, msg) in fields {
                    message.push_str(&format!("\n  {}: {}", field, msg.as_str().unwrap_or("-")));
                }
            }
            Some(message)
        })
        .unwrap_or(text);

    eprintln!("Failed ({}): {}", status, message);
    std::process::exit(1);
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_contacts_table(contacts: &[Contact]) {
    if contacts.is_empty() {
        println!("No contacts found");
        return;
    }

    println!("{:<25} {:<30} {:<20} {:<10} {}", "Name", "Email", "Company", "Status", "Tags");
    println!("{}", "-".repeat(100));

    for c in contacts {
        println!(
            "{:<25} {:<30} {:<20} {:<10} {}",
            c.full_name(),
            c.email,
            c.company,
            c.status,
            c.tags.join(", ")
        );
    }
}

fn print_contacts_csv(contacts: &[Contact]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["id", "firstName", "lastName", "email", "phone", "company", "title", "status", "tags"])?;
    for c in contacts {
        let status = c.status.to_string();
        let tags = c.tags.join(";");
        writer.write_record([
            c.id.as_str(),
            c.first_name.as_str(),
            c.last_name.as_str(),
            c.email.as_str(),
            c.phone.as_str(),
            c.company.as_str(),
            c.title.as_str(),
            status.as_str(),
            tags.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_run(run: &ReportRun, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(run)?);
            return Ok(());
        }
        "csv" => {
            print!("{}", run.to_csv()?);
            return Ok(());
        }
        _ => {}
    }

    match &run.visualization {
        Visualization::Empty { message } => println!("{}", message),

        Visualization::Table(table) => {
            for column in &table.columns {
                print!("{:<20}", column.label);
            }
            println!();
            println!("{}", "-".repeat(20 * table.columns.len()));
            for row in &table.rows {
                for cell in row {
                    print!("{:<20}", cell);
                }
                println!();
            }
        }

        Visualization::Chart(chart) => {
            println!("{} ({})", chart.title, chart.chart_type);
            println!();

            let values: Vec<f64> = match &chart.series {
                ChartSeries::Flat(data) => data.clone(),
                ChartSeries::Named(series) => {
                    series.first().map(|s| s.data.clone()).unwrap_or_default()
                }
            };
            let max = values.iter().cloned().fold(0.0_f64, f64::max);

            for (category, value) in chart.categories.iter().zip(values.iter()) {
                let width = if max > 0.0 { (value / max * 40.0).round() as usize } else { 0 };
                println!("{:<20} {:>10} {}", category, value, "#".repeat(width));
            }
        }
    }

    println!();
    println!(
        "{} of {} rows matched in {} ms",
        run.len(),
        run.rows_scanned,
        run.execution_time_ms
    );
    Ok(())
}
