use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use hiworks_scraper::browser::webdriver::WebDriverSession;
use hiworks_scraper::{
    export, rows_from_json, CredentialStore, Credentials, ExtractionResult, HiworksScraper,
    ScraperConfig, ViewMode,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hiworks-scraper",
    about = "Extracts schedules from the Hiworks office portal"
)]
struct Args {
    /// Range start as YYYY-MM-DD (defaults to the first day of this month).
    #[arg(long)]
    start: Option<String>,

    /// Range end as YYYY-MM-DD, exclusive (defaults to the first day of next
    /// month).
    #[arg(long)]
    end: Option<String>,

    /// Configuration file (JSON). Missing keys fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding saved credentials.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Portal username; overrides any saved credentials.
    #[arg(long)]
    username: Option<String>,

    /// Portal password; used together with --username.
    #[arg(long)]
    password: Option<String>,

    /// Save the supplied credentials for later runs.
    #[arg(long)]
    save_credentials: bool,

    /// Run the browser with a visible window.
    #[arg(long)]
    no_headless: bool,

    /// Scrape the rendered calendar DOM instead of the JSON endpoint.
    #[arg(long)]
    dom: bool,

    /// Write extracted rows to this CSV file.
    #[arg(long)]
    export: Option<PathBuf>,
}

fn validate_args(args: &Args) -> Result<()> {
    if args.dom && (args.start.is_some() || args.end.is_some()) {
        bail!(
            "--start/--end apply to the JSON endpoint; \
             DOM mode extracts the currently rendered period"
        );
    }
    Ok(())
}

fn current_month_bounds() -> Result<(String, String)> {
    let today = Local::now().date_naive();
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .ok_or_else(|| anyhow!("invalid current date"))?;
    let end = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    }
    .ok_or_else(|| anyhow!("invalid current date"))?;
    Ok((start.to_string(), end.to_string()))
}

fn resolve_credentials(args: &Args) -> Result<Credentials> {
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        let credentials = Credentials {
            username: username.clone(),
            password: password.clone(),
            auto_login: false,
        };
        if args.save_credentials {
            CredentialStore::new(&args.data_dir)
                .save(&credentials)
                .context("failed to save credentials")?;
        }
        return Ok(credentials);
    }
    if args.username.is_some() || args.password.is_some() {
        bail!("--username and --password must be given together");
    }

    CredentialStore::new(&args.data_dir)
        .load()
        .ok_or_else(|| anyhow!("no saved credentials; pass --username and --password"))
}

async fn run(
    scraper: &mut HiworksScraper<WebDriverSession>,
    args: &Args,
    credentials: &Credentials,
) -> Result<ExtractionResult> {
    scraper.login(credentials).await.context("login failed")?;

    if args.dom {
        scraper
            .open_schedule_page()
            .await
            .context("failed to open schedule page")?;
        scraper.change_view_mode(ViewMode::List).await?;
        let result = scraper.extract_schedule().await?;
        return Ok(result);
    }

    let (default_start, default_end) = current_month_bounds()?;
    let start = args.start.clone().unwrap_or(default_start);
    let end = args.end.clone().unwrap_or(default_end);

    let payload = scraper
        .fetch_schedule_json(&start, &end)
        .await
        .context("schedule JSON fetch failed")?;
    let rows = rows_from_json(&payload);
    Ok(ExtractionResult::ok(rows, format!("{start} ~ {end}")))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();
    validate_args(&args)?;

    let mut config = match &args.config {
        Some(path) => ScraperConfig::load_from_file(path)
            .map_err(|e| anyhow!("failed to load config {}: {e}", path.display()))?,
        None => ScraperConfig::default(),
    };
    if args.no_headless {
        config.headless = false;
    }

    let credentials = resolve_credentials(&args)?;

    let browser = WebDriverSession::launch(&config)
        .await
        .context("failed to start browser session")?;
    let mut scraper = HiworksScraper::new(browser, config);

    let result = run(&mut scraper, &args, &credentials).await;

    // Tear the browser down before reporting; a failed run must not leak
    // the browser process.
    if let Err(e) = scraper.shutdown().await {
        warn!(error = %e, "browser shutdown failed");
    }

    let extraction = result?;
    info!(
        period = %extraction.current_period_label,
        rows = extraction.rows.len(),
        "extraction complete"
    );

    if let Some(path) = &args.export {
        export::write_csv(path, &extraction.rows)
            .map_err(|e| anyhow!("CSV export failed: {e}"))?;
    } else {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    }

    Ok(())
}
