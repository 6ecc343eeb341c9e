use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ep_app::{
    AppError, AppResult, ApplianceInput, ConfigSource, Dashboard, FormInput, HistorySource,
    PredictOptions, Session, SolarInput, SolarSizing, appliance_service, form_service,
    history_service, predict_service, solar_service, theme_service,
};
use ep_client::{ApiConfig, HistoryQuery, PredictClient};
use ep_form::{FormState, apply_autofill, validate_form};
use ep_store::{LocalStore, Theme};
use tracing_subscriber::EnvFilter;

const ENV_DATA_DIR: &str = "ENERPREDICT_DATA_DIR";
const DEFAULT_DATA_DIR: &str = ".enerpredict";

#[derive(Parser, Debug)]
#[command(name = "enerpredict")]
#[command(about = "Household energy consumption prediction client", long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Prediction service base URL (overrides ENERPREDICT_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Request timeout in seconds (overrides ENERPREDICT_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Local data directory (overrides ENERPREDICT_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available prediction models
    Models,
    /// Show the model feature order
    Features,
    /// Form file helpers
    #[command(subcommand)]
    Form(FormCommands),
    /// Build and print the feature vector for a form
    Vector {
        #[command(flatten)]
        form: FormArgs,
        /// Skip the autofill pass before building
        #[arg(long)]
        no_autofill: bool,
    },
    /// Validate form fields
    Validate {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Derive blank aggregate fields from related entries
    Autofill {
        #[command(flatten)]
        form: FormArgs,
        /// Overwrite fields that already hold a value
        #[arg(long)]
        force: bool,
        /// Write the resulting form to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Submit a prediction
    Predict {
        #[command(flatten)]
        form: FormArgs,
        /// Model key (defaults to the first listed model)
        #[arg(long)]
        model: Option<String>,
        /// Skip the autofill pass before building the vector
        #[arg(long)]
        no_autofill: bool,
    },
    /// Prediction history
    #[command(subcommand)]
    History(HistoryCommands),
    /// Trend and appliance breakdown from stored predictions
    Dashboard,
    /// Household appliance list
    #[command(subcommand)]
    Appliance(ApplianceCommands),
    /// Solar panel sizing
    #[command(subcommand)]
    Solar(SolarCommands),
    /// Theme preference
    #[command(subcommand)]
    Theme(ThemeCommands),
}

#[derive(Subcommand, Debug)]
enum FormCommands {
    /// Write a blank form for the current feature order
    Template {
        /// Output file (.yaml, .yml or .json); YAML to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// Show the local history chart series
    Show,
    /// Clear the local history
    Clear,
    /// Fetch stored predictions from the service
    Remote {
        /// Maximum number of records
        #[arg(long)]
        limit: Option<u32>,
        /// Only records for this model key
        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ApplianceCommands {
    /// Add an appliance
    Add {
        name: String,
        /// Watts per unit
        #[arg(long, default_value = "")]
        power: String,
        /// Hours used per day
        #[arg(long, default_value = "")]
        hours: String,
        /// Number of units
        #[arg(long, default_value = "1")]
        qty: String,
    },
    /// Remove an appliance by its list position (starting at 1)
    Remove { position: usize },
    /// List appliances
    List,
    /// Estimate daily and monthly consumption
    Estimate,
    /// Send the list to the service as a household record
    Send,
    /// Import list aggregates into a form
    Import {
        #[command(flatten)]
        form: FormArgs,
        /// Write the resulting form to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct SolarArgs {
    /// Daily consumption in kWh
    #[arg(long, default_value = "")]
    daily_kwh: String,
    /// Peak sun hours per day
    #[arg(long, default_value = "")]
    sun_hours: String,
    /// Panel rating in watts (default 400)
    #[arg(long)]
    panel_watt: Option<String>,
}

#[derive(Subcommand, Debug)]
enum SolarCommands {
    /// Size locally
    Local(SolarArgs),
    /// Size with the service
    Remote(SolarArgs),
}

#[derive(Subcommand, Debug)]
enum ThemeCommands {
    Get,
    /// Set the theme (light or dark)
    Set { theme: String },
    Toggle,
}

#[derive(Args, Debug, Clone, Default)]
struct FormArgs {
    /// Form file (.yaml, .yml or .json)
    #[arg(long = "form")]
    file: Option<PathBuf>,
    /// Field value, NAME=VALUE (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    values: Vec<String>,
    /// Appliance entry mode, NAME=count|power (repeatable)
    #[arg(long = "mode", value_name = "NAME=MODE")]
    modes: Vec<String>,
    /// City selection (1-4)
    #[arg(long)]
    city: Option<String>,
}

impl FormArgs {
    fn to_input(&self) -> AppResult<FormInput> {
        Ok(FormInput {
            file: self.file.clone(),
            values: self
                .values
                .iter()
                .map(|raw| form_service::parse_assignment(raw))
                .collect::<AppResult<_>>()?,
            modes: self
                .modes
                .iter()
                .map(|raw| form_service::parse_mode_assignment(raw))
                .collect::<AppResult<_>>()?,
            city: self.city.clone(),
        })
    }
}

/// Client and store handles shared by every command.
struct Context {
    client: PredictClient,
    store: LocalStore,
}

impl Context {
    fn new(cli: &Cli) -> AppResult<Self> {
        let config = match &cli.api_base {
            Some(base) => ApiConfig::new(base)?,
            None => ApiConfig::from_env()?,
        };
        let config = match cli.timeout {
            Some(secs) => config.with_timeout(Some(secs)),
            None => config,
        };
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| std::env::var_os(ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        tracing::debug!(
            api_base = %config.base_url,
            data_dir = %data_dir.display(),
            "configuration resolved"
        );

        Ok(Self {
            client: PredictClient::new(config)?,
            store: LocalStore::new(data_dir)?,
        })
    }

    async fn session(&self) -> Session {
        Session::start(self.client.clone(), self.store.clone()).await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            if let AppError::InvalidForm { report } = &e {
                for field in report.blocking() {
                    if let Some(message) = field.verdict.message() {
                        eprintln!("  {}: {}", field.name, message);
                    }
                }
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> AppResult<u8> {
    let ctx = Context::new(&cli)?;

    match cli.command {
        Commands::Models => cmd_models(&ctx).await,
        Commands::Features => cmd_features(&ctx).await,
        Commands::Form(FormCommands::Template { output }) => {
            cmd_form_template(&ctx, output.as_deref()).await
        }
        Commands::Vector { form, no_autofill } => cmd_vector(&ctx, &form, !no_autofill).await,
        Commands::Validate { form } => cmd_validate(&ctx, &form).await,
        Commands::Autofill {
            form,
            force,
            output,
        } => cmd_autofill(&ctx, &form, force, output.as_deref()).await,
        Commands::Predict {
            form,
            model,
            no_autofill,
        } => {
            let options = PredictOptions {
                model,
                autofill: !no_autofill,
            };
            cmd_predict(&ctx, &form, options).await
        }
        Commands::History(cmd) => match cmd {
            HistoryCommands::Show => cmd_history_show(&ctx),
            HistoryCommands::Clear => cmd_history_clear(&ctx),
            HistoryCommands::Remote { limit, model } => {
                cmd_history_remote(&ctx, HistoryQuery { limit, model }).await
            }
        },
        Commands::Dashboard => cmd_dashboard(&ctx).await,
        Commands::Appliance(cmd) => match cmd {
            ApplianceCommands::Add {
                name,
                power,
                hours,
                qty,
            } => cmd_appliance_add(
                &ctx,
                ApplianceInput {
                    name,
                    power,
                    hours,
                    qty,
                },
            ),
            ApplianceCommands::Remove { position } => cmd_appliance_remove(&ctx, position),
            ApplianceCommands::List => cmd_appliance_list(&ctx),
            ApplianceCommands::Estimate => cmd_appliance_estimate(&ctx),
            ApplianceCommands::Send => cmd_appliance_send(&ctx).await,
            ApplianceCommands::Import { form, output } => {
                cmd_appliance_import(&ctx, &form, output.as_deref()).await
            }
        },
        Commands::Solar(cmd) => match cmd {
            SolarCommands::Local(args) => {
                let sizing = solar_service::size_locally(&solar_input(&args))?;
                print_sizing(&sizing);
                Ok(0)
            }
            SolarCommands::Remote(args) => {
                let sizing = solar_service::size_remotely(&ctx.client, &solar_input(&args)).await?;
                print_sizing(&sizing);
                Ok(0)
            }
        },
        Commands::Theme(cmd) => cmd_theme(&ctx, cmd),
    }
}

fn source_note(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Service => "",
        ConfigSource::Builtin => " (fallback, service unreachable)",
    }
}

async fn cmd_models(ctx: &Context) -> AppResult<u8> {
    let session = ctx.session().await;
    println!("Models{}:", source_note(session.models_source()));
    let default = session.models().default_model().to_string();
    for (key, label) in session.models().entries() {
        let marker = if *key == default { "*" } else { " " };
        println!("  {marker} {key} - {label}");
    }
    session.end();
    Ok(0)
}

async fn cmd_features(ctx: &Context) -> AppResult<u8> {
    let session = ctx.session().await;
    let order = session.feature_order();
    println!("Feature order ({} features){}:", order.len(), source_note(session.order_source()));
    for (i, name) in order.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, name);
    }
    session.end();
    Ok(0)
}

async fn cmd_form_template(ctx: &Context, output: Option<&Path>) -> AppResult<u8> {
    let session = ctx.session().await;
    match output {
        Some(path) => {
            form_service::write_template(session.feature_order(), path)?;
            println!("✓ Wrote form template: {}", path.display());
        }
        None => print_form(&session.blank_form())?,
    }
    session.end();
    Ok(0)
}

async fn load_form(ctx: &Context, args: &FormArgs) -> AppResult<(Session, FormState)> {
    let input = args.to_input()?;
    let session = ctx.session().await;
    let form = form_service::prepare_form(session.feature_order(), &input)?;
    Ok((session, form))
}

async fn cmd_vector(ctx: &Context, args: &FormArgs, autofill: bool) -> AppResult<u8> {
    let (session, mut form) = load_form(ctx, args).await?;
    let (vector, changes) = predict_service::prepare_vector(&session, &mut form, autofill)?;
    print_autofill(&changes);
    for (name, value) in vector.labelled(session.feature_order()) {
        println!("  {name:<28} {value}");
    }
    session.end();
    Ok(0)
}

async fn cmd_validate(ctx: &Context, args: &FormArgs) -> AppResult<u8> {
    let (session, form) = load_form(ctx, args).await?;
    let report = validate_form(&form);
    for field in &report.fields {
        if let Some(message) = field.verdict.message() {
            let mark = if field.verdict.blocks_submission() {
                "✗"
            } else if field.verdict.is_error() {
                "!"
            } else {
                "✓"
            };
            println!("  {mark} {:<28} {message}", field.name);
        }
    }
    session.end();
    if report.is_submittable() {
        println!("✓ Form can be submitted");
        Ok(0)
    } else {
        println!("✗ {}", ep_app::INVALID_FORM_MESSAGE);
        Ok(1)
    }
}

async fn cmd_autofill(
    ctx: &Context,
    args: &FormArgs,
    force: bool,
    output: Option<&Path>,
) -> AppResult<u8> {
    let (session, mut form) = load_form(ctx, args).await?;
    let changes = apply_autofill(&mut form, force);
    if changes.is_empty() {
        println!("Nothing to autofill");
    }
    print_autofill(&changes);
    if let Some(path) = output {
        ep_form::save_form(path, &form)?;
        println!("✓ Wrote form: {}", path.display());
    }
    session.end();
    Ok(0)
}

async fn cmd_predict(ctx: &Context, args: &FormArgs, options: PredictOptions) -> AppResult<u8> {
    let (session, mut form) = load_form(ctx, args).await?;
    let outcome = ep_app::submit_prediction(&session, &mut form, &options).await?;
    print_autofill(&outcome.autofill);

    let summary = &outcome.summary;
    println!("{:.2} kWh ({} usage)", summary.value_kwh, summary.band.as_str());
    println!("  Model: {} • House: {}", summary.model, summary.house_id);
    if let Some(delta) = summary.delta_kwh {
        let arrow = if delta >= 0.0 { "▲" } else { "▼" };
        println!("  {arrow} {:.2} kWh vs last", delta.abs());
    }
    println!("  History: {} record(s)", outcome.history_len);
    session.end();
    Ok(0)
}

fn cmd_history_show(ctx: &Context) -> AppResult<u8> {
    let series = history_service::local_chart(&ctx.store)?;
    if series.is_empty() {
        println!("No local predictions yet");
        return Ok(0);
    }
    for point in series {
        println!("  {:<32} {:.2} kWh", point.label, point.value_kwh);
    }
    Ok(0)
}

fn cmd_history_clear(ctx: &Context) -> AppResult<u8> {
    history_service::clear_local_history(&ctx.store)?;
    println!("History cleared.");
    Ok(0)
}

async fn cmd_history_remote(ctx: &Context, query: HistoryQuery) -> AppResult<u8> {
    let records = history_service::remote_history(&ctx.client, &query).await?;
    println!("{} record(s)", records.len());
    for r in &records {
        println!(
            "  {:<28} {:<8} {:.2} kWh",
            r.timestamp.as_deref().or(r.date.as_deref()).unwrap_or("-"),
            r.model.as_deref().unwrap_or("-"),
            r.energy_kwh()
        );
    }
    Ok(0)
}

async fn cmd_dashboard(ctx: &Context) -> AppResult<u8> {
    let dashboard = history_service::load_dashboard(&ctx.client, &ctx.store).await?;
    print_dashboard(&dashboard);
    Ok(0)
}

fn print_dashboard(dashboard: &Dashboard) {
    if dashboard.source == HistorySource::LocalCache {
        println!("(service unreachable, showing local history)");
    }
    if dashboard.is_empty() {
        println!("No historical predictions yet. Run a prediction to populate this dashboard.");
        return;
    }

    println!("{:<12} {:<20} Predicted kWh", "Date", "House ID");
    for row in &dashboard.rows {
        let value = row
            .value_kwh
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<12} {:<20} {value}", row.date, row.house_id);
    }

    println!("\nTrend:");
    for point in &dashboard.trend {
        println!("  {:<12} {:.2}", point.label, point.value_kwh);
    }

    if !dashboard.breakdown.is_empty() {
        println!("\nAppliance usage:");
        for (name, total) in &dashboard.breakdown {
            println!("  {name:<20} {total:.2}");
        }
    }
}

fn cmd_appliance_add(ctx: &Context, input: ApplianceInput) -> AppResult<u8> {
    let list = appliance_service::add_appliance(&ctx.store, input)?;
    println!("Saved {} appliance(s).", list.len());
    Ok(0)
}

fn cmd_appliance_remove(ctx: &Context, position: usize) -> AppResult<u8> {
    if position == 0 {
        return Err(AppError::InvalidInput("positions start at 1".to_string()));
    }
    let removed = appliance_service::remove_appliance(&ctx.store, position - 1)?;
    println!("Removed {}", removed.name);
    Ok(0)
}

fn cmd_appliance_list(ctx: &Context) -> AppResult<u8> {
    let list = appliance_service::list_appliances(&ctx.store)?;
    if list.is_empty() {
        println!("No appliances yet. Add one with `appliance add`.");
        return Ok(0);
    }
    for (i, a) in list.iter().enumerate() {
        println!(
            "  {:>2}. {} - Power: {} W • Hours/day: {} • Qty: {}",
            i + 1,
            a.name,
            a.power,
            a.hours,
            a.qty
        );
    }
    Ok(0)
}

fn cmd_appliance_estimate(ctx: &Context) -> AppResult<u8> {
    let est = appliance_service::estimate_stored(&ctx.store)?;
    println!(
        "Estimated: {:.2} kWh/day • {:.2} kWh/month",
        est.daily_kwh, est.monthly_kwh
    );
    Ok(0)
}

async fn cmd_appliance_send(ctx: &Context) -> AppResult<u8> {
    let id = appliance_service::send_household(&ctx.client, &ctx.store).await?;
    println!("✓ Sent to service (inserted id: {id})");
    Ok(0)
}

async fn cmd_appliance_import(
    ctx: &Context,
    args: &FormArgs,
    output: Option<&Path>,
) -> AppResult<u8> {
    let (session, mut form) = load_form(ctx, args).await?;
    let outcome = appliance_service::import_into_form(&ctx.store, &mut form)?;
    let agg = outcome.aggregates;
    println!(
        "Imported: total {} W, count {}, average {} W",
        agg.total_power, agg.count, agg.avg_power
    );
    if outcome.imported.is_empty() {
        println!("  (feature order has no appliance aggregate fields)");
    }
    print_autofill(&outcome.autofill);
    match output {
        Some(path) => {
            ep_form::save_form(path, &form)?;
            println!("✓ Wrote form: {}", path.display());
        }
        None => print_form(&form)?,
    }
    session.end();
    Ok(0)
}

fn solar_input(args: &SolarArgs) -> SolarInput {
    SolarInput::from_raw(&args.daily_kwh, &args.sun_hours, args.panel_watt.as_deref())
}

fn print_sizing(sizing: &SolarSizing) {
    println!(
        "Panels: {} • Estimated generation: {:.2} kWh/day",
        sizing.panels_required, sizing.estimated_daily_generation_kwh
    );
    println!(
        "  {} W panels, {} sun hours, {:.2} Wh per panel per day",
        sizing.panel_watt, sizing.sun_hours, sizing.panel_daily_wh
    );
}

fn cmd_theme(ctx: &Context, cmd: ThemeCommands) -> AppResult<u8> {
    let theme = match cmd {
        ThemeCommands::Get => theme_service::current_theme(&ctx.store)?,
        ThemeCommands::Set { theme } => {
            let theme: Theme = theme.parse()?;
            theme_service::set_theme(&ctx.store, theme)?
        }
        ThemeCommands::Toggle => theme_service::toggle_theme(&ctx.store)?,
    };
    println!("{theme}");
    Ok(0)
}

fn print_autofill(changes: &[ep_form::AutofillChange]) {
    for change in changes {
        println!("  autofill: {} = {}", change.field, change.value);
    }
}

fn print_form(form: &FormState) -> AppResult<()> {
    let yaml = serde_yaml::to_string(form)
        .map_err(|e| AppError::Form(format!("Failed to serialize form: {e}")))?;
    print!("{yaml}");
    Ok(())
}
