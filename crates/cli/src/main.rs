mod api;
mod wizard;

use anyhow::Context;
use api::ApiSink;
use camp_core::config::{state_dir_from_env_value, state_ttl_from_env_value};
use camp_core::{
    catalogue, forms, FormController, FormId, FormRecord, StateConfig, ValidationErrors,
};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard::Outcome;

#[derive(Parser)]
#[command(name = "camp")]
#[command(about = "Football camp registration forms CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct StateArgs {
    /// Directory holding saved progress (default: CAMP_STATE_DIR or .camp-state)
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

#[derive(Args)]
struct WizardArgs {
    #[command(flatten)]
    state: StateArgs,
    /// Base URL of the camp REST API
    #[arg(long, env = "CAMP_API_URL", default_value = "http://localhost:3000")]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the registration form step by step
    Register(WizardArgs),
    /// Fill in the supplemental (medical, sports, uniform) form
    Supplemental(WizardArgs),
    /// Validate a saved record
    Validate {
        /// registration, supplemental or pre-registration
        form: String,
        /// JSON object of field name to value
        record: PathBuf,
        /// Validate only this 1-based step
        #[arg(long)]
        step: Option<usize>,
    },
    /// Print cities, camp weeks, categories and price
    Catalogue,
    /// Remove all saved progress
    Clear(StateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("camp_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Register(args)) => fill(FormId::Registration, args).await?,
        Some(Commands::Supplemental(args)) => fill(FormId::Supplemental, args).await?,
        Some(Commands::Validate { form, record, step }) => {
            let form: FormId = form.parse()?;
            let errors = validate_file(form, &record, step)?;
            if errors.is_empty() {
                println!("OK");
            } else {
                for (field, message) in errors.iter() {
                    println!("{field}: {message}");
                }
                anyhow::bail!("{} field(s) failed validation", errors.len());
            }
        }
        Some(Commands::Catalogue) => print_catalogue(),
        Some(Commands::Clear(args)) => {
            state_config(&args)?.open()?.clear_all()?;
            println!("Saved progress removed.");
        }
        None => {
            println!("Use 'camp --help' for commands");
        }
    }

    Ok(())
}

fn state_config(args: &StateArgs) -> anyhow::Result<StateConfig> {
    let state_dir = match &args.state_dir {
        Some(dir) => dir.clone(),
        None => state_dir_from_env_value(std::env::var("CAMP_STATE_DIR").ok()),
    };
    let ttl = state_ttl_from_env_value(std::env::var("CAMP_STATE_TTL_DAYS").ok())?;
    Ok(StateConfig::new(state_dir, ttl)?)
}

async fn fill(form: FormId, args: WizardArgs) -> anyhow::Result<()> {
    let state = state_config(&args.state)?.open()?;
    let mut controller = FormController::resume(forms::definition(form), state);
    let sink = ApiSink::new(&args.api_url)?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    match wizard::run(&mut controller, &sink, &mut input, &mut output).await? {
        Outcome::Submitted(_) => tracing::info!("{} form submitted", form),
        Outcome::Quit => tracing::info!("{} form left at step {}", form, controller.step()),
    }
    Ok(())
}

/// Validates the record stored at `path`, either one step or every step.
fn validate_file(
    form: FormId,
    path: &Path,
    step: Option<usize>,
) -> anyhow::Result<ValidationErrors> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let record: FormRecord = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut controller = FormController::for_form(form);
    for (name, value) in record.iter() {
        controller.update_field(name, value.clone())?;
    }
    Ok(match step {
        Some(step) => controller.validate_step(step)?,
        None => controller.definition().validate_all(controller.record()),
    })
}

fn print_catalogue() {
    println!("Ciudades:");
    for city in catalogue::CITIES {
        println!("  {} ({})", city.name, city.id);
        for date in catalogue::dates_for_city(city.id) {
            println!("    {} [{}]", date.label, date.id);
        }
    }
    println!("Categorías:");
    for category in catalogue::CATEGORIES {
        println!("  {} - {} [{}]", category.title, category.age_range, category.id);
    }
    let price = catalogue::price();
    println!("Precio: {} + IVA {} = {}", price.base, price.iva, price.total);
}
