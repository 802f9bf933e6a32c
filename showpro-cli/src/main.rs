use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use showpro_core::calculations::CommissionPreset;
use showpro_core::db::{BookingRepository, DbConfig};
use showpro_core::form::BookingFeeForm;
use showpro_core::preferences::DefaultSplitPreference;
use tracing::debug;

use showpro_cli::app::{self, FeeEdits, SaveMode};
use showpro_cli::logging;
use showpro_cli::prefs::TomlPreferenceStore;
use showpro_cli::utils::{format_money, format_percent, parse_decimal_arg, parse_preset, render_breakdown};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Booking fee calculator for the ShowPro agency.
///
/// Splits a booking's total rate between artist and agency, applies VAT to
/// each side, and stores the result on the booking.
#[derive(Debug, Parser)]
struct Cli {
    /// Database backend to use.
    #[arg(long, global = true, default_value = "sqlite")]
    backend: String,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `showpro.db`) or `:memory:`.
    #[arg(long, global = true, default_value = "showpro.db")]
    db: String,

    /// Local preferences file (default split ratio).
    #[arg(long, global = true, default_value = "showpro-prefs.toml")]
    prefs: PathBuf,

    /// Log filter, e.g. `debug` or `showpro_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the fee breakdown for a total rate without storing anything.
    Quote(FeeArgs),

    /// Create, inspect, and edit stored bookings.
    #[command(subcommand)]
    Booking(BookingCommand),

    /// Manage the default split applied to new bookings.
    #[command(subcommand)]
    DefaultSplit(DefaultSplitCommand),
}

#[derive(Debug, Subcommand)]
enum BookingCommand {
    /// Create a booking; fees start from the default split.
    Create {
        /// Booking reference, e.g. `BK-2025-014`.
        reference: String,
        #[command(flatten)]
        fees: FeeArgs,
    },
    /// Show the fee breakdown of a booking.
    Show { id: i64 },
    /// List stored bookings.
    List,
    /// Edit the fees of a booking.
    SetFees {
        id: i64,
        #[command(flatten)]
        fees: FeeArgs,
        /// Keep the edits as an unsaved draft instead of saving the booking.
        #[arg(long)]
        draft: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DefaultSplitCommand {
    /// Print the stored default split.
    Show,
    /// Store a new default split (artist share, e.g. `0.85`).
    Set {
        #[arg(value_parser = parse_decimal_arg)]
        ratio: Decimal,
    },
}

#[derive(Debug, Clone, Args)]
struct FeeArgs {
    /// Total rate charged to the client.
    #[arg(long)]
    total: Option<String>,

    /// Artist share as a ratio (0.50 to 0.95).
    #[arg(long, value_parser = parse_decimal_arg, group = "split_control")]
    split: Option<Decimal>,

    /// Artist share as a percentage (50 to 95).
    #[arg(long, group = "split_control")]
    artist_percent: Option<String>,

    /// Artist net amount; the split is solved from it.
    #[arg(long, group = "split_control")]
    artist_amount: Option<String>,

    /// Agency net amount; the split is solved from it.
    #[arg(long, group = "split_control")]
    agency_amount: Option<String>,

    /// Commission preset: `standard` (15%) or `reduced` (7.5%).
    #[arg(long, value_parser = parse_preset, group = "split_control")]
    preset: Option<CommissionPreset>,

    /// VAT percentage on the artist's share.
    #[arg(long)]
    vat_artist: Option<String>,

    /// VAT percentage on the agency's share.
    #[arg(long)]
    vat_client: Option<String>,

    /// Also store the resulting split as the default for new bookings.
    #[arg(long)]
    save_default: bool,
}

impl From<&FeeArgs> for FeeEdits {
    fn from(args: &FeeArgs) -> Self {
        Self {
            total: args.total.clone(),
            vat_artist: args.vat_artist.clone(),
            vat_client: args.vat_client.clone(),
            split: args.split,
            artist_percent: args.artist_percent.clone(),
            artist_amount: args.artist_amount.clone(),
            agency_amount: args.agency_amount.clone(),
            preset: args.preset,
        }
    }
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn print_form(
    heading: &str,
    form: &BookingFeeForm,
    preset: Option<CommissionPreset>,
) {
    println!("{heading}");
    if let Some(preset) = preset {
        println!("Preset: {}", preset.label());
    }
    println!("{}", render_breakdown(&form.display()));
}

fn save_default_if_requested(
    args: &FeeArgs,
    form: &BookingFeeForm,
    prefs: &mut TomlPreferenceStore,
) -> anyhow::Result<()> {
    if args.save_default {
        form.save_split_as_default(prefs)?;
        println!(
            "Saved {} artist split as default in {}",
            format_percent(form.display().artist_percent),
            prefs.path().display()
        );
    }
    Ok(())
}

async fn open_repository(cli: &Cli) -> anyhow::Result<Arc<dyn BookingRepository>> {
    let db_config = DbConfig {
        backend: cli.backend.clone(),
        connection_string: cli.db.clone(),
    };

    debug!("connecting to {} backend", db_config.backend);
    let registry = app::build_registry();
    let repo = registry.create(&db_config).await?;
    Ok(Arc::from(repo))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let mut prefs = TomlPreferenceStore::open(&cli.prefs)?;

    match &cli.command {
        Command::Quote(args) => {
            let form = app::quote(&prefs, &FeeEdits::from(args));
            print_form("Quote", &form, args.preset);
            save_default_if_requested(args, &form, &mut prefs)?;
        }
        Command::Booking(BookingCommand::Create { reference, fees }) => {
            let repo = open_repository(&cli).await?;
            let booking = app::create_booking(&*repo, &prefs, reference, &fees.into()).await?;
            let form = BookingFeeForm::from_record(&booking);
            print_form(
                &format!("Booking {} ({})", booking.id, booking.reference),
                &form,
                fees.preset,
            );
            save_default_if_requested(fees, &form, &mut prefs)?;
        }
        Command::Booking(BookingCommand::Show { id }) => {
            let repo = open_repository(&cli).await?;
            let booking = repo.get_booking(*id).await?;
            let form = BookingFeeForm::from_record(&booking);
            print_form(&format!("Booking {} ({})", booking.id, booking.reference), &form, None);
        }
        Command::Booking(BookingCommand::List) => {
            let repo = open_repository(&cli).await?;
            for booking in repo.list_bookings().await? {
                let display = BookingFeeForm::from_record(&booking).display();
                println!(
                    "{:>5}  {:<20}{:>14}  {:>6}",
                    booking.id,
                    booking.reference,
                    format_money(display.total_rate),
                    format_percent(display.artist_percent)
                );
            }
        }
        Command::Booking(BookingCommand::SetFees { id, fees, draft }) => {
            let repo = open_repository(&cli).await?;
            let mode = if *draft { SaveMode::Draft } else { SaveMode::Save };
            let (booking, form) = app::set_booking_fees(repo, *id, &fees.into(), mode).await?;
            let heading = match mode {
                SaveMode::Save => format!("Booking {} ({}) saved", booking.id, booking.reference),
                SaveMode::Draft => {
                    format!("Booking {} ({}) draft kept", booking.id, booking.reference)
                }
            };
            print_form(&heading, &form, fees.preset);
            save_default_if_requested(fees, &form, &mut prefs)?;
        }
        Command::DefaultSplit(DefaultSplitCommand::Show) => {
            match DefaultSplitPreference::load(&prefs) {
                Some(ratio) => println!("Default split: {ratio}"),
                None => println!("No default split saved"),
            }
        }
        Command::DefaultSplit(DefaultSplitCommand::Set { ratio }) => {
            let stored = app::set_default_split(&mut prefs, *ratio)?;
            println!("Default split: {stored} (saved to {})", prefs.path().display());
        }
    }

    Ok(())
}
