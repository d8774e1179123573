//! Command-line arguments.

use clap::{Args, Parser, Subcommand};

use jyotish_core::chart::Division;
use jyotish_core::identity::Selection;
use jyotish_core::types::{DbId, DEFAULT_TIMEZONE};

#[derive(Debug, Parser)]
#[command(name = "jyotish", version)]
#[command(about = "Vedic astrology charts from the terminal")]
#[command(
    after_help = "Environment:\n  JYOTISH_API_URL               Backend base URL\n  JYOTISH_REQUEST_TIMEOUT_SECS  Per-request timeout\n  JYOTISH_DATA_DIR              Session and cache directory\n  RUST_LOG                      Log filter"
)]
pub struct Cli {
    /// Print backend JSON instead of formatted text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password, or with a Google ID token.
    Login {
        #[arg(long, required_unless_present = "google_token")]
        email: Option<String>,
        #[arg(long, env = "JYOTISH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, conflicts_with_all = ["email", "password"])]
        google_token: Option<String>,
    },
    /// Create an account.
    Signup(SignupArgs),
    /// Forget the stored session.
    Logout,
    /// Show the signed-in account.
    Me,
    /// Update birth details of the signed-in account.
    Profile(ProfileArgs),
    /// Summary of your own chart.
    Dashboard,
    /// Show a chart, optionally a divisional one.
    Chart {
        #[command(flatten)]
        person: PersonArg,
        #[arg(long, default_value_t = Division::D1)]
        division: Division,
        /// Show the last fetched chart without contacting the backend.
        #[arg(long, default_value_t = false)]
        cached: bool,
    },
    /// Planetary positions table.
    Planets {
        #[command(flatten)]
        person: PersonArg,
        #[arg(long, default_value_t = Division::D1)]
        division: Division,
    },
    /// Vimshottari dasha timeline.
    Dasha {
        #[command(flatten)]
        person: PersonArg,
    },
    /// Yogas present in the chart.
    Yogas {
        #[command(flatten)]
        person: PersonArg,
        /// Include yogas that are not strong or active.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Ashta Koota compatibility of two birth profiles.
    Match(MatchArgs),
    /// Manage family members.
    Family {
        #[command(subcommand)]
        command: FamilyCommand,
    },
    /// Look up birth place coordinates.
    Places { query: String },
    /// Ask the AI astrologer about a chart.
    Ask {
        #[command(flatten)]
        person: PersonArg,
        question: String,
    },
    /// Chat with the learning assistant, or list modules.
    Learn {
        message: Option<String>,
        #[arg(long)]
        module: Option<String>,
        #[arg(long)]
        lesson: Option<String>,
    },
}

/// Whose chart to load.
#[derive(Debug, Clone, Args)]
pub struct PersonArg {
    /// `me` or a family member id.
    #[arg(long = "person", default_value_t = Selection::Me)]
    pub selection: Selection,
}

#[derive(Debug, Clone, Args)]
pub struct BirthArgs {
    /// Date of birth, `YYYY-MM-DD`.
    #[arg(long)]
    pub dob: String,
    /// Time of birth, `HH:MM`.
    #[arg(long)]
    pub tob: String,
    /// Birth place name.
    #[arg(long)]
    pub place: String,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub tz: String,
}

#[derive(Debug, Clone, Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "JYOTISH_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub mobile: String,
    #[command(flatten)]
    pub birth: BirthArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub tob: Option<String>,
    #[arg(long)]
    pub place: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
    #[arg(long)]
    pub tz: Option<String>,
}

/// Two ad hoc birth profiles. A profile given a `--*-place` but no
/// coordinates is geocoded to the first suggestion.
#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    #[arg(long)]
    pub boy_dob: String,
    #[arg(long)]
    pub boy_tob: String,
    #[arg(long)]
    pub boy_place: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub boy_lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub boy_lon: Option<f64>,
    #[arg(long)]
    pub girl_dob: String,
    #[arg(long)]
    pub girl_tob: String,
    #[arg(long)]
    pub girl_place: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub girl_lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub girl_lon: Option<f64>,
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub tz: String,
}

#[derive(Debug, Subcommand)]
pub enum FamilyCommand {
    /// List yourself and your family members with their `--person` ids.
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        relationship: String,
        #[arg(long)]
        gender: String,
        #[command(flatten)]
        birth: BirthArgs,
    },
    /// Replace a member's details.
    Update {
        id: DbId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        relationship: String,
        #[arg(long)]
        gender: String,
        #[command(flatten)]
        birth: BirthArgs,
    },
    Remove { id: DbId },
}
