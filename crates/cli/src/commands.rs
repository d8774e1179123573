//! Subcommand execution.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _};

use jyotish_client::api::{ApiError, AstroApi};
use jyotish_client::cache::ChartCache;
use jyotish_client::config::ClientConfig;
use jyotish_client::flow::{ChartFlow, LoadOutcome, PageState};
use jyotish_client::messages::{ChatRequest, SignupRequest};
use jyotish_client::session::Session;
use jyotish_client::storage::{FileStorage, Storage};
use jyotish_core::chart::{ChartResult, Division};
use jyotish_core::identity::Selection;
use jyotish_core::params::ChartQueryParams;
use jyotish_core::person::{NewFamilyMember, ProfileUpdate};
use jyotish_core::projection::project;
use jyotish_core::readings;

use crate::args::{BirthArgs, Cli, Command, FamilyCommand, MatchArgs, ProfileArgs, SignupArgs};
use crate::render;

pub struct App {
    flow: ChartFlow,
    json: bool,
}

impl App {
    /// Wire storage, session, API client and cache from configuration.
    pub fn from_config(config: &ClientConfig, json: bool) -> anyhow::Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        let session = Session::restore(storage.clone()).context("Failed to read stored session")?;
        let api = AstroApi::new(config, session).context("Failed to build HTTP client")?;
        Ok(Self::new(ChartFlow::new(api, ChartCache::new(storage)), json))
    }

    pub fn new(flow: ChartFlow, json: bool) -> Self {
        Self { flow, json }
    }

    fn api(&self) -> &AstroApi {
        self.flow.api()
    }

    /// Turn an API error into the user-facing notice, signing out on 401.
    fn fail(&self, e: ApiError) -> anyhow::Error {
        if e.is_unauthorized() {
            tracing::warn!("Backend rejected the session token, signing out");
            if let Err(err) = self.flow.session().end() {
                tracing::error!(error = %err, "Failed to clear the session");
            }
        }
        tracing::debug!(error = %e, "Command failed");
        anyhow!(e.notice())
    }

    /// Like [`App::fail`], for calls that present credentials instead of
    /// the stored token. A 401 there means bad credentials, so the
    /// existing session is kept.
    fn fail_sign_in(&self, e: ApiError) -> anyhow::Error {
        tracing::debug!(error = %e, "Sign-in failed");
        anyhow!(e.notice())
    }

    fn require_login(&self) -> anyhow::Result<()> {
        if !self.flow.session().is_authenticated() {
            bail!("Not signed in. Run `jyotish login` first.");
        }
        Ok(())
    }

    fn print_json(&self, value: &impl serde::Serialize) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Load the chart of `selection`, printing why when there is none.
    async fn chart_for(&self, selection: Selection) -> anyhow::Result<Option<ChartResult>> {
        self.require_login()?;
        let (_, outcome) = self.flow.open(selection).await;
        match outcome {
            LoadOutcome::Applied(PageState::Ready { chart, .. }) => Ok(Some(chart)),
            LoadOutcome::Applied(PageState::Empty(reason)) => {
                println!("{}", render::empty_state(&reason));
                Ok(None)
            }
            LoadOutcome::Applied(PageState::Error(notice)) => Err(anyhow!(notice)),
            other => bail!("Chart load did not complete: {other:?}"),
        }
    }
}

pub async fn run(cli: Cli, app: &App) -> anyhow::Result<()> {
    match cli.command {
        Command::Login {
            email,
            password,
            google_token,
        } => {
            let auth = match (google_token, email, password) {
                (Some(token), _, _) => app.api().google_login(&token).await,
                (None, Some(email), Some(password)) => app.api().login(&email, &password).await,
                _ => bail!("Provide --email and --password, or --google-token"),
            }
            .map_err(|e| app.fail_sign_in(e))?;
            println!("Signed in as {}.", auth.user.name);
        }
        Command::Signup(args) => signup(app, args).await?,
        Command::Logout => {
            app.flow.session().end()?;
            println!("Signed out.");
        }
        Command::Me => {
            app.require_login()?;
            let me = app.api().current_user().await.map_err(|e| app.fail(e))?;
            if app.json {
                app.print_json(&me)?;
            } else {
                print!("{}", render::person(&me));
            }
        }
        Command::Profile(args) => profile(app, args).await?,
        Command::Dashboard => {
            app.require_login()?;
            match app.flow.load_own().await {
                LoadOutcome::Applied(PageState::Ready { chart, .. }) => {
                    if app.json {
                        app.print_json(&chart)?;
                    } else {
                        print!("{}", render::dashboard(&chart));
                    }
                }
                LoadOutcome::Applied(PageState::Empty(reason)) => {
                    println!("{}", render::empty_state(&reason));
                }
                LoadOutcome::Applied(PageState::Error(notice)) => bail!(notice),
                other => bail!("Chart load did not complete: {other:?}"),
            }
        }
        Command::Chart {
            person,
            division,
            cached,
        } => {
            let chart = if cached {
                match app.flow.placeholder() {
                    Some(chart) => Some(chart),
                    None => bail!("No cached chart. Run `jyotish chart` once to fetch one."),
                }
            } else {
                app.chart_for(person.selection).await?
            };
            if let Some(chart) = chart {
                show_chart(app, &chart, division)?;
            }
        }
        Command::Planets { person, division } => {
            if let Some(chart) = app.chart_for(person.selection).await? {
                if app.json {
                    app.print_json(&project(&chart, division).chart)?;
                } else {
                    let rows = readings::divisional_planet_rows(&chart, division);
                    println!("{}", division.label());
                    print!("{}", render::planet_table(&rows));
                }
            }
        }
        Command::Dasha { person } => {
            if let Some(chart) = app.chart_for(person.selection).await? {
                let timeline = readings::dasha_timeline(&chart);
                if app.json {
                    app.print_json(&timeline)?;
                } else {
                    println!("{}", readings::active_mahadasha(&chart));
                    let current = readings::current_period_index(&timeline);
                    print!("{}", render::dasha(&timeline, current));
                }
            }
        }
        Command::Yogas { person, all } => {
            if let Some(chart) = app.chart_for(person.selection).await? {
                let list = if all {
                    readings::yogas(&chart)
                } else {
                    readings::present_yogas(&chart)
                };
                print!("{}", render::yogas(&list));
            }
        }
        Command::Match(args) => match_profiles(app, args).await?,
        Command::Family { command } => family(app, command).await?,
        Command::Places { query } => {
            let places = app
                .api()
                .location_suggestions(&query)
                .await
                .map_err(|e| app.fail(e))?;
            if places.is_empty() {
                println!("No places found for '{query}'.");
            } else {
                print!("{}", render::places(&places));
            }
        }
        Command::Ask { person, question } => {
            if let Some(chart) = app.chart_for(person.selection).await? {
                let context = serde_json::to_value(&chart)?;
                let answer = app
                    .api()
                    .analyze(&question, &context)
                    .await
                    .map_err(|e| app.fail(e))?;
                println!("{answer}");
            }
        }
        Command::Learn {
            message,
            module,
            lesson,
        } => {
            let Some(message) = message else {
                let modules = app.api().learning_modules().await.map_err(|e| app.fail(e))?;
                return app.print_json(&modules);
            };
            let reply = app
                .api()
                .guru_chat(&ChatRequest {
                    message,
                    current_module_id: module,
                    current_lesson_id: lesson,
                })
                .await
                .map_err(|e| app.fail(e))?;
            println!("{}", reply.reply);
            if let Some(refs) = reply.references.filter(|r| !r.is_empty()) {
                println!("See: {}", refs.join(", "));
            }
        }
    }
    Ok(())
}

fn show_chart(app: &App, chart: &ChartResult, division: Division) -> anyhow::Result<()> {
    let view = project(chart, division);
    if app.json {
        return app.print_json(&view.chart);
    }
    print!("{}", render::chart_view(&view));
    Ok(())
}

async fn signup(app: &App, args: SignupArgs) -> anyhow::Result<()> {
    if args.password.len() < SignupRequest::MIN_PASSWORD_LEN {
        bail!(
            "Password must be at least {} characters",
            SignupRequest::MIN_PASSWORD_LEN
        );
    }
    let request = SignupRequest {
        name: args.name,
        email: args.email,
        password: args.password,
        mobile_number: args.mobile,
        date_of_birth: args.birth.dob,
        time_of_birth: args.birth.tob,
        location: args.birth.place,
        latitude: Some(args.birth.lat),
        longitude: Some(args.birth.lon),
        timezone: args.birth.tz,
    }
    .with_default_timezone();

    let auth = app
        .api()
        .signup(&request)
        .await
        .map_err(|e| app.fail_sign_in(e))?;
    println!("Account created. Signed in as {}.", auth.user.name);
    Ok(())
}

async fn profile(app: &App, args: ProfileArgs) -> anyhow::Result<()> {
    app.require_login()?;
    let update = ProfileUpdate {
        name: args.name,
        email: None,
        mobile_number: None,
        date_of_birth: args.dob,
        time_of_birth: args.tob,
        location: args.place,
        latitude: args.lat,
        longitude: args.lon,
        timezone: args.tz,
    };
    if update.is_empty() {
        bail!("Nothing to update. Pass at least one of --name, --dob, --tob, --place, --lat, --lon, --tz");
    }
    let person = app
        .api()
        .update_profile(&update)
        .await
        .map_err(|e| app.fail(e))?;
    print!("{}", render::person(&person));
    Ok(())
}

/// Fill missing coordinates from the first place suggestion.
async fn locate(
    app: &App,
    place: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> anyhow::Result<(Option<f64>, Option<f64>)> {
    if lat.is_some() && lon.is_some() {
        return Ok((lat, lon));
    }
    let Some(place) = place else {
        return Ok((lat, lon));
    };
    let found = app
        .api()
        .location_suggestions(place)
        .await
        .map_err(|e| app.fail(e))?;
    match found.first() {
        Some(p) => {
            tracing::info!(place, resolved = %p.display_name, "Resolved birth place");
            Ok((Some(p.latitude), Some(p.longitude)))
        }
        None => Ok((None, None)),
    }
}

async fn match_profiles(app: &App, args: MatchArgs) -> anyhow::Result<()> {
    app.require_login()?;
    let (boy_lat, boy_lon) = locate(app, args.boy_place.as_deref(), args.boy_lat, args.boy_lon).await?;
    let (girl_lat, girl_lon) =
        locate(app, args.girl_place.as_deref(), args.girl_lat, args.girl_lon).await?;

    let boy = ChartQueryParams::from_birth_form(&args.boy_dob, &args.boy_tob, boy_lat, boy_lon, &args.tz)?;
    let girl =
        ChartQueryParams::from_birth_form(&args.girl_dob, &args.girl_tob, girl_lat, girl_lon, &args.tz)?;

    let result = app
        .api()
        .match_charts(&boy, &girl)
        .await
        .map_err(|e| app.fail(e))?;
    if app.json {
        return app.print_json(&result);
    }
    print!("{}", render::match_result(&result));
    Ok(())
}

async fn family(app: &App, command: FamilyCommand) -> anyhow::Result<()> {
    app.require_login()?;
    match command {
        FamilyCommand::List => {
            let directory = app
                .flow
                .load_directory()
                .await
                .map_err(|e| anyhow!(ChartFlow::notice(&e)))?;
            if app.json {
                app.print_json(&directory.members)?;
            } else {
                print!("{}", render::family(&directory));
            }
        }
        FamilyCommand::Add {
            name,
            relationship,
            gender,
            birth,
        } => {
            let member = new_member(name, relationship, gender, birth);
            let added = app
                .api()
                .add_family_member(&member)
                .await
                .map_err(|e| app.fail(e))?;
            println!("Added {} (id {}).", added.person.name, added.id);
        }
        FamilyCommand::Update {
            id,
            name,
            relationship,
            gender,
            birth,
        } => {
            let member = new_member(name, relationship, gender, birth);
            let updated = app
                .api()
                .update_family_member(id, &member)
                .await
                .map_err(|e| app.fail(e))?;
            println!("Updated {} (id {}).", updated.person.name, updated.id);
        }
        FamilyCommand::Remove { id } => {
            app.api()
                .delete_family_member(id)
                .await
                .map_err(|e| app.fail(e))?;
            println!("Removed family member {id}.");
        }
    }
    Ok(())
}

fn new_member(
    name: String,
    relationship: String,
    gender: String,
    birth: BirthArgs,
) -> NewFamilyMember {
    NewFamilyMember {
        name,
        relationship,
        gender,
        date_of_birth: birth.dob,
        time_of_birth: birth.tob,
        location: birth.place,
        latitude: birth.lat,
        longitude: birth.lon,
        timezone: birth.tz,
    }
}
