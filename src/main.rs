#[macro_use]
extern crate log;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use futures::try_join;
use serde_json::{json, Value};
use tokio::task::spawn_blocking;

use timetrials::{
    config::AppConfig,
    engine::Snapshot,
    helpers::{get_connection, get_pool, MysqlPool},
    records::{db, db::DbSource, submission::Submission},
    reports,
};

/// Time trial world records, rankings and history
#[derive(Parser)]
#[command(name = "timetrials")]
#[command(version)]
struct Cli {
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best time per course
    CurrentWrs,
    /// Best time per course and machine
    WrSnapshot,
    /// Current records set within the last N days
    RecentWrs {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Players ranked by records set and days held
    Players,
    /// Countries ranked by current records held
    Countries,
    /// Everything shown on a course page
    Course { key: String },
    /// Every record holder a course and machine has had
    History { course: String, machine: String },
    /// Known countries
    CountryList,
    /// Records whose stored time doesn't match their time string
    Check,
    /// Every report at once
    All,
    /// Store a new time for a player
    Submit(SubmitArgs),
    /// Remove a player and all of their records
    DeleteUser { username: String },
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    course: String,
    #[arg(long)]
    machine: String,
    #[arg(long)]
    character: String,
    /// Time like 1'05"780
    #[arg(long)]
    time: String,
    #[arg(long)]
    lap1: Option<f32>,
    #[arg(long)]
    lap2: Option<f32>,
    #[arg(long)]
    lap3: Option<f32>,
    #[arg(long)]
    proof: String,
    /// Day the time was set, defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let today = cli.today.unwrap_or_else(|| Utc::now().naive_utc().date());
    let pool = get_pool(config.database_url()?, config.pool_size)?;

    let output = match cli.command {
        Commands::Submit(args) => submit(pool, args, today).await?,
        Commands::DeleteUser { username } => delete_user(pool, username).await?,
        Commands::History { course, machine } => history(pool, course, machine, today).await?,
        command => {
            let snapshot = Arc::new(load_snapshot(pool).await?);
            render(command, snapshot, today, config.recent_days).await?
        }
    };

    let text = match cli.pretty {
        true => serde_json::to_string_pretty(&output)?,
        false => serde_json::to_string(&output)?,
    };
    println!("{}", text);

    Ok(())
}

async fn load_snapshot(pool: MysqlPool) -> Result<Snapshot> {
    spawn_blocking(move || {
        let conn = get_connection(&pool)?;
        db::load_snapshot(&conn)
    })
    .await?
}

async fn render(
    command: Commands,
    snapshot: Arc<Snapshot>,
    today: NaiveDate,
    recent_days: u32,
) -> Result<Value> {
    let value = match command {
        Commands::CurrentWrs => json!(reports::current_wrs(&snapshot, today)),
        Commands::WrSnapshot => json!(reports::wr_snapshot(&snapshot, today)),
        Commands::RecentWrs { days } => {
            json!(reports::recent_wrs(&snapshot, today, days.unwrap_or(recent_days)))
        }
        Commands::Players => json!(reports::player_rankings(&snapshot, today)),
        Commands::Countries => json!(reports::country_rankings(&snapshot)),
        Commands::Course { key } => match reports::course_view(&snapshot, &key, today) {
            Some(view) => json!(view),
            None => return Err(anyhow!("Course not found: {}", key)),
        },
        Commands::CountryList => json!(reports::countries(&snapshot.catalog)),
        Commands::Check => {
            let flagged = reports::flagged_records(&snapshot);
            if !flagged.is_empty() {
                warn!("{} record(s) failed the consistency check", flagged.len());
            }
            json!(flagged)
        }
        Commands::All => render_all(snapshot, today, recent_days).await?,
        Commands::Submit(_) | Commands::DeleteUser { .. } | Commands::History { .. } => {
            return Err(anyhow!("Not a snapshot report"))
        }
    };

    Ok(value)
}

// the reports only read the snapshot, so they can be built side by side
async fn render_all(snapshot: Arc<Snapshot>, today: NaiveDate, recent_days: u32) -> Result<Value> {
    let s = Arc::clone(&snapshot);
    let current = spawn_blocking(move || reports::current_wrs(&s, today));
    let s = Arc::clone(&snapshot);
    let pairs = spawn_blocking(move || reports::wr_snapshot(&s, today));
    let s = Arc::clone(&snapshot);
    let recent = spawn_blocking(move || reports::recent_wrs(&s, today, recent_days));
    let s = Arc::clone(&snapshot);
    let players = spawn_blocking(move || reports::player_rankings(&s, today));
    let s = Arc::clone(&snapshot);
    let countries = spawn_blocking(move || reports::country_rankings(&s));

    let (current, pairs, recent, players, countries) =
        try_join!(current, pairs, recent, players, countries)?;
    info!(
        "Built all reports: {} course(s), {} pair(s), {} player(s)",
        current.len(),
        pairs.len(),
        players.len()
    );

    Ok(json!({
        "current_wrs": current,
        "wr_snapshot": pairs,
        "recent_wrs": recent,
        "player_rankings": players,
        "country_rankings": countries,
        "flagged": reports::flagged_records(&snapshot),
    }))
}

// only the one pair's rows are needed, so this skips the full snapshot
async fn history(
    pool: MysqlPool,
    course: String,
    machine: String,
    today: NaiveDate,
) -> Result<Value> {
    spawn_blocking(move || -> Result<Value> {
        let snapshot = DbSource::new(pool)
            .pair_snapshot(&course, &machine)?
            .ok_or_else(|| anyhow!("No such course/machine: {} / {}", course, machine))?;
        let progression = reports::wr_progression(&snapshot, &course, &machine, today)
            .unwrap_or_default();

        Ok(json!(progression))
    })
    .await?
}

async fn submit(pool: MysqlPool, args: SubmitArgs, today: NaiveDate) -> Result<Value> {
    spawn_blocking(move || -> Result<Value> {
        let conn = get_connection(&pool)?;
        let catalog = db::load_catalog(&conn)?;
        let user = catalog
            .user_by_name(&args.user)
            .ok_or_else(|| anyhow!("User not found: {}", args.user))?;
        let submission = Submission {
            course_key: args.course,
            machine_name: args.machine,
            character_name: args.character,
            time: args.time,
            lap1: args.lap1,
            lap2: args.lap2,
            lap3: args.lap3,
            proof_url: args.proof,
        };
        let new_record = submission.resolve(
            &catalog,
            user.id,
            args.date.unwrap_or(today),
            Utc::now().naive_utc(),
        )?;
        let id = db::insert_record(&conn, &new_record)?;

        Ok(json!({ "ok": true, "record_id": id, "proof_url": new_record.proof_url }))
    })
    .await?
}

async fn delete_user(pool: MysqlPool, username: String) -> Result<Value> {
    spawn_blocking(move || -> Result<Value> {
        let conn = get_connection(&pool)?;
        let catalog = db::load_catalog(&conn)?;
        let user = catalog
            .user_by_name(&username)
            .ok_or_else(|| anyhow!("User not found: {}", username))?;
        let removed = db::delete_user(&conn, user.id)?
            .ok_or_else(|| anyhow!("User {} was already deleted", username))?;

        Ok(json!({ "ok": true, "records_removed": removed }))
    })
    .await?
}
