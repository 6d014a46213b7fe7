//! piggy-runner: headless runner for Piggy Bank Adventures.
//!
//! Usage:
//!   piggy-runner --seed 12345 --months 12 --db game.db
//!   piggy-runner --seed 12345 --ipc-mode --config piggy.json

use anyhow::Result;
use piggy_core::{
    action::GameAction,
    catalog::{shop_item, subscription_item},
    companion::{Companion, GeminiClient},
    config::GameConfig,
    engine::Outcome,
    metrics::DerivedMetrics,
    scam::{ClickOutcome, ScamChoice, ScamPhase},
    session::{self, GameSession, SessionHandle},
    state::GameState,
    store::GameStore,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Dispatch { action: GameAction },
    Click,
    ResolveScam { choice: ScamChoice },
    CloseScam,
    Ask { message: String },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    state:   &'a GameState,
    metrics: DerivedMetrics,
    scam:    ScamPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply:   Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let months = parse_arg(&args, "--months", 12u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let config = match string_arg(&args, "--config") {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if !ipc_mode {
        println!("Piggy Bank Adventures - piggy-runner");
        println!("  seed:    {seed}");
        println!("  months:  {months}");
        println!("  db:      {db}");
        println!();
    }

    let store = if db == ":memory:" {
        GameStore::in_memory()?
    } else {
        GameStore::open(db)?
    };
    store.migrate()?;

    let session_id = format!("session-{seed}-{}", unix_secs());
    let game = GameSession::new(session_id, seed, config.clone()).with_store(store)?;
    let (handle, task) = session::spawn(game);

    if ipc_mode {
        run_ipc_loop(&handle, &config).await?;
    } else {
        autoplay(&handle, months, config.scam.trigger_delay_ms).await?;
    }

    handle.shutdown().await?;
    let game = task.await?;
    if !ipc_mode {
        print_summary(&game)?;
    }
    Ok(())
}

/// A careful saver: one treat, one small subscription, most of the
/// allowance banked, and every scam turned down.
async fn autoplay(handle: &SessionHandle, months: u32, trigger_delay_ms: u64) -> Result<()> {
    handle
        .dispatch(GameAction::SetPlayerName { name: "Runner".into() })
        .await?;
    handle.dispatch(GameAction::StartGame).await?;

    if let Some(spotify) = subscription_item("spotify") {
        handle.dispatch(spotify.subscribe()).await?;
    }

    for month in 0..months {
        let state = handle.snapshot();
        if state.game_ended {
            break;
        }

        if let Some(candy) = shop_item("candy") {
            if state.wallet >= 50 {
                handle.dispatch(candy.purchase()).await?;
            }
        }
        let wallet = handle.snapshot().wallet;
        handle
            .dispatch(GameAction::TransferToSavings { amount: wallet / 2 })
            .await?;
        handle
            .dispatch(GameAction::TransferToInvestments { amount: wallet / 5 })
            .await?;
        if month == 5 {
            handle
                .dispatch(GameAction::RemoveSubscription { id: "spotify".into() })
                .await?;
        }

        // Every few clicks the scam timer arms; give it time to fire.
        let mut scheduled = false;
        for _ in 0..3 {
            scheduled |= handle.track_click().await? == ClickOutcome::Scheduled;
        }
        if scheduled {
            tokio::time::sleep(Duration::from_millis(trigger_delay_ms + 50)).await;
            if !handle.scam_phase().is_idle() {
                handle.resolve_scam(ScamChoice::AvoidedIt).await?;
            }
        }

        handle.dispatch(GameAction::AdvanceMonth).await?;
    }
    Ok(())
}

async fn run_ipc_loop(handle: &SessionHandle, config: &GameConfig) -> Result<()> {
    let mut stdout = io::stdout();
    let mut piggy = Companion::new(
        GeminiClient::new(config.companion.clone().with_env_keys()),
        config.companion.history_window,
    )
    .with_economy(config.economy.clone());

    // stdin is blocking; read it on its own thread.
    let (lines_tx, mut lines) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        let cmd: IpcCommand = match serde_json::from_str(&line) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unknown command: {}", line.trim());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let (outcome, reply) = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => (None, None),
            IpcCommand::Dispatch { action } => (Some(handle.dispatch(action).await?), None),
            IpcCommand::Click => {
                handle.track_click().await?;
                (None, None)
            }
            IpcCommand::ResolveScam { choice } => (handle.resolve_scam(choice).await?, None),
            IpcCommand::CloseScam => {
                handle.close_scam().await?;
                (None, None)
            }
            IpcCommand::Ask { message } => {
                let snapshot = handle.snapshot();
                (None, piggy.reply(&message, &snapshot).await)
            }
        };

        let state = handle.snapshot();
        let ui = UiState {
            state: &state,
            metrics: handle.metrics(),
            scam: handle.scam_phase(),
            outcome,
            reply,
        };
        writeln!(stdout, "{}", serde_json::to_string(&ui)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(game: &GameSession) -> Result<()> {
    let state = game.snapshot();
    let metrics = game.metrics();

    println!("=== GAME SUMMARY ===");
    println!("  session:        {}", game.session_id);
    println!("  final month:    {}", state.current_month);
    println!("  game ended:     {}", state.game_ended);
    println!("  wallet:         ${}", state.wallet);
    println!("  savings:        ${}", state.savings);
    println!("  investments:    ${}", state.investments);
    println!("  total wealth:   ${}", metrics.total_wealth);
    println!(
        "  last month:     {:+} ({:+.1}%)",
        metrics.monthly_change, metrics.monthly_change_percent
    );
    println!("  total earned:   ${}", state.total_earned);
    println!("  total spent:    ${}", state.total_spent);
    println!("  scams avoided:  {}", state.scams_avoided);
    println!("  scams fell for: {}", state.scams_fell_for);
    println!("  transactions:   {}", state.transactions.len());

    if let Some(store) = game.store() {
        let surfaced = store.event_count(&game.session_id, "scam_surfaced")?;
        println!("  scams surfaced: {surfaced}");
    }

    println!();
    println!("=== WEALTH HISTORY ===");
    for (month, wealth) in state.wealth_history.iter().enumerate() {
        println!("  month {:>2}: ${wealth}", month + 1);
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn unix_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
