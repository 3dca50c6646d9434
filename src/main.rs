use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use warzone_board_game::{
    engine::GameEngine,
    error::Result,
    game::GameState,
    game_config::JsonMapLoader,
    log::GameLog,
    player::{Behavior, Player},
    strategy::{OrderProducer, StrategyProducer},
    turn_phase::{Phase, TurnOutcome},
};

#[derive(Parser, Debug)]
#[command(name = "warzone_board_game")]
#[command(about = "Console driver for the warzone board game engine")]
struct Args {
    /// Directory holding the JSON map files
    #[arg(long, default_value = "maps")]
    maps: PathBuf,

    /// Directory for savegame/loadgame files
    #[arg(long, default_value = "saves")]
    saves: PathBuf,

    /// Tracing filter, e.g. `warzone_board_game=debug`
    #[arg(long, default_value = "warzone_board_game=info")]
    log: String,

    /// File of startup commands to run before the prompt
    #[arg(long)]
    script: Option<PathBuf>,
}

/// Prints log entries as they appear.
struct LogPrinter {
    printed: usize,
}

impl LogPrinter {
    fn print_new(&mut self, log: &GameLog) {
        for entry in log.entries().iter().skip(self.printed) {
            println!("{}", entry);
        }
        self.printed = log.len();
    }
}

/// Asks human players on stdin and lets the strategies play the rest.
struct ConsoleProducer<'a> {
    computers: StrategyProducer,
    printer: &'a mut LogPrinter,
}

impl ConsoleProducer<'_> {
    fn show_holdings(&self, player: &Player, state: &GameState) {
        println!(
            "\nPlayer {} ({} armies to deploy, cards: {:?})",
            player.name, player.reinforcements, player.cards
        );
        for id in &player.territories {
            if let Some(territory) = state.board.get_territory(*id) {
                let neighbours: Vec<&str> = territory
                    .adjacent_territories
                    .iter()
                    .map(|n| state.board.territory_name(*n))
                    .collect();
                println!(
                    "  {} [{}] -> {}",
                    territory.name,
                    territory.army_count(),
                    neighbours.join(", ")
                );
            }
        }
    }
}

impl OrderProducer for ConsoleProducer<'_> {
    fn next_order(&mut self, player: &Player, state: &GameState) -> Option<String> {
        self.printer.print_new(&state.log);
        if player.behavior != Behavior::Human {
            return self.computers.next_order(player, state);
        }
        self.show_holdings(player, state);
        let line = prompt("order (empty to pass)> ")?;
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }

    fn wants_more_orders(&mut self, player: &Player, state: &GameState) -> bool {
        self.printer.print_new(&state.log);
        if player.behavior != Behavior::Human {
            return self.computers.wants_more_orders(player, state);
        }
        matches!(
            prompt(&format!("{}, issue another order? (Y/N)> ", player.name)).as_deref(),
            Some("y") | Some("Y")
        )
    }
}

fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!(maps = %args.maps.display(), "warzone board game starting");

    let loader = Arc::new(JsonMapLoader::new(&args.maps));
    let mut engine = GameEngine::new(loader).with_save_dir(&args.saves);
    let mut printer = LogPrinter { printed: 0 };

    if let Some(script) = &args.script {
        let commands = std::fs::read_to_string(script)?;
        for line in commands.lines().filter(|l| !l.trim().is_empty()) {
            engine.submit(line);
        }
        printer.print_new(&engine.state.log);
    }

    println!("\n=== WARZONE ===");
    println!("Startup commands: loadmap, editmap, editcontinent, editcountry, editneighbor,");
    println!("validatemap, savemap, showmap, gameplayer, assigncountries, tournament,");
    println!("savegame, loadgame. Type 'exit' to quit.");

    loop {
        match engine.phase() {
            Phase::Startup => {
                let line = match prompt("> ") {
                    Some(line) => line,
                    None => break,
                };
                if line.eq_ignore_ascii_case("exit") {
                    break;
                }
                if !line.is_empty() {
                    engine.submit(&line);
                }
                printer.print_new(&engine.state.log);
            }
            Phase::IssueOrders => {
                let mut producer = ConsoleProducer {
                    computers: StrategyProducer::new(),
                    printer: &mut printer,
                };
                engine.run_issue_orders(&mut producer)?;
                printer.print_new(&engine.state.log);
            }
            Phase::OrderExecution => {
                let outcome = engine.run_order_execution()?;
                printer.print_new(&engine.state.log);
                match outcome {
                    TurnOutcome::GameOver { .. } => break,
                    TurnOutcome::AwaitingDecision => {
                        let answer = prompt("Continue to the next turn? (Y/N)> ");
                        if matches!(answer.as_deref(), Some("y") | Some("Y")) {
                            engine.continue_game()?;
                        } else {
                            engine.end_game()?;
                            printer.print_new(&engine.state.log);
                        }
                    }
                    TurnOutcome::NextTurn | TurnOutcome::TurnLimitReached | TurnOutcome::Draw => {}
                }
            }
        }
    }

    tracing::info!("warzone board game exiting");
    Ok(())
}
