use std::io::{self, BufRead, Write};

use clap::Parser;
use common::{GameStatus, Player};
use engine::EngineConfig;
use xiangqi::cli::{parse_command, Command, HELP};
use xiangqi::{EngineMove, Game};

/// 终端里和引擎下象棋
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// 难度 0/1/2
    #[arg(long, default_value_t = 1)]
    level: i32,
    /// 每 40 步的思考时间（秒）
    #[arg(long)]
    time: Option<u64>,
    /// 开局阶段随机化引擎走法
    #[arg(long)]
    random: bool,
    /// 人执红（默认）
    #[arg(long, conflicts_with = "black")]
    red: bool,
    /// 人执黑，引擎先走
    #[arg(long)]
    black: bool,
}

fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，RUST_LOG 控制级别
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = EngineConfig {
        randomize: args.random,
        ..EngineConfig::default()
    };
    if let Some(seconds) = args.time {
        config.max_time_ms = seconds as i64 * 1000;
    }
    let human = if args.red || !args.black { Player::Red } else { Player::Black };

    let mut game = Game::new(config);
    game.set_difficulty_level(args.level);
    println!("{}", game.referee());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut resigned = false;
    loop {
        if !resigned && game.status() == GameStatus::InProgress && game.next_player() != human {
            resigned = !engine_turn(&mut game);
            continue;
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", err);
                continue;
            }
        };
        match command {
            Command::Move(coords) => {
                if resigned || game.status().is_over() {
                    println!("game over, type 'new'");
                    continue;
                }
                let (from, to) = (coords.from, coords.to);
                match game.submit_human_move(from.row, from.col, to.row, to.col) {
                    Ok(status) => {
                        println!("{}", game.referee());
                        if status.is_over() {
                            println!("{}", status);
                        }
                    }
                    Err(reason) => println!("illegal move {}: {}", coords, reason),
                }
            }
            Command::New => {
                game.reset_game();
                resigned = false;
                println!("{}", game.referee());
            }
            Command::Level(level) => {
                let depth = game.set_difficulty_level(level);
                println!("search depth {}", depth);
            }
            Command::Board => println!("{}", game.referee()),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }
    Ok(())
}

// 引擎认输时返回 false
fn engine_turn(game: &mut Game) -> bool {
    match game.generate_engine_move() {
        EngineMove::Move { coords, status } => {
            println!("engine plays {}", coords);
            println!("{}", game.referee());
            if status.is_over() {
                println!("{}", status);
            }
            true
        }
        EngineMove::Resign => {
            println!("engine resigns");
            false
        }
        EngineMove::GameOver(status) => {
            println!("{}", status);
            false
        }
    }
}
