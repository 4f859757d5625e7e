use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use realmweaver::llm::OpenAiClient;
use realmweaver::{AdventureEngine, Config, MenuChoice, Output};

type Input = Lines<BufReader<Stdin>>;

fn print_outputs(outputs: &[Output]) {
    for output in outputs {
        match output {
            Output::Narration(_) => println!("\n{}\n", output),
            _ => println!("{}", output),
        }
    }
}

/// Show `prompt` and wait for a line; `None` at end of input
async fn read_line(input: &mut Input, prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

async fn start_new_game(engine: &mut AdventureEngine, input: &mut Input) -> Result<()> {
    println!("First, choose when and where your story begins (e.g. Year 1372, Isle of Everdawn)");
    let start = read_line(input, "> ").await?.unwrap_or_default();
    println!("\n...Very well. Setting the scene...");
    print_outputs(&engine.new_game(&start).await);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env().context("cannot reach the narrator")?;
    let llm = OpenAiClient::new(&config.api_key)
        .with_model(&config.model)
        .with_base_url(&config.base_url)
        .with_connect_timeout(Duration::from_secs(10))?;
    let mut engine = AdventureEngine::new(llm, &config)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Welcome to the Immersive Text Adventure! (v{})", realmweaver::VERSION);
    println!("1) New game  2) Load game  3) Quit");
    let choice = read_line(&mut input, "> ").await?.unwrap_or_default();

    match MenuChoice::parse(&choice) {
        MenuChoice::Quit => {
            println!("Goodbye!");
            return Ok(());
        }
        MenuChoice::LoadGame => match engine.load_game().await {
            Ok(outputs) if engine.has_story() => print_outputs(&outputs),
            Ok(_) => {
                println!("The save file holds no story yet.");
                start_new_game(&mut engine, &mut input).await?;
            }
            Err(e) => {
                log::warn!("Load at startup failed: {}", e);
                println!("No usable save file found ({}). Starting fresh.", e);
                start_new_game(&mut engine, &mut input).await?;
            }
        },
        MenuChoice::NewGame => start_new_game(&mut engine, &mut input).await?,
    }

    loop {
        let Some(line) = read_line(&mut input, &engine.prompt()).await? else {
            break;
        };
        let turn = engine.handle_input(&line).await;
        print_outputs(&turn.outputs);
        if turn.finished {
            break;
        }
    }

    Ok(())
}
