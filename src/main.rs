use std::env;
use std::process;

use tracing::warn;
use tracing_subscriber::EnvFilter;

use cap_eng::csv::write_cap_table;
use cap_eng::dataset::load_roster;
use cap_eng::{Engine, LeagueConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args().nth(1).expect("usage: cap-eng <roster.json>");

    if !path.ends_with(".json") {
        warn!(path, "input file seems to not be a json file");
    }

    let store = match load_roster(&path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let engine = Engine::with_config(store, LeagueConfig::from_env());

    write_cap_table(engine.league_summary());
}
