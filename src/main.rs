use fuelsim::report::{render_text, to_json};
use fuelsim::{simulate, StationConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let mut json = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("usage: fuelsim [config.json] [--json]");
                return Ok(());
            }
            path => config_path = Some(path.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => StationConfig::from_json(&std::fs::read_to_string(&path)?)?,
        None => StationConfig::default(),
    };

    let summary = simulate(&config)?;

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print!("{}", render_text(&summary));
    }
    Ok(())
}
