use tierflags::FlagSet;

// Try writing `{"host": "db.internal", "pool-size": 16}` to `./database.json`, or `./config/config.json`.
fn main() {
    let mut flags = FlagSet::new("database");
    flags.set_description("Connects to a database.");
    flags.enable_config_discovery();
    let host = flags.string("host", "localhost", "The database host.");
    let pool_size = flags.int("pool-size", 4, "The connection pool size.");

    if let Err(error) = flags.parse_args() {
        if !error.is_help() {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
        return;
    }

    for name in ["host", "pool-size"] {
        let source = flags
            .lookup(name)
            .and_then(|flag| flag.source())
            .map(|source| source.to_string())
            .unwrap_or_else(|| "default".to_string());
        println!("{name} from {source}");
    }

    println!("Connecting to {} with {} connections.", flags.get(&host), flags.get(&pool_size));
}
