use tierflags::FlagSet;

// Try `WORKER_THREADS=8 WORKER_QUEUE=jobs cargo run --example env -- --threads 2`.
fn main() {
    let mut flags = FlagSet::new("worker");
    flags.set_env_prefix("WORKER");
    let threads = flags.int("threads", 1, "How many threads to run.");
    let queue = flags.string("queue", "default", "The queue to consume.");
    let token = flags.string("token", "", "The api token.");
    flags
        .set_env_var("token", "API_TOKEN")
        .expect("token is registered");

    if let Err(error) = flags.parse_args() {
        if !error.is_help() {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
        return;
    }

    println!(
        "Consuming '{}' with {} threads (authenticated: {}).",
        flags.get(&queue),
        flags.get(&threads),
        !flags.get(&token).is_empty(),
    );
}
