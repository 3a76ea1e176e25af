use std::time::Duration;
use tierflags::FlagSet;

fn main() {
    let mut flags = FlagSet::new("server");
    flags.set_description("A tiny server.");
    let host = flags.string_var("host", 'o', "localhost", "The host to bind.");
    let port = flags.int_var("port", 'p', 8080, "The port to bind.");
    let verbose = flags.bool_var("verbose", 'v', false, "Log every request.");
    let timeout = flags.duration(
        "timeout",
        Duration::from_secs(30),
        "How long to wait for a request.",
    );

    match flags.parse_args() {
        Ok(()) => {}
        Err(error) if error.is_help() => std::process::exit(0),
        Err(error) => {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
    }

    println!(
        "Serving {}:{} (verbose={}, timeout={:?}).",
        flags.get(&host),
        flags.get(&port),
        flags.get(&verbose),
        flags.get(&timeout),
    );
}
