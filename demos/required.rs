use tierflags::{FlagSet, ParseError};

fn main() {
    let mut flags = FlagSet::new("deploy");
    flags.set_description("Deploys a release.");
    flags.set_version("1.0.0");
    let target = flags.string("target", "", "Where to deploy.");
    let enable_tls = flags.bool("enable-tls", false, "Serve over Tls.");
    let tls_cert = flags.string("tls-cert", "", "The Tls certificate.");
    let replicas = flags.int("replicas", 1, "How many replicas to run.");

    flags.set_required("target").expect("target is registered");
    flags
        .set_dependencies("tls-cert", ["enable-tls"])
        .expect("tls-cert is registered");
    flags.set_group("enable-tls", "Security").expect("enable-tls is registered");
    flags.set_group("tls-cert", "Security").expect("tls-cert is registered");
    flags
        .validate_with(&replicas, |replicas| {
            if *replicas < 1 {
                Err(format!("{replicas} is not positive"))
            } else {
                Ok(())
            }
        })
        .expect("replicas is an int");

    match flags.parse_args() {
        Ok(()) => {}
        Err(ParseError::HelpRequested) => return,
        Err(error) => {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
    }

    println!(
        "Deploying {} replicas to {} (tls: {}, cert: '{}').",
        flags.get(&replicas),
        flags.get(&target),
        flags.get(&enable_tls),
        flags.get(&tls_cert),
    );
}
