use tierflags::FlagSet;

fn main() {
    let mut flags = FlagSet::new("archive");
    flags.set_description("Demonstrates the supported Cli syntax.");
    let verbose = flags.bool_var("verbose", 'v', false, "Print every file.");
    let dry_run = flags.bool_var("dry-run", 'd', false, "Do not write anything.");
    let level = flags.int_var("level", 'l', 6, "The compression level.");
    let ratio = flags.float64("ratio", 0.5, "The target compression ratio.");
    let exclude = flags.string_list_var("exclude", 'x', Vec::default(), "Patterns to skip.");

    // All of the following are equivalent:
    //   archive --verbose --dry-run --level 9 --exclude '*.tmp,*.log' a b
    //   archive -vd -l 9 --exclude='*.tmp,*.log' a b
    //   archive -vd -l=9 -x '*.tmp,*.log' a b
    //   archive -vdl 9 -x '*.tmp,*.log' -- a b
    if let Err(error) = flags.parse_args() {
        if !error.is_help() {
            eprintln!("Parse error: {error}");
            std::process::exit(1);
        }
        return;
    }

    println!("verbose: {}", flags.get(&verbose));
    println!("dry-run: {}", flags.get(&dry_run));
    println!("level: {}", flags.get(&level));
    println!("ratio: {}", flags.get(&ratio));
    println!("exclude: {:?}", flags.get(&exclude));
    println!("files: {:?}", flags.args());
}
