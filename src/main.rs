use colored::Colorize;

fn main() {
    if let Err(err) = juju_query::run() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
