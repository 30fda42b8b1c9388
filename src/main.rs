use colored::Colorize;

fn main() {
    if let Err(e) = pulsecheck::run() {
        eprintln!("{} {}", format!("error[{}]:", e.kind()).red().bold(), e);
        std::process::exit(1);
    }
}
