use colored::Colorize;

/// Print the welcome banner on startup.
pub fn print_welcome(bind_addr: &str) {
    println!(
        "\n{}",
        "Conclave — majority-vote inference swarm".bold().cyan()
    );
    println!(
        "Peers register at {}. Type {} for commands, {} to exit.\n",
        bind_addr.bold(),
        "help".bold(),
        "exit".bold(),
    );
}

/// Build the prompt string showing the live peer count.
pub fn build_prompt(peer_count: usize) -> String {
    format!(
        "{} [{} peers]\n{} ",
        "conclave".bold().cyan(),
        peer_count.to_string().yellow(),
        ">".bold().green(),
    )
}

/// Print a system-level informational message.
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print an error message.
pub fn print_error(msg: &str) {
    println!("{} {}", "✗".red(), msg.red());
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print the help text for available commands.
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {}          List registered peers", "list".cyan());
    println!("  {}   Dispatch an image to the swarm", "task <path>".cyan());
    println!("  {}           Show all reputation scores", "rep".cyan());
    println!("  {}          Show this help", "help".cyan());
    println!("  {}          Exit", "exit".cyan());
}
