//! Terminal output utilities

use console::style;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}

/// Print the header for one profile of the run
pub fn print_step(index: usize, total: usize, profile: &str) {
    println!(
        "\n{} {}",
        style(format!("[{}/{}]", index, total)).cyan().bold(),
        style(profile).bold()
    );
}

/// Print a command about to run
pub fn print_command(label: &str, command: &str) {
    println!("{} {}", style(format!("Running {} command:", label)).dim(), command);
}

/// Disable colors on both streams
pub fn disable_colors() {
    console::set_colors_enabled(false);
    console::set_colors_enabled_stderr(false);
}
