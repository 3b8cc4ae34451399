// entigen CLI entry point

use entigen_cli::{logging::VerbosityLevel, output, router::CommandRouter};

#[tokio::main]
async fn main() {
    if let Err(e) = CommandRouter::route().await {
        output::print_error(&e.user_message());
        if VerbosityLevel::Verbose.should_output() {
            eprintln!("\n{}", e.technical_details());
        }
        std::process::exit(1);
    }
}
