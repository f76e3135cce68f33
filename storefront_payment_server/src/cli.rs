use std::process::exit;

/// Handles `--version`/`--help` before the server boots. Anything else falls through to normal startup.
pub fn handle_command_line_args() {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("storefront_payment_server v{}", env!("CARGO_PKG_VERSION"));
                exit(0);
            },
            "--help" | "-h" => {
                println!(
                    "storefront_payment_server v{}\n\nThe server takes no command-line arguments; it is configured \
                     entirely through environment variables (see the SPS_* variables in the README or config \
                     module). A .env file in the working directory is honoured.",
                    env!("CARGO_PKG_VERSION")
                );
                exit(0);
            },
            other => {
                eprintln!("Unknown argument: {other}. Try --help.");
                exit(1);
            },
        }
    }
}
