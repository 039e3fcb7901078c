//! openv binary entry point

use openv::cli::{self, CliError, exit_code_for, render_error};

fn main() {
    // Tracing may be unusable during a panic, so report on stderr directly.
    #[allow(clippy::print_stderr)]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    let json = cli.json;

    let _ = openv::tracing::init_tracing(cli.tracing_config());

    let command = match cli.into_command() {
        Ok(command) => command,
        Err(err) => {
            render_error(&err, json);
            std::process::exit(exit_code_for(&err));
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let err = CliError::io(format!("Failed to create tokio runtime: {e}"));
            render_error(&err, json);
            std::process::exit(exit_code_for(&err));
        }
    };

    let exit_code = match rt.block_on(openv::commands::execute(command)) {
        Ok(code) => code,
        Err(err) => {
            render_error(&err, json);
            exit_code_for(&err)
        }
    };

    std::process::exit(exit_code);
}
