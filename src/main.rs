use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = chromebox::cli::Cli::parse();
    let json = cli.json;

    if let Err(err) = chromebox::run(cli).await {
        if json {
            let _ = chromebox::output::json::print_error(&err);
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
