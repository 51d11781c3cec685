use loan_wizard::cli::run_cli;

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli(std::env::args().skip(1)).await {
        loan_wizard::init();
        tracing::error!(error = %err, "loan wizard failed");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
