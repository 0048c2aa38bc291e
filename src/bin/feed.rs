//! Feed runner: connect, subscribe, and log market data until interrupted.

use kalshi_md::{AppContext, FeedHandler, LogLevel, Logger, LoggingSink};

use std::process::ExitCode;

const CONFIG_PATH: &str = "config.json";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let ctx = match AppContext::build(CONFIG_PATH) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("startup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    ctx.log_config();

    let mut sink = LoggingSink::new(ctx.logger());
    let mut handler = FeedHandler::new(&mut sink, ctx.logger());
    match handler.run(ctx.run_options(), ctx.refresh_headers()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ctx.logger()
                .log(LogLevel::Error, "md.feed_handler", "run_failed");
            eprintln!("feed run failed: {err}");
            ExitCode::FAILURE
        }
    }
}
