use clap::Parser;
use std::sync::Arc;

use txtfile_viewer::config::{AppState, Config};
use txtfile_viewer::fs::{DirFs, FilteredFs};
use txtfile_viewer::logger;
use txtfile_viewer::render::{PageTemplate, RenderOptions, Renderer};
use txtfile_viewer::server;

/// Serve a directory of text and Markdown files as HTML pages
#[derive(Parser, Debug)]
#[command(name = "txtfile-viewer", version, about)]
struct Args {
    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to serve (overrides serve.root)
    #[arg(short, long)]
    dir: Option<String>,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut cfg = Config::load_from(&args.config)?;
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(dir) = args.dir {
        cfg.serve.root = dir;
    }

    logger::init(&cfg)?;

    // Worker thread count comes from config; default is one per core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Template problems must stop startup, not surface on the first request
    let template = match &cfg.render.template_file {
        Some(path) => PageTemplate::from_file(path)?,
        None => PageTemplate::embedded()?,
    };
    let renderer = Renderer::new(
        template,
        RenderOptions {
            escape_plain_text: cfg.render.escape_plain_text,
        },
    );

    let root = DirFs::new(&cfg.serve.root)
        .map_err(|e| format!("Cannot serve '{}': {e}", cfg.serve.root))?;
    let state = Arc::new(AppState::new(&cfg, Box::new(FilteredFs::new(root)), renderer));

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    server::run_server_loop(listener, state, async {
        match server::shutdown_signal().await {
            Ok(name) => logger::log_info(&format!("{name} received")),
            Err(e) => {
                logger::log_error(&format!("Failed to register signal handlers: {e}"));
                std::future::pending::<()>().await;
            }
        }
    })
    .await;

    Ok(())
}
