use std::error::Error as _;
use std::io;
use std::process;

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use thiserror::Error;
use users_api::{config, db, http, Config, Database, UserService};

mod cli;

#[derive(Debug, Error)]
enum StartError {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Database(#[from] db::Error),
    #[error("http server failed")]
    Io(#[from] io::Error),
}

async fn serve(config: Config) -> Result<(), StartError> {
    let db = Database::connect(&config.db).await?;
    let service = UserService::new(&db);

    log::info!("starting server on http://{}:{}/", config.address, config.port);
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(service.clone()))
            .configure(http::configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers.get());
    }

    let result = match server.bind((config.address, config.port)) {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    log::info!("closing database connections");
    db.close().await;

    Ok(result?)
}

async fn run(cli: cli::Cli) -> Result<(), StartError> {
    let mut config = Config::load()?;
    cli.override_config(&mut config);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    serve(config).await
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    if let Err(error) = run(cli).await {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        eprintln!("{message}");
        process::exit(1);
    }
}
