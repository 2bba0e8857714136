use clap::{Parser, Subcommand};
use teambuilder::{
    auth::manager::create_superuser,
    config::{Settings, SetupError, create_app, prepare_database},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version, about = "Team management for coaches, parents and players")]
struct Cli {
    /// Overrides `DATABASE_URL`.
    #[clap(long)]
    database_url: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the web server.
    Serve {
        /// Overrides `BIND_ADDR`.
        #[clap(long)]
        bind: Option<String>,
    },
    /// Creates an administrator account.
    CreateSuperuser {
        #[clap(long)]
        email: String,
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), SetupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();
    let settings = Settings::from_env();
    let db_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database_url.clone());

    let pool = prepare_database(&db_url).await?;

    match args.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("listening on {addr}");
            axum::serve(listener, create_app(pool, settings.cookie_key()))
                .await?;
        }
        Command::CreateSuperuser {
            email,
            first_name,
            last_name,
            password,
        } => {
            let result = tokio::task::spawn_blocking(move || {
                let mut conn = pool.get()?;
                Ok::<_, SetupError>(create_superuser(
                    &mut conn,
                    &email,
                    &first_name,
                    &last_name,
                    &password,
                ))
            })
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;

            match result {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "created superuser")
                }
                Err(e) => {
                    tracing::error!("could not create superuser: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
