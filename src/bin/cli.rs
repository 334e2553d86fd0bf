use brehan_dashboard::{
    cli::{
        auth::{self, NewUser},
        db::{db_generate, db_list, db_migrate, db_revert},
    },
    core::db::init_pool,
    settings::get_config,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create new dashboard user
    CreateUser {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// admin, manager or district_manager
        #[arg(short, long, default_value = "admin")]
        role: String,
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        branch: Option<String>,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Db(db_args) => match db_args.command {
            DbCommands::Generate { migration_name } => {
                println!("generate migration: {migration_name:?}");
                db_generate(&migration_name).await?;
            }
            DbCommands::List => {
                println!("list migration");
                let config = get_config()?;
                db_list(&config).await?;
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                let config = get_config()?;
                let pool = init_pool(&config).await?;
                db_migrate(&pool).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let config = get_config()?;
                db_revert(&config).await?;
            }
        },
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::CreateUser {
                username,
                password,
                name,
                email,
                role,
                district,
                branch,
            } => {
                println!("create user: {username:?}");
                let config = get_config()?;
                let pool = init_pool(&config).await?;
                let user = auth::create_user(
                    &pool,
                    NewUser {
                        username,
                        password,
                        name,
                        email,
                        role,
                        district,
                        branch,
                    },
                )
                .await?;
                println!("created {} with role {}", user.user_name, user.role);
            }
        },
    }
    Ok(())
}
