//! CARVFi command-line client.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use carvfi_client::{
    config::Config,
    create_flow,
    error::FlowError,
    flow::{ConnectionFlow, ConnectionState},
    init_tracing, open_store,
};
use clap::{Args, Parser, Subcommand};
use entities::{ProfileForm, short_address};
use integrations::{AssistantRequest, Attachment, MockBehavior, MockWalletProvider, WELCOME_MESSAGE};

#[derive(Parser)]
#[command(name = "carvfi")]
#[command(about = "CARVFi - wallet login, points and daily streaks", long_about = None)]
struct Cli {
    /// Wallet address reported by the simulated wallet extension
    #[arg(long, global = true, env = "CARVFI_ADDRESS")]
    address: Option<String>,

    /// Simulate the user rejecting the connection prompt
    #[arg(long, global = true)]
    reject: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet
    Connect,
    /// Create or edit the profile of the connected wallet
    Register(ProfileArgs),
    /// Show the dashboard for the current session
    Status,
    /// Show recent activity
    Activity,
    /// Send a message to the assistant
    Chat {
        /// Message text
        message: Option<String>,
        /// Attach an image by file name
        #[arg(long, conflicts_with = "file")]
        image: Option<String>,
        /// Attach a document by file name
        #[arg(long)]
        file: Option<String>,
    },
    /// Fetch the wallet balance from the chain
    Balance,
    /// Disconnect the wallet and end the session
    Logout,
    /// List every registered user on this device
    Users,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    bio: String,
    #[arg(long, default_value = "")]
    twitter: String,
    #[arg(long, default_value = "")]
    discord: String,
    #[arg(long, default_value = "")]
    telegram: String,
}

impl From<ProfileArgs> for ProfileForm {
    fn from(args: ProfileArgs) -> Self {
        ProfileForm {
            username: args.username,
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            bio: args.bio,
            twitter: args.twitter,
            discord: args.discord,
            telegram: args.telegram,
            ..ProfileForm::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config.log_level);

    tracing::debug!(
        data_file = %config.data_file.display(),
        streak_policy = %config.streak_policy,
        "Starting CARVFi client"
    );

    let store = open_store(&config)?;

    let wallet = match &cli.address {
        Some(address) => MockWalletProvider::new(&config.wallet_name, address),
        None => MockWalletProvider::new(&config.wallet_name, "")
            .with_behavior(MockBehavior::NotInstalled),
    };
    if cli.reject {
        wallet.set_behavior(MockBehavior::Reject);
    }

    let mut flow = create_flow(&config, store, Arc::new(wallet));

    // An explicit address means a fresh connect; otherwise resume the session
    if cli.address.is_some() {
        if let Err(e) = flow.connect().await {
            if !matches!(cli.command, Commands::Connect) {
                return Err(e.into());
            }
        }
    } else {
        flow.restore().await;
    }

    match cli.command {
        Commands::Connect => print_state(&flow),
        Commands::Register(args) => match flow.submit_profile(args.into()).await {
            Ok(user) => {
                println!("Profile saved for {}", user.display_name());
                print_state(&flow);
            }
            Err(FlowError::Validation(errors)) => {
                for error in &errors.errors {
                    eprintln!("{}: {}", error.field, error.message);
                }
                anyhow::bail!("profile was not saved");
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Status => print_state(&flow),
        Commands::Activity => {
            let entries = flow.activities();
            if entries.is_empty() {
                println!("No activity yet");
            }
            for entry in entries {
                println!(
                    "{}  {:<14} {:>+5}  {}",
                    entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    entry.activity_type.as_str(),
                    entry.points,
                    entry.description
                );
            }
        }
        Commands::Chat {
            message,
            image,
            file,
        } => {
            let mut request = AssistantRequest::text(message.unwrap_or_default());
            if let Some(name) = image {
                request = request.with_attachment(Attachment::Image { name });
            } else if let Some(name) = file {
                request = request.with_attachment(Attachment::File { name });
            }

            if request.is_empty() {
                println!("{}", WELCOME_MESSAGE);
            } else {
                let reply = flow.chat(request).await?;
                println!("{}", reply);
            }
        }
        Commands::Balance => {
            let Some(address) = flow.state().address().map(str::to_string) else {
                anyhow::bail!("no wallet connected");
            };
            let balance = flow.refresh_balance().await;
            println!("{}: {:.4} CARV", short_address(&address), balance);
        }
        Commands::Logout => {
            flow.logout().await;
            println!("Logged out");
        }
        Commands::Users => {
            for user in flow.store().list_users()? {
                println!(
                    "{}  {:<20} {:>6} pts  streak {}",
                    short_address(&user.wallet_address),
                    user.display_name(),
                    user.points,
                    user.streak
                );
            }
        }
    }

    Ok(())
}

fn print_state(flow: &ConnectionFlow) {
    match flow.state() {
        ConnectionState::Disconnected => {
            match flow.last_error() {
                Some(error) => println!("Not connected: {}", error),
                None => println!("Not connected. Pass --address to connect a wallet."),
            }
        }
        ConnectionState::ConnectedNoProfile { address, .. } => {
            println!(
                "Connected {}. Create a profile with `carvfi register`.",
                short_address(address)
            );
        }
        ConnectionState::ConnectedWithProfile { user } => {
            println!("{} ({})", user.display_name(), short_address(&user.wallet_address));
            println!("  Points: {}", user.points);
            println!("  Streak: {} days", user.streak);
            println!("  Level:  {}", user.level);
            println!("  Logins: {}", user.login_count);
            if let Some(last_login) = user.last_login {
                println!(
                    "  Last login: {}",
                    last_login.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                );
            }

            let rewards = flow.rewards();
            if !rewards.is_empty() {
                println!("  Rewards:");
                for reward in rewards {
                    println!("    {:<24} {:>4} pts  {}", reward.name, reward.points, reward.status);
                }
            }
        }
    }
}
