//! Meme Launchpad CLI Application
//!
//! A command-line interface for queuing memecoin launches and collecting
//! multisig approvals, plus a REST API server.

use clap::{Parser, Subcommand};
use meme_launchpad::api::{create_router, ApiState};
use meme_launchpad::cli::commands::TokenAction;
use meme_launchpad::cli::{self, AppState};
use meme_launchpad::factory::MemecoinRequest;
use meme_launchpad::launchpad::Launchpad;
use meme_launchpad::multisig::QuorumPolicy;
use meme_launchpad::storage::Storage;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Multisig-gated memecoin launchpad", long_about = None)]
struct Cli {
    /// Data directory for launchpad storage
    #[arg(short, long, default_value = ".launchpad_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new launchpad
    Init {
        /// Approvals required: all-but-one, unanimous, or a number
        #[arg(short, long, default_value = "all-but-one")]
        quorum: QuorumPolicy,

        /// Identity allowed to queue transactions besides the factory
        #[arg(long)]
        admin: Option<String>,

        /// Overwrite an existing launchpad
        #[arg(long)]
        force: bool,
    },

    /// Signer wallet operations
    Wallet {
        #[command(subcommand)]
        action: WalletCommands,
    },

    /// Request a memecoin launch
    Request {
        /// Account that receives the supply
        #[arg(short, long)]
        owner: String,

        /// Token name
        #[arg(short, long)]
        name: String,

        /// Token symbol
        #[arg(short, long)]
        symbol: String,

        /// Token decimals
        #[arg(long, default_value = "18")]
        decimals: u8,

        /// Total supply in base units
        #[arg(short, long)]
        total_supply: u128,

        /// Signer address (repeat for each signer)
        #[arg(long = "signer", required = true)]
        signers: Vec<String>,
    },

    /// Approve a pending launch
    Sign {
        /// Signer wallet address
        #[arg(short, long)]
        wallet: String,

        /// Transaction ID
        #[arg(short, long)]
        id: u64,
    },

    /// Withdraw approval from a pending launch
    Unsign {
        /// Signer wallet address
        #[arg(short, long)]
        wallet: String,

        /// Transaction ID
        #[arg(short, long)]
        id: u64,
    },

    /// Show pending launches
    Pending {
        /// Show a single pending record
        #[arg(short, long)]
        id: Option<u64>,
    },

    /// Show the status of a launch
    Status {
        /// Transaction ID
        #[arg(short, long)]
        id: u64,
    },

    /// List factory launch records
    Requests,

    /// Reset the approvals of a pending launch (uses the configured admin)
    Requeue {
        /// Transaction ID
        #[arg(short, long)]
        id: u64,
    },

    /// List launched tokens
    Tokens,

    /// Launched token operations
    Token {
        #[command(subcommand)]
        action: TokenCommands,
    },

    /// State backup operations
    Backup {
        #[command(subcommand)]
        action: BackupCommands,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Create a new signer wallet
    New {
        /// Optional label for the wallet
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List all signer wallets
    List,
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Show a holder's balance
    Balance {
        #[arg(long)]
        token: String,
        #[arg(long)]
        holder: String,
    },

    /// List tokens a holder owns
    Holdings {
        #[arg(long)]
        holder: String,
    },

    /// Transfer from the wallet's balance
    Transfer {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u128,
    },

    /// Allow a spender to move the wallet's tokens
    Approve {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        spender: String,
        #[arg(long)]
        amount: u128,
    },

    /// Spend an allowance granted to the wallet
    TransferFrom {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u128,
    },

    /// Mint new supply (token owner only)
    Mint {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: u128,
    },

    /// Burn from the wallet's balance
    Burn {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        amount: u128,
    },

    /// Pause transfers (token owner only)
    Pause {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
    },

    /// Resume transfers (token owner only)
    Unpause {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        token: String,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// List saved backups
    List,

    /// Restore a backup (0 is the most recent)
    Restore {
        #[arg(short, long)]
        index: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle init command separately (doesn't need full state)
    if let Commands::Init {
        quorum,
        admin,
        force,
    } = &cli.command
    {
        return cli::commands::cmd_init(&cli.data_dir, *quorum, admin.clone(), *force);
    }

    // Handle serve command with tokio runtime
    if let Commands::Serve { port } = cli.command {
        return run_server(&cli.data_dir, port);
    }

    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init { .. } | Commands::Serve { .. } => unreachable!(),

        Commands::Wallet { action } => match action {
            WalletCommands::New { label } => {
                cli::commands::cmd_wallet_new(&state, label.as_deref())?;
            }
            WalletCommands::List => {
                cli::commands::cmd_wallet_list(&state)?;
            }
        },

        Commands::Request {
            owner,
            name,
            symbol,
            decimals,
            total_supply,
            signers,
        } => {
            let request = MemecoinRequest {
                owner,
                name,
                symbol,
                decimals,
                total_supply,
                signers,
            };
            cli::commands::cmd_request(&mut state, request)?;
        }

        Commands::Sign { wallet, id } => {
            cli::commands::cmd_sign(&mut state, &wallet, id)?;
        }

        Commands::Unsign { wallet, id } => {
            cli::commands::cmd_unsign(&mut state, &wallet, id)?;
        }

        Commands::Pending { id } => {
            cli::commands::cmd_pending(&state, id)?;
        }

        Commands::Status { id } => {
            cli::commands::cmd_status(&state, id)?;
        }

        Commands::Requests => {
            cli::commands::cmd_requests(&state)?;
        }

        Commands::Requeue { id } => {
            cli::commands::cmd_requeue(&mut state, id)?;
        }

        Commands::Tokens => {
            cli::commands::cmd_tokens(&state)?;
        }

        Commands::Token { action } => run_token_command(&mut state, action)?,

        Commands::Backup { action } => match action {
            BackupCommands::List => {
                cli::commands::cmd_backup_list(&state)?;
            }
            BackupCommands::Restore { index } => {
                cli::commands::cmd_backup_restore(&mut state, index)?;
            }
        },
    }

    Ok(())
}

fn run_token_command(
    state: &mut AppState,
    action: TokenCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let (wallet, token, action) = match action {
        TokenCommands::Balance { token, holder } => {
            return cli::commands::cmd_token_balance(state, &token, &holder);
        }
        TokenCommands::Holdings { holder } => {
            return cli::commands::cmd_token_holdings(state, &holder);
        }
        TokenCommands::Transfer {
            wallet,
            token,
            to,
            amount,
        } => (wallet, token, TokenAction::Transfer { to, amount }),
        TokenCommands::Approve {
            wallet,
            token,
            spender,
            amount,
        } => (wallet, token, TokenAction::Approve { spender, amount }),
        TokenCommands::TransferFrom {
            wallet,
            token,
            from,
            to,
            amount,
        } => (wallet, token, TokenAction::TransferFrom { from, to, amount }),
        TokenCommands::Mint {
            wallet,
            token,
            to,
            amount,
        } => (wallet, token, TokenAction::Mint { to, amount }),
        TokenCommands::Burn {
            wallet,
            token,
            amount,
        } => (wallet, token, TokenAction::Burn { amount }),
        TokenCommands::Pause { wallet, token } => (wallet, token, TokenAction::Pause),
        TokenCommands::Unpause { wallet, token } => (wallet, token, TokenAction::Unpause),
    };

    cli::commands::cmd_token(state, &wallet, &token, action)
}

fn run_server(data_dir: &Path, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let storage = Storage::in_dir(data_dir)?;

        // Load or create launchpad (loading re-flags the default quorum)
        let launchpad = if storage.exists() {
            println!("📂 Loading existing launchpad...");
            storage.load()?
        } else {
            println!("📂 Creating new launchpad...");
            let launchpad = Launchpad::default();
            storage.save(&launchpad)?;
            launchpad
        };

        println!("   🗳️  Quorum: {}", launchpad.config().quorum);
        println!(
            "   ⏳ Pending launches: {}",
            launchpad.coordinator().pending_count()
        );

        let state = ApiState::new(launchpad, storage);
        let app = create_router(state.clone());
        let addr = format!("0.0.0.0:{}", port);

        println!("🌐 REST API listening on http://{}", addr);
        println!("   Press Ctrl+C to stop");

        // Save state on shutdown
        let shutdown_state = state.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!("\n💾 Saving launchpad state...");

            let launchpad = shutdown_state.launchpad.read().await;
            match shutdown_state.storage.save(&launchpad) {
                Ok(()) => println!("✅ Data saved successfully!"),
                Err(e) => log::error!("Failed to save launchpad state: {}", e),
            }
            std::process::exit(0);
        });

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    Ok(())
}
