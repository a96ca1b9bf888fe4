//! CLI commands for the launchpad
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::CallAction;
use crate::factory::MemecoinRequest;
use crate::launchpad::{Launchpad, LaunchpadConfig};
use crate::multisig::{QuorumPolicy, SignOutcome, TxStatus};
use crate::storage::{Storage, StorageConfig};
use crate::token::{Token, TokenError, TransferEvent};
use crate::wallet::WalletManager;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub launchpad: Launchpad,
    pub storage: Storage,
    pub wallet_manager: WalletManager,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load application state from an initialized data directory
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig {
            data_dir: data_dir.clone(),
            ..Default::default()
        })?;
        let wallet_manager = WalletManager::new(&data_dir.join("wallets"))?;

        if !storage.exists() {
            return Err(format!(
                "No launchpad at {:?}. Run `launchpad init` first.",
                data_dir
            )
            .into());
        }
        let launchpad = storage.load()?;

        Ok(Self {
            launchpad,
            storage,
            wallet_manager,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.launchpad)?;
        Ok(())
    }
}

/// Initialize a new launchpad
pub fn cmd_init(
    data_dir: &Path,
    quorum: QuorumPolicy,
    admin: Option<String>,
    force: bool,
) -> CliResult<()> {
    let storage = Storage::in_dir(data_dir)?;

    if storage.exists() {
        if !force {
            println!("⚠️  Launchpad already exists at {:?}", data_dir);
            println!("   Use --force to reinitialize (this will delete existing data)");
            return Ok(());
        }
        storage.delete()?;
    }

    let config = LaunchpadConfig {
        admin,
        quorum,
        ..Default::default()
    };
    let launchpad = Launchpad::new(config);
    storage.save(&launchpad)?;

    println!("✅ Launchpad initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   🏭 Factory: {}", launchpad.config().factory_address);
    println!("   🗳️  Quorum: {}", launchpad.config().quorum);
    if let Some(admin) = &launchpad.config().admin {
        println!("   🛡️  Admin: {}", admin);
    }

    Ok(())
}

/// Create a new signer wallet
pub fn cmd_wallet_new(state: &AppState, label: Option<&str>) -> CliResult<()> {
    let wallet = state.wallet_manager.create_wallet(label)?;

    println!("🔐 New signer wallet created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔑 Public Key: {}...", &wallet.public_key()[..32]);
    if let Some(l) = &wallet.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  IMPORTANT: Your private key is stored in the wallets directory.");
    println!("   Back up this directory to keep your signing rights!");

    Ok(())
}

/// List all signer wallets
pub fn cmd_wallet_list(state: &AppState) -> CliResult<()> {
    let wallets = state.wallet_manager.list_wallets()?;

    if wallets.is_empty() {
        println!("📭 No wallets found. Create one with: launchpad wallet new");
        return Ok(());
    }

    println!("📋 Wallets:");
    for wallet in &wallets {
        let label = wallet.label.as_deref().unwrap_or("-");
        let pending = state
            .launchpad
            .coordinator()
            .list_pending()
            .into_iter()
            .filter(|tx| tx.signers.contains(&wallet.address))
            .count();
        println!(
            "   {} ({}) - signer on {} pending launch(es)",
            wallet.address, label, pending
        );
    }

    Ok(())
}

/// Submit a memecoin launch for approval
pub fn cmd_request(state: &mut AppState, request: MemecoinRequest) -> CliResult<()> {
    let data = state.launchpad.request_memecoin(request)?;
    state.save()?;

    let required = state.launchpad.coordinator().required_approvals(data.id)?;

    println!("📝 Launch request queued!");
    println!("   ├─ ID: {}", data.id);
    println!("   ├─ Token: {} ({})", data.name, data.symbol);
    println!("   ├─ Supply: {}", data.total_supply);
    println!("   ├─ Owner: {}", data.owner);
    println!("   ├─ Signers: {}", data.signers.len());
    println!("   └─ Approvals required: {}", required);

    Ok(())
}

/// Approve a pending launch with a local wallet
pub fn cmd_sign(state: &mut AppState, wallet_address: &str, id: u64) -> CliResult<()> {
    let wallet = state.wallet_manager.load_wallet(wallet_address)?;
    let auth = wallet.authorize(CallAction::Sign, id)?;

    let (signer, outcome) = state.launchpad.sign_authorized(&auth, id)?;
    state.save()?;

    match outcome {
        SignOutcome::Recorded {
            signatures,
            required,
        } => {
            println!("✍️  Approval recorded for launch {}", id);
            println!("   ├─ Signer: {}", signer);
            println!("   └─ Approvals: {}/{}", signatures, required);
        }
        SignOutcome::Executed => {
            println!("🚀 Quorum reached! Launch {} executed.", id);
            let token = state
                .launchpad
                .get_tx_data(id)
                .and_then(|data| data.token_address.as_ref());
            if let Some(address) = token {
                println!("   └─ Token address: {}", address);
            }
        }
    }

    Ok(())
}

/// Withdraw approval from a pending launch
pub fn cmd_unsign(state: &mut AppState, wallet_address: &str, id: u64) -> CliResult<()> {
    let wallet = state.wallet_manager.load_wallet(wallet_address)?;
    let auth = wallet.authorize(CallAction::Unsign, id)?;

    let signer = state.launchpad.unsign_authorized(&auth, id)?;
    state.save()?;

    println!("↩️  Approval withdrawn for launch {}", id);
    println!("   ├─ Signer: {}", signer);
    println!(
        "   └─ Approvals: {}",
        state.launchpad.get_pending_tx_data(id).signature_count()
    );

    Ok(())
}

/// Show pending launches (or a single pending record)
pub fn cmd_pending(state: &AppState, id: Option<u64>) -> CliResult<()> {
    let coordinator = state.launchpad.coordinator();

    if let Some(id) = id {
        let tx = coordinator.get_pending_tx_data(id);
        if tx.is_empty() {
            println!("📭 No pending record for {} (zeroed record returned)", id);
            return Ok(());
        }
        println!("⏳ Pending launch {}", tx.id);
        println!("   ├─ Owner: {}", tx.owner);
        for signer in &tx.signers {
            let mark = if tx.signatures.contains(signer) { "✅" } else { "⬜" };
            println!("   ├─ {} {}", mark, signer);
        }
        println!(
            "   └─ Quorum: {}",
            coordinator.policy().describe(tx.signer_count())
        );
        return Ok(());
    }

    let pending = coordinator.list_pending();
    println!("📬 Pending launches: {}", pending.len());
    for tx in pending {
        println!(
            "   └─ #{} | owner {} | {}/{} approvals",
            tx.id,
            tx.owner,
            tx.signature_count(),
            coordinator.policy().required_approvals(tx.signer_count())
        );
    }

    Ok(())
}

/// Show the lifecycle status of a launch
pub fn cmd_status(state: &AppState, id: u64) -> CliResult<()> {
    match state.launchpad.tx_status(id) {
        TxStatus::Unknown => println!("❔ Launch {} was never queued", id),
        TxStatus::Pending => {
            let tx = state.launchpad.get_pending_tx_data(id);
            let required = state.launchpad.coordinator().required_approvals(id)?;
            println!(
                "⏳ Launch {} is pending ({}/{} approvals)",
                id,
                tx.signature_count(),
                required
            );
        }
        TxStatus::Executed => println!("✅ Launch {} has been executed", id),
    }

    Ok(())
}

/// List all factory launch records
pub fn cmd_requests(state: &AppState) -> CliResult<()> {
    let records = state.launchpad.list_tx_data();

    if records.is_empty() {
        println!("📭 No launch requests yet.");
        return Ok(());
    }

    println!("🏭 Launch requests:");
    for data in records {
        let status = if data.is_pending { "pending" } else { "executed" };
        println!(
            "   #{} | {} ({}) | {} | {}",
            data.id,
            data.name,
            data.symbol,
            status,
            data.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}

/// List launched tokens
pub fn cmd_tokens(state: &AppState) -> CliResult<()> {
    let tokens = state.launchpad.tokens().list();

    if tokens.is_empty() {
        println!("📭 No tokens launched yet.");
        return Ok(());
    }

    println!("🪙 Launched tokens:");
    for token in tokens {
        println!(
            "   {} | {} ({}) | supply {} | {} holder(s)",
            token.address,
            token.name(),
            token.symbol(),
            token.total_supply(),
            token.holder_count()
        );
    }

    Ok(())
}

/// Reset the approvals of a pending launch (admin only)
pub fn cmd_requeue(state: &mut AppState, id: u64) -> CliResult<()> {
    let admin = state
        .launchpad
        .config()
        .admin
        .clone()
        .ok_or("No admin configured. Reinitialize with `launchpad init --admin <addr>`.")?;

    state.launchpad.requeue_tx(&admin, id)?;
    state.save()?;

    println!("🔁 Launch {} requeued by {}", id, admin);
    println!("   └─ Approvals reset to 0");

    Ok(())
}

/// Show one holder's balance of a token
pub fn cmd_token_balance(state: &AppState, token: &str, holder: &str) -> CliResult<()> {
    let balance = state.launchpad.tokens().balance_of(token, holder)?;
    println!("💰 {} holds {} of {}", holder, balance, token);
    Ok(())
}

/// List launched tokens a holder owns
pub fn cmd_token_holdings(state: &AppState, holder: &str) -> CliResult<()> {
    let holdings = state.launchpad.tokens().tokens_for_holder(holder);

    if holdings.is_empty() {
        println!("📭 {} holds no launched tokens.", holder);
        return Ok(());
    }

    println!("💼 Holdings of {}:", holder);
    for (token, balance) in holdings {
        println!("   {} ({}) | {}", token.symbol(), token.address, balance);
    }

    Ok(())
}

/// Operation on a launched token, performed as a local wallet
pub enum TokenAction {
    Transfer { to: String, amount: u128 },
    Approve { spender: String, amount: u128 },
    TransferFrom { from: String, to: String, amount: u128 },
    Mint { to: String, amount: u128 },
    Burn { amount: u128 },
    Pause,
    Unpause,
}

/// Apply `action` to `token_address` with the wallet's address as caller
pub fn cmd_token(
    state: &mut AppState,
    wallet_address: &str,
    token_address: &str,
    action: TokenAction,
) -> CliResult<()> {
    let caller = state.wallet_manager.load_wallet(wallet_address)?.address();
    let token = state
        .launchpad
        .tokens_mut()
        .get_mut(token_address)
        .ok_or_else(|| TokenError::TokenNotFound(token_address.to_string()))?;

    let event = apply_token_action(token, &caller, action)?;
    state.save()?;

    match event {
        Some(event) => print_transfer(&event),
        None => println!("✅ Token {} updated", token_address),
    }

    Ok(())
}

fn apply_token_action(
    token: &mut Token,
    caller: &str,
    action: TokenAction,
) -> Result<Option<TransferEvent>, TokenError> {
    let event = match action {
        TokenAction::Transfer { to, amount } => token.transfer(caller, &to, amount)?,
        TokenAction::TransferFrom { from, to, amount } => {
            token.transfer_from(caller, &from, &to, amount)?
        }
        TokenAction::Mint { to, amount } => token.mint(caller, &to, amount)?,
        TokenAction::Burn { amount } => token.burn(caller, amount)?,
        TokenAction::Approve { spender, amount } => {
            token.approve(caller, &spender, amount);
            println!("👍 {} may spend {} of {}'s balance", spender, amount, caller);
            return Ok(None);
        }
        TokenAction::Pause => {
            token.pause(caller)?;
            println!("⏸️  Transfers paused");
            return Ok(None);
        }
        TokenAction::Unpause => {
            token.unpause(caller)?;
            println!("▶️  Transfers resumed");
            return Ok(None);
        }
    };
    Ok(Some(event))
}

fn print_transfer(event: &TransferEvent) {
    let from = if event.from.is_empty() { "(mint)" } else { event.from.as_str() };
    let to = if event.to.is_empty() { "(burn)" } else { event.to.as_str() };

    println!("📤 Token movement on {}:", event.token);
    println!("   ├─ From: {}", from);
    println!("   ├─ To: {}", to);
    println!("   └─ Amount: {}", event.amount);
}

/// List saved state backups
pub fn cmd_backup_list(state: &AppState) -> CliResult<()> {
    let backups = state.storage.list_backups();

    if backups.is_empty() {
        println!("📭 No backups found.");
        return Ok(());
    }

    println!("🗄️  Backups (0 is the most recent):");
    for index in backups {
        println!("   └─ #{}", index);
    }

    Ok(())
}

/// Replace the current state with a backup
pub fn cmd_backup_restore(state: &mut AppState, index: usize) -> CliResult<()> {
    state.launchpad = state.storage.restore_backup(index)?;
    state.save()?;

    println!("♻️  Restored backup #{}", index);
    println!("   ├─ Launch requests: {}", state.launchpad.list_tx_data().len());
    println!("   └─ Tokens: {}", state.launchpad.tokens().count());

    Ok(())
}
