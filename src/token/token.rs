//! ERC-20 style memecoin
//!
//! Launched tokens start with their whole supply credited to the owner.
//! The owner may mint more and may pause the token, which freezes
//! transfers, mints and burns until unpaused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Token not found: {0}")]
    TokenNotFound(String),
    #[error("Token already exists: {0}")]
    TokenAlreadyExists(String),
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
    #[error("Supply overflow")]
    SupplyOverflow,
    #[error("Only the token owner may do this (caller {0})")]
    NotOwner(String),
    #[error("Token is paused")]
    Paused,
}

/// Launch parameters, validated at construction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Supply credited to the owner at launch
    pub initial_supply: u128,
    /// Owner of the token (receives the supply, may mint and pause)
    pub owner: String,
    /// Factory transaction that launched this token
    pub launch_tx: u64,
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    pub fn new(
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u128,
        owner: String,
        launch_tx: u64,
    ) -> Result<Self, TokenError> {
        validate_launch_params(&name, &symbol, decimals, initial_supply)?;

        Ok(Self {
            name,
            symbol,
            decimals,
            initial_supply,
            owner,
            launch_tx,
            created_at: Utc::now(),
        })
    }
}

/// Check name, symbol, decimals and supply against launch limits
pub fn validate_launch_params(
    name: &str,
    symbol: &str,
    decimals: u8,
    supply: u128,
) -> Result<(), TokenError> {
    if name.is_empty() || name.chars().count() > 50 {
        return Err(TokenError::InvalidName);
    }
    if symbol.is_empty() || symbol.chars().count() > 10 {
        return Err(TokenError::InvalidSymbol);
    }
    if decimals > 18 {
        return Err(TokenError::InvalidDecimals);
    }
    if supply == 0 {
        return Err(TokenError::InvalidSupply);
    }
    Ok(())
}

/// Emitted on every balance movement (mint has `from == ""`, burn has `to == ""`)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferEvent {
    pub token: String,
    pub from: String,
    pub to: String,
    pub amount: u128,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Unique token address
    pub address: String,
    pub metadata: TokenMetadata,
    total_supply: u128,
    paused: bool,
    /// Balances: address -> amount
    balances: HashMap<String, u128>,
    /// Allowances: owner -> (spender -> amount)
    allowances: HashMap<String, HashMap<String, u128>>,
}

impl Token {
    /// Create a token with the initial supply credited to its owner
    pub fn new(address: String, metadata: TokenMetadata) -> Self {
        let mut balances = HashMap::new();
        balances.insert(metadata.owner.clone(), metadata.initial_supply);

        Self {
            address,
            total_supply: metadata.initial_supply,
            metadata,
            paused: false,
            balances,
            allowances: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn owner(&self) -> &str {
        &self.metadata.owner
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn balance_of(&self, address: &str) -> u128 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    pub fn transfer(
        &mut self,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_movable(from, to, amount)?;
        Ok(self.move_balance(from, to, amount))
    }

    /// Set (or with 0, revoke) a spender's allowance
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u128) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_movable(from, to, amount)?;

        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowance,
                need: amount,
            });
        }

        if let Some(current) = self
            .allowances
            .get_mut(from)
            .and_then(|spenders| spenders.get_mut(spender))
        {
            *current -= amount;
        }

        Ok(self.move_balance(from, to, amount))
    }

    /// Owner-only: create new supply for `to`
    pub fn mint(
        &mut self,
        caller: &str,
        to: &str,
        amount: u128,
    ) -> Result<TransferEvent, TokenError> {
        self.check_owner(caller)?;
        if self.paused {
            return Err(TokenError::Paused);
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }

        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;

        Ok(self.event("", to, amount))
    }

    /// Destroy `amount` of `from`'s balance
    pub fn burn(&mut self, from: &str, amount: u128) -> Result<TransferEvent, TokenError> {
        if self.paused {
            return Err(TokenError::Paused);
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }

        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        self.total_supply -= amount;

        Ok(self.event(from, "", amount))
    }

    pub fn pause(&mut self, caller: &str) -> Result<(), TokenError> {
        self.check_owner(caller)?;
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &str) -> Result<(), TokenError> {
        self.check_owner(caller)?;
        self.paused = false;
        Ok(())
    }

    fn check_owner(&self, caller: &str) -> Result<(), TokenError> {
        if caller != self.metadata.owner {
            return Err(TokenError::NotOwner(caller.to_string()));
        }
        Ok(())
    }

    fn check_movable(&self, from: &str, to: &str, amount: u128) -> Result<(), TokenError> {
        if self.paused {
            return Err(TokenError::Paused);
        }
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }
        if from == to {
            return Err(TokenError::SelfTransfer);
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }
        Ok(())
    }

    fn move_balance(&mut self, from: &str, to: &str, amount: u128) -> TransferEvent {
        *self.balances.entry(from.to_string()).or_insert(0) -= amount;
        *self.balances.entry(to.to_string()).or_insert(0) += amount;
        self.event(from, to, amount)
    }

    fn event(&self, from: &str, to: &str, amount: u128) -> TransferEvent {
        TransferEvent {
            token: self.address.clone(),
            from: from.to_string(),
            to: to.to_string(),
            amount,
            timestamp: Utc::now(),
        }
    }
}
