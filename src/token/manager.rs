//! Token deployer and registry
//!
//! The factory deploys every launched memecoin through [`TokenManager`].

use crate::crypto::sha256_hex;
use crate::token::token::{Token, TokenError, TokenMetadata};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenManager {
    /// All tokens by address
    tokens: HashMap<String, Token>,
    /// Deployment counter for address generation
    nonce: u64,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy a token; the whole initial supply is credited to `owner`
    pub fn create_token(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        initial_supply: u128,
        owner: &str,
        launch_tx: u64,
    ) -> Result<Token, TokenError> {
        let metadata = TokenMetadata::new(
            name,
            symbol,
            decimals,
            initial_supply,
            owner.to_string(),
            launch_tx,
        )?;

        let address = self.next_address(owner, &metadata.symbol);
        if self.tokens.contains_key(&address) {
            return Err(TokenError::TokenAlreadyExists(address));
        }
        self.nonce += 1;

        let token = Token::new(address.clone(), metadata);
        self.tokens.insert(address.clone(), token.clone());

        log::info!(
            "Token deployed: {} ({}) at {} for {}",
            token.name(),
            token.symbol(),
            address,
            owner
        );

        Ok(token)
    }

    /// `0x` + first 40 hex chars of SHA256(owner:symbol:nonce)
    fn next_address(&self, owner: &str, symbol: &str) -> String {
        let hash = sha256_hex(format!("{}:{}:{}", owner, symbol, self.nonce).as_bytes());
        format!("0x{}", &hash[..40])
    }

    pub fn get(&self, address: &str) -> Option<&Token> {
        self.tokens.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut Token> {
        self.tokens.get_mut(address)
    }

    /// All tokens, oldest launch first
    pub fn list(&self) -> Vec<&Token> {
        let mut tokens: Vec<&Token> = self.tokens.values().collect();
        tokens.sort_by_key(|t| t.metadata.launch_tx);
        tokens
    }

    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    pub fn exists(&self, address: &str) -> bool {
        self.tokens.contains_key(address)
    }

    pub fn balance_of(&self, token_address: &str, holder: &str) -> Result<u128, TokenError> {
        self.tokens
            .get(token_address)
            .map(|token| token.balance_of(holder))
            .ok_or_else(|| TokenError::TokenNotFound(token_address.to_string()))
    }

    /// Tokens in which `holder` has a non-zero balance
    pub fn tokens_for_holder(&self, holder: &str) -> Vec<(&Token, u128)> {
        self.list()
            .into_iter()
            .filter_map(|token| {
                let balance = token.balance_of(holder);
                (balance > 0).then_some((token, balance))
            })
            .collect()
    }
}
