//! Explicit wallet session context.
//!
//! The session is the single place the connected wallet address lives.
//! Connect/disconnect are the only mutations and belong to whoever drives
//! the wallet (the gateway owner); every reader takes a per-call snapshot
//! via [`WalletSession::address`].

use alloy::primitives::Address;
use tracing::info;

/// Connection state of the user's wallet.
#[derive(Clone, Debug, Default)]
pub struct WalletSession {
    address: Option<Address>,
}

impl WalletSession {
    /// Session with a wallet already connected.
    pub fn connected(address: Address) -> Self {
        Self {
            address: Some(address),
        }
    }

    /// Session with no wallet attached.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, address: Address) {
        info!(%address, "wallet connected");
        self.address = Some(address);
    }

    pub fn disconnect(&mut self) {
        if let Some(address) = self.address.take() {
            info!(%address, "wallet disconnected");
        }
    }

    /// Snapshot of the connected wallet address, if any.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let wallet = address!("0x00000000000000000000000000000000000000aa");

        let mut session = WalletSession::disconnected();
        assert_eq!(session.address(), None);

        session.connect(wallet);
        assert_eq!(session.address(), Some(wallet));
        assert!(session.is_connected());

        session.disconnect();
        assert!(!session.is_connected());
    }
}
