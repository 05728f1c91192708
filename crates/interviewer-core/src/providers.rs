//! Sign-in and payment capabilities.
//!
//! Both are simulated: every sign-in succeeds and every payment grants
//! [`TOP_UP_CREDITS`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::TOP_UP_CREDITS;

/// Identity providers offered on the sign-in screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInProvider {
    Google,
    Facebook,
    Instagram,
    X,
}

impl SignInProvider {
    pub const ALL: [SignInProvider; 4] = [
        SignInProvider::Google,
        SignInProvider::Facebook,
        SignInProvider::Instagram,
        SignInProvider::X,
    ];
}

impl std::fmt::Display for SignInProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignInProvider::Google => write!(f, "Google"),
            SignInProvider::Facebook => write!(f, "Facebook"),
            SignInProvider::Instagram => write!(f, "Instagram"),
            SignInProvider::X => write!(f, "X"),
        }
    }
}

/// Payment methods offered when buying credits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MoMoPay,
    BankAccount,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::MoMoPay, PaymentMethod::BankAccount];
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::MoMoPay => write!(f, "MoMoPay"),
            PaymentMethod::BankAccount => write!(f, "Bank Account"),
        }
    }
}

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub provider: SignInProvider,
}

/// Proof of a completed purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub method: PaymentMethod,
    pub credits: u32,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, provider: SignInProvider) -> AuthSession;
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn purchase_credits(&self, method: PaymentMethod) -> Receipt;
}

/// Accepts every sign-in
#[derive(Debug, Default)]
pub struct SimulatedAuth;

#[async_trait]
impl AuthProvider for SimulatedAuth {
    async fn sign_in(&self, provider: SignInProvider) -> AuthSession {
        info!(%provider, "Simulated sign-in");
        AuthSession { provider }
    }
}

/// Completes every purchase with a fixed top-up
#[derive(Debug, Default)]
pub struct SimulatedPayment;

#[async_trait]
impl PaymentProvider for SimulatedPayment {
    async fn purchase_credits(&self, method: PaymentMethod) -> Receipt {
        info!(%method, credits = TOP_UP_CREDITS, "Simulated payment");
        Receipt {
            method,
            credits: TOP_UP_CREDITS,
        }
    }
}
