//! Handler scenario tests
//!
//! Run against the in-memory store, so no database is needed.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use secrecy::SecretString;
    use uuid::Uuid;

    use crate::auth::{AuthError, TokenService};
    use crate::domain::{zero_birthday, Balance, DomainError, OperationContext, TransferError};
    use crate::error::AppError;
    use crate::handlers::{AuthHandler, RegisterCommand, TransferCommand, TransferHandler};
    use crate::state::AppState;
    use crate::store::{AccountStore, MemoryAccountStore};

    const SECRET: &str = "handler-tests-secret-0123456789abcdef";

    fn state() -> (AppState, MemoryAccountStore) {
        let store = MemoryAccountStore::new();
        let tokens = TokenService::new(&SecretString::from(SECRET.to_string()), Duration::hours(72));
        let state = AppState::new(Arc::new(store.clone()), tokens, Balance::new(100).unwrap());
        (state, store)
    }

    async fn register(state: &AppState, email: &str) -> Uuid {
        AuthHandler::new(state)
            .register(RegisterCommand::new(email, "hunter2"))
            .await
            .unwrap()
            .id
    }

    async fn points(store: &MemoryAccountStore, id: Uuid) -> i64 {
        store.find_by_id(id).await.unwrap().unwrap().points.value()
    }

    async fn transfer(state: &AppState, sender: Uuid, to: &str, amount: i64) -> Result<(), AppError> {
        TransferHandler::new(state)
            .execute(TransferCommand::new(sender, to, amount), &OperationContext::new())
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Registration
    // =========================================================================

    #[tokio::test]
    async fn test_register_grants_starter_points() {
        let (state, _) = state();
        let account = AuthHandler::new(&state)
            .register(
                RegisterCommand::new("Alice@X.com", "hunter2")
                    .with_name("Alice", "Liddell")
                    .with_birthday("1990-04-12"),
            )
            .await
            .unwrap();

        assert_eq!(account.email.as_str(), "alice@x.com");
        assert_eq!(account.points.value(), 100);
        assert_eq!(account.first_name, "Alice");
        assert_ne!(account.password_hash, "hunter2");
    }

    #[tokio::test]
    async fn test_register_duplicate_email_case_insensitive() {
        let (state, _) = state();
        register(&state, "alice@x.com").await;

        let err = AuthHandler::new(&state)
            .register(RegisterCommand::new("ALICE@x.com", "other"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::EmailTaken(_))));
    }

    #[tokio::test]
    async fn test_register_requires_password() {
        let (state, _) = state();
        let err = AuthHandler::new(&state)
            .register(RegisterCommand::new("alice@x.com", ""))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_malformed_birthday_is_not_fatal() {
        let (state, _) = state();
        let account = AuthHandler::new(&state)
            .register(RegisterCommand::new("alice@x.com", "pw").with_birthday("April 12th"))
            .await
            .unwrap();

        assert_eq!(account.birthday, zero_birthday());
    }

    // =========================================================================
    // Login / authenticate
    // =========================================================================

    #[tokio::test]
    async fn test_login_issues_token_for_account() {
        let (state, _) = state();
        let id = register(&state, "alice@x.com").await;
        let auth = AuthHandler::new(&state);

        let token = auth.login("ALICE@x.com", "hunter2".to_string()).await.unwrap();
        assert_eq!(auth.authenticate(&token), Ok(id));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (state, _) = state();
        register(&state, "alice@x.com").await;
        let auth = AuthHandler::new(&state);

        let wrong_password = auth.login("alice@x.com", "nope".to_string()).await.unwrap_err();
        let unknown_email = auth.login("ghost@x.com", "hunter2".to_string()).await.unwrap_err();
        let malformed_email = auth.login("ghost", "hunter2".to_string()).await.unwrap_err();

        for err in [wrong_password, unknown_email, malformed_email] {
            assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn test_authenticate_rejects_expired_token() {
        let (state, _) = state();
        let id = register(&state, "alice@x.com").await;

        let expired = state
            .tokens
            .issue_with_expiry(id, Utc::now() - Duration::hours(1))
            .unwrap();

        assert_eq!(
            AuthHandler::new(&state).authenticate(&expired),
            Err(AuthError::Expired)
        );
    }

    #[tokio::test]
    async fn test_profile_is_stable_without_mutation() {
        let (state, _) = state();
        let id = register(&state, "alice@x.com").await;
        let auth = AuthHandler::new(&state);

        let first = auth.profile(id).await.unwrap();
        let second = auth.profile(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_profile_unknown_account() {
        let (state, _) = state();
        let err = AuthHandler::new(&state).profile(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::AccountNotFound(_))));
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_happy_path() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        let bob = register(&state, "bob@x.com").await;

        transfer(&state, alice, "bob@x.com", 40).await.unwrap();

        assert_eq!(points(&store, alice).await, 60);
        assert_eq!(points(&store, bob).await, 140);
    }

    #[tokio::test]
    async fn test_transfer_receiver_lookup_ignores_case() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        let bob = register(&state, "bob@x.com").await;

        transfer(&state, alice, "  BOB@X.com", 1).await.unwrap();
        assert_eq!(points(&store, bob).await, 101);
    }

    #[tokio::test]
    async fn test_transfer_exact_balance() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        register(&state, "bob@x.com").await;

        transfer(&state, alice, "bob@x.com", 100).await.unwrap();
        assert_eq!(points(&store, alice).await, 0);
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        let bob = register(&state, "bob@x.com").await;
        transfer(&state, alice, "bob@x.com", 90).await.unwrap();

        let err = transfer(&state, alice, "bob@x.com", 50).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::Transfer(TransferError::InsufficientFunds {
                required: 50,
                available: 10
            }))
        ));
        assert_eq!(points(&store, alice).await, 10);
        assert_eq!(points(&store, bob).await, 190);
    }

    #[tokio::test]
    async fn test_transfer_unknown_receiver() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;

        let err = transfer(&state, alice, "ghost@x.com", 10).await.unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::EmailNotFound(_))));
        assert_eq!(points(&store, alice).await, 100);
    }

    #[tokio::test]
    async fn test_transfer_unknown_sender() {
        let (state, store) = state();
        let bob = register(&state, "bob@x.com").await;

        let err = transfer(&state, Uuid::new_v4(), "bob@x.com", 10).await.unwrap_err();

        assert!(matches!(err, AppError::Domain(DomainError::AccountNotFound(_))));
        assert_eq!(points(&store, bob).await, 100);
    }

    #[tokio::test]
    async fn test_transfer_rejects_non_positive_amount() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        register(&state, "bob@x.com").await;

        for amount in [0, -5] {
            let err = transfer(&state, alice, "bob@x.com", amount).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::Domain(DomainError::Transfer(TransferError::InvalidAmount(_)))
            ));
        }
        assert_eq!(store.total_points().await, 200);
    }

    #[tokio::test]
    async fn test_transfer_to_self_rejected() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;

        let err = transfer(&state, alice, "Alice@x.com", 10).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Domain(DomainError::Transfer(TransferError::SelfTransfer))
        ));
        assert_eq!(points(&store, alice).await, 100);
    }

    #[tokio::test]
    async fn test_transfers_conserve_total_points() {
        let (state, store) = state();
        let alice = register(&state, "alice@x.com").await;
        let bob = register(&state, "bob@x.com").await;
        register(&state, "carol@x.com").await;

        transfer(&state, alice, "bob@x.com", 30).await.unwrap();
        transfer(&state, bob, "carol@x.com", 120).await.unwrap();
        let _ = transfer(&state, alice, "carol@x.com", 500).await;
        let _ = transfer(&state, alice, "ghost@x.com", 5).await;

        assert_eq!(store.total_points().await, 300);
    }
}
