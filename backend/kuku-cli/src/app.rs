use crate::commands::Commands;
use crate::error::{CliError, Result as CliErrorResult};

use kuku_config::Config;
use kuku_core::{Identity, LimitName, RemoteStore, UserMetadata};
use kuku_entitlement::{Decision, EntitlementGate, EntitlementService};
use kuku_remote::{PredictionClient, SupabaseClient};
use kuku_session::{
    FileKeyValueStore, IdentityCache, KeyValueStore, RetryPolicy, RouteDecision, RouteGuard,
    SessionResolver, SignUpOutcome, TokioDelay,
};

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Auth events buffered between the HTTP adapter and the resolver.
const AUTH_EVENT_BUFFER: usize = 16;

/// Result of one command, printed as text or JSON by `main`.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub text: String,
    pub json: Value,
}

impl Outcome {
    fn ok(text: impl Into<String>, json: Value) -> Self {
        Self {
            success: true,
            text: text.into(),
            json,
        }
    }

    fn refused(text: impl Into<String>, json: Value) -> Self {
        Self {
            success: false,
            text: text.into(),
            json,
        }
    }
}

/// Everything a command needs, wired once per run.
pub struct App {
    resolver: Arc<SessionResolver>,
    entitlement: EntitlementService,
    predictions: PredictionClient,
}

impl App {
    pub fn new(
        resolver: Arc<SessionResolver>,
        entitlement: EntitlementService,
        predictions: PredictionClient,
    ) -> Self {
        Self {
            resolver,
            entitlement,
            predictions,
        }
    }

    /// Build the real adapters from config and restore the saved session.
    pub async fn connect(config: &Config) -> CliErrorResult<Self> {
        let cache_path = config.cache_path()?;
        info!("Using local cache at {}", cache_path.display());
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(cache_path));

        let (events_tx, events_rx) = mpsc::channel(AUTH_EVENT_BUFFER);
        let remote: Arc<dyn RemoteStore> = Arc::new(
            SupabaseClient::new(&config.remote)?
                .with_session_store(Arc::clone(&store))
                .with_auth_events(events_tx),
        );

        let resolver = Arc::new(SessionResolver::new(
            Arc::clone(&remote),
            IdentityCache::new(store),
            RetryPolicy::from(&config.retry),
            Arc::new(TokioDelay),
        ));
        let listener = Arc::clone(&resolver);
        tokio::spawn(async move { listener.listen(events_rx).await });

        resolver.bootstrap().await;

        let entitlement = EntitlementService::new(remote, &config.entitlement);
        let predictions = PredictionClient::new(&config.prediction)?;

        Ok(Self::new(resolver, entitlement, predictions))
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    pub async fn run(&self, command: Commands) -> CliErrorResult<Outcome> {
        match command {
            Commands::Login { email, password } => {
                let password = password_or_prompt(password).await?;
                self.login(&email, &password).await
            }
            Commands::Signup {
                email,
                password,
                full_name,
                phone,
            } => {
                let password = password_or_prompt(password).await?;
                let metadata = UserMetadata {
                    full_name,
                    phone,
                    ..UserMetadata::default()
                };
                self.signup(&email, &password, &metadata).await
            }
            Commands::Logout => self.logout().await,
            Commands::Whoami => self.whoami().await,
            Commands::Plan => self.plan().await,
            Commands::Check { limit, usage } => self.check(&limit, usage).await,
            Commands::Predict { image, category } => {
                self.predict(&image, category.as_deref()).await
            }
            Commands::Health => self.health().await,
        }
    }

    /// Stop the resolver so late auth events are not applied during exit.
    pub fn shutdown(&self) {
        self.resolver.dispose();
    }

    // =========================================================================
    // Account
    // =========================================================================

    pub async fn login(&self, email: &str, password: &str) -> CliErrorResult<Outcome> {
        self.resolver.sign_in(email, password).await?;
        let state = self.resolver.wait_ready().await;

        match (RouteGuard::decide(&state, None), state.identity.as_ref()) {
            (RouteDecision::Allow, Some(identity)) => Ok(Outcome::ok(
                format!("Signed in as {} ({})", identity.display_name, identity.role),
                json!(state),
            )),
            _ => Ok(Outcome::refused(
                "Signed in, but your profile could not be loaded. Try again shortly.",
                json!(state),
            )),
        }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> CliErrorResult<Outcome> {
        match self.resolver.sign_up(email, password, metadata).await? {
            SignUpOutcome::SignedIn(_) => {
                let state = self.resolver.wait_ready().await;
                Ok(Outcome::ok(
                    format!("Account created, signed in as {email}"),
                    json!(state),
                ))
            }
            SignUpOutcome::ConfirmationRequired => Ok(Outcome::ok(
                format!("Account created. Check {email} for a confirmation link, then log in."),
                json!({ "confirmation_required": true }),
            )),
        }
    }

    pub async fn logout(&self) -> CliErrorResult<Outcome> {
        self.resolver.sign_out().await?;
        Ok(Outcome::ok("Signed out", json!({ "signed_out": true })))
    }

    pub async fn whoami(&self) -> CliErrorResult<Outcome> {
        let state = self.resolver.wait_ready().await;
        if RouteGuard::decide(&state, None) != RouteDecision::Allow {
            return Ok(Outcome::refused("Not signed in", json!(state)));
        }

        let text = match state.identity.as_ref() {
            Some(identity) => format!(
                "{} <{}>\nrole: {}\nsource: {:?}, profile: {:?}",
                identity.display_name,
                identity.email,
                state.role,
                state.source,
                state.profile_status
            ),
            None => "Not signed in".to_string(),
        };
        Ok(Outcome::ok(text, json!(state)))
    }

    // =========================================================================
    // Entitlements
    // =========================================================================

    pub async fn plan(&self) -> CliErrorResult<Outcome> {
        let identity = self.require_identity().await?;
        let gate = self.entitlement.gate(identity.id).await;
        let summaries = self.entitlement.usage_summaries(identity.id).await;
        let tier = gate.tier();

        let mut text = format!("{} plan (${}/month)\n", tier.label(), tier.monthly_price());
        for (name, value) in gate.plan_limits().entries() {
            text.push_str(&format!("  {:<22} {value}\n", name.label()));
        }
        if !summaries.is_empty() {
            text.push_str("Usage:\n");
            for summary in &summaries {
                text.push_str(&format!("  {summary}\n"));
            }
        }

        let limits: serde_json::Map<String, Value> = gate
            .plan_limits()
            .entries()
            .map(|(name, value)| (name.as_str().to_string(), json!(value)))
            .collect();

        Ok(Outcome::ok(
            text.trim_end(),
            json!({
                "tier": tier,
                "monthly_price": tier.monthly_price(),
                "limits": limits,
                "usage": summaries,
            }),
        ))
    }

    pub async fn check(&self, limit_name: &str, usage: Option<u64>) -> CliErrorResult<Outcome> {
        let limit = EntitlementGate::parse_limit(limit_name)?;
        let identity = self.require_identity().await?;

        let decision = self.entitlement.authorize(identity.id, limit, usage).await;
        Ok(decision_outcome(limit, decision))
    }

    pub async fn predict(&self, image: &Path, category: Option<&str>) -> CliErrorResult<Outcome> {
        let identity = self.require_identity().await?;

        let decision = self
            .entitlement
            .authorize(identity.id, LimitName::MaxPredictions, None)
            .await;
        if !decision.is_allowed() {
            return Ok(decision_outcome(LimitName::MaxPredictions, decision));
        }

        let bytes = tokio::fs::read(image)
            .await
            .map_err(|source| CliError::ReadFile {
                path: image.to_path_buf(),
                source,
            })?;
        let filename = image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        let result = self.predictions.predict(bytes, &filename, category).await?;

        if let Err(e) = self.entitlement.record_prediction(identity.id, &result).await {
            warn!("Prediction was not recorded, usage count may lag: {e}");
        }

        Ok(Outcome::ok(
            format!(
                "{}: {} ({})",
                filename,
                result.prediction,
                result.confidence_display()
            ),
            json!(result),
        ))
    }

    pub async fn health(&self) -> CliErrorResult<Outcome> {
        let health = self.predictions.health().await?;
        let text = format!(
            "Prediction service at {}: {}",
            self.predictions.base_url(),
            health.status
        );

        if health.is_healthy() {
            Ok(Outcome::ok(text, json!(health)))
        } else {
            Ok(Outcome::refused(text, json!(health)))
        }
    }

    async fn require_identity(&self) -> CliErrorResult<Identity> {
        let state = self.resolver.wait_ready().await;
        match RouteGuard::decide(&state, None) {
            RouteDecision::Allow => state.identity.ok_or(CliError::NotSignedIn),
            _ => Err(CliError::NotSignedIn),
        }
    }
}

fn decision_outcome(limit: LimitName, decision: Decision) -> Outcome {
    match decision.message() {
        None => Outcome::ok(format!("{} allowed", limit.label()), json!(decision)),
        Some(message) => Outcome::refused(message.to_string(), json!(decision)),
    }
}

async fn password_or_prompt(password: Option<String>) -> CliErrorResult<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(CliError::Prompt)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
