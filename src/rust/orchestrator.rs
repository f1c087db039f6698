use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use log::{debug, error, info, warn};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tokio::sync::watch;

use crate::engine::rules::apply_override;
use crate::engine::{ArtifactLoader, ClientStatus, EngineError, ModelInferenceClient, Prediction};
use crate::presets::Preset;
use crate::profile::{UserProfile, UserProfileUpdate};
use crate::theme::ThemeApplier;
use crate::tokens::{map_tokens, DesignTokenProfile};

/// Readiness of the model as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Loading,
    Ready,
    Error,
}

/// Everything a display surface needs, published as one value.
///
/// Serializes with a derived `isPersonalized` flag alongside the fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationState {
    pub user_profile: UserProfile,
    pub tokens: DesignTokenProfile,
    pub prediction: Option<Prediction>,
    pub model_status: ModelStatus,
}

impl PersonalizationState {
    fn initial() -> Self {
        Self {
            user_profile: UserProfile::default(),
            tokens: DesignTokenProfile::default(),
            prediction: None,
            model_status: ModelStatus::Loading,
        }
    }

    /// True once a prediction, from the model or a preset, has been applied.
    pub fn is_personalized(&self) -> bool {
        self.prediction.is_some()
    }
}

impl Serialize for PersonalizationState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PersonalizationState", 5)?;
        state.serialize_field("userProfile", &self.user_profile)?;
        state.serialize_field("tokens", &self.tokens)?;
        state.serialize_field("prediction", &self.prediction)?;
        state.serialize_field("modelStatus", &self.model_status)?;
        state.serialize_field("isPersonalized", &self.is_personalized())?;
        state.end()
    }
}

/// Coordinates model readiness, personalization runs and presets.
///
/// State changes are published through a watch channel; every committed
/// token profile is then pushed to the theme sink, in commit order. The sink
/// may read the orchestrator's state but must not start a preset from inside
/// `apply`. Only the most recently started run or preset may commit; results
/// of older runs are discarded.
pub struct PersonalizationOrchestrator {
    client: ModelInferenceClient,
    state: watch::Sender<PersonalizationState>,
    generation: AtomicU64,
    commit_lock: Mutex<()>,
    theme: Arc<dyn ThemeApplier>,
}

impl PersonalizationOrchestrator {
    /// Creates an orchestrator in `Loading` and applies the default theme.
    ///
    /// The model is not loaded until [`initialize`](Self::initialize) runs;
    /// see [`spawn`](Self::spawn) for the variant that starts loading itself.
    pub fn new(theme: Arc<dyn ThemeApplier>) -> Self {
        let initial = PersonalizationState::initial();
        theme.apply(&initial.tokens);
        let (state, _) = watch::channel(initial);
        Self {
            client: ModelInferenceClient::new(),
            state,
            generation: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            theme,
        }
    }

    /// Creates an orchestrator and loads the model in a background task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<L>(loader: L, theme: Arc<dyn ThemeApplier>) -> Arc<Self>
    where
        L: ArtifactLoader + 'static,
    {
        let orchestrator = Arc::new(Self::new(theme));
        let background = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if let Err(e) = background.initialize(&loader).await {
                error!("Model initialization failed: {}", e);
            }
        });
        orchestrator
    }

    /// Loads the model and publishes the resulting status.
    pub async fn initialize<L: ArtifactLoader>(&self, loader: &L) -> Result<(), EngineError> {
        let result = self.client.initialize(loader).await;
        let status = match self.client.status() {
            ClientStatus::Ready => ModelStatus::Ready,
            ClientStatus::Error => ModelStatus::Error,
            ClientStatus::Uninitialized | ClientStatus::Loading => ModelStatus::Loading,
        };
        self.state.send_if_modified(|state| {
            let changed = state.model_status != status;
            state.model_status = status;
            changed
        });
        info!("Model status: {:?}", status);
        result
    }

    pub fn subscribe(&self) -> watch::Receiver<PersonalizationState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PersonalizationState {
        self.state.borrow().clone()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.state.borrow().model_status
    }

    pub fn client(&self) -> &ModelInferenceClient {
        &self.client
    }

    /// Merges a partial survey edit into the current profile.
    ///
    /// Allowed in any model status. Nothing else changes: tokens and the
    /// current prediction stay as they are until the next run.
    pub fn update_user_profile(&self, update: &UserProfileUpdate) {
        self.state.send_if_modified(|state| {
            let before = state.user_profile.clone();
            update.apply_to(&mut state.user_profile);
            state.user_profile != before
        });
    }

    /// Runs the full pipeline on the current profile and commits the result.
    ///
    /// Fails fast with [`EngineError::ModelNotReady`] unless the model is
    /// ready. On any failure the published state is left untouched. Returns
    /// [`EngineError::Superseded`] if a newer run or preset started before
    /// this one finished.
    ///
    /// Starting a run supersedes every older one even if the newer run later
    /// fails: an older successful run is then discarded and nothing commits.
    pub async fn run_personalization(&self) -> Result<Prediction, EngineError> {
        if self.model_status() != ModelStatus::Ready {
            warn!("Personalization requested while model is {:?}", self.model_status());
            return Err(EngineError::ModelNotReady);
        }

        let generation = self.next_generation();
        let profile = self.state.borrow().user_profile.clone();

        let raw = self.client.predict(&profile).await?;
        let prediction = apply_override(&raw, &profile);
        let tokens = map_tokens(prediction.class, &profile);

        if !self.commit(generation, None, prediction, tokens) {
            debug!("Discarding superseded personalization run {}", generation);
            return Err(EngineError::Superseded);
        }
        info!(
            "Personalized as '{}' (classifier confidence {:.1}%)",
            prediction.class_name(),
            prediction.confidence_percent()
        );
        Ok(prediction)
    }

    /// Installs a literal profile and token set without running the model.
    ///
    /// The displayed prediction is synthesized from the token color scheme.
    pub fn apply_preset_directly(&self, profile: UserProfile, tokens: DesignTokenProfile) -> Prediction {
        let generation = self.next_generation();
        let prediction = Prediction::synthesized(tokens.color_scheme.engagement_class());
        if !self.commit(generation, Some(profile), prediction, tokens) {
            debug!("Preset superseded before it could be applied");
        }
        prediction
    }

    /// Merges a built-in preset's survey answers and installs its tokens.
    pub fn apply_preset(&self, preset: Preset) -> Prediction {
        info!("Applying '{}' preset", preset);
        let profile = self.state.borrow().user_profile.merged(&preset.profile_update());
        self.apply_preset_directly(profile, preset.tokens())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publishes prediction, tokens and optionally profile as one update, if
    /// `generation` is still the newest request.
    fn commit(
        &self,
        generation: u64,
        profile: Option<UserProfile>,
        prediction: Prediction,
        tokens: DesignTokenProfile,
    ) -> bool {
        let _ordered = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut applied = None;
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            if let Some(profile) = profile {
                state.user_profile = profile;
            }
            state.prediction = Some(prediction);
            state.tokens = tokens.clone();
            applied = Some(tokens);
            true
        });

        // The channel lock is released here, so the sink may read state.
        match applied {
            Some(tokens) => {
                self.theme.apply(&tokens);
                true
            }
            None => false,
        }
    }
}
